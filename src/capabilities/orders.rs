//! 订单查询能力
//!
//! 核心只依赖 OrderStore；InMemoryOrderStore 供测试与本地演示使用，可从 JSON 种子文件加载。

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::OrderRecord;

/// 订单库：按订单号查询，不存在时返回 Ok(None)
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get_order(&self, order_id: &str) -> Result<Option<OrderRecord>, String>;
}

/// 内存订单库（订单号大小写不敏感）
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<String, OrderRecord>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = OrderRecord>) -> Self {
        let orders = records
            .into_iter()
            .map(|r| (r.order_id.to_uppercase(), r))
            .collect();
        Self {
            orders: RwLock::new(orders),
        }
    }

    /// 从 JSON 数组加载订单
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("read {}: {}", path.display(), e))?;
        let records: Vec<OrderRecord> = serde_json::from_str(&raw)
            .map_err(|e| format!("parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded {} orders from {}", records.len(), path.display());
        Ok(Self::from_records(records))
    }

    pub async fn insert(&self, record: OrderRecord) {
        self.orders
            .write()
            .await
            .insert(record.order_id.to_uppercase(), record);
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get_order(&self, order_id: &str) -> Result<Option<OrderRecord>, String> {
        Ok(self
            .orders
            .read()
            .await
            .get(&order_id.trim().to_uppercase())
            .cloned())
    }
}
