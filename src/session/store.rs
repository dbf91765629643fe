//! 会话存储抽象层
//!
//! 统一的 load / save 接口，支持内存和持久化两种实现；启动时按配置选择，
//! 持久化后端初始化失败时记录告警并退回内存实现，不影响请求处理。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::SessionSection;
use crate::core::{AgentError, ConversationState};

#[cfg(feature = "async-sqlite")]
use super::persistent::PersistentSessionStore;

/// 会话存储接口：thread_id → ConversationState
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 读取线程的会话状态，不存在时返回 Ok(None)
    async fn load(&self, thread_id: &str) -> Result<Option<ConversationState>, AgentError>;

    /// 整体覆盖保存（同一 key 后写者胜）
    async fn save(&self, thread_id: &str, state: &ConversationState) -> Result<(), AgentError>;

    /// 删除线程；只供外部清理任务使用，编排核心从不调用
    async fn delete(&self, thread_id: &str) -> Result<bool, AgentError>;

    /// 后端名称（日志用）
    fn backend(&self) -> &'static str;
}

/// 内存会话存储（进程重启即丢失）
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, ConversationState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, thread_id: &str) -> Result<Option<ConversationState>, AgentError> {
        Ok(self.sessions.read().await.get(thread_id).cloned())
    }

    async fn save(&self, thread_id: &str, state: &ConversationState) -> Result<(), AgentError> {
        self.sessions
            .write()
            .await
            .insert(thread_id.to_string(), state.clone());
        Ok(())
    }

    async fn delete(&self, thread_id: &str) -> Result<bool, AgentError> {
        Ok(self.sessions.write().await.remove(thread_id).is_some())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// 创建会话存储
///
/// backend = sqlite 且启用了 async-sqlite feature 时尝试持久化存储；任何失败都退回内存存储
pub async fn create_session_store(cfg: &SessionSection) -> Arc<dyn SessionStore> {
    let wants_durable = cfg.backend.eq_ignore_ascii_case("sqlite");

    #[cfg(feature = "async-sqlite")]
    if wants_durable {
        match cfg.db_path.as_deref() {
            Some(path) => match PersistentSessionStore::new(path).await {
                Ok(store) => {
                    tracing::info!("Using persistent session store: {:?}", path);
                    return Arc::new(store);
                }
                Err(e) => {
                    tracing::warn!("Failed to create persistent store, falling back to memory: {}", e);
                }
            },
            None => {
                tracing::warn!("session.backend = sqlite but session.db_path is not set, falling back to memory");
            }
        }
    }

    #[cfg(not(feature = "async-sqlite"))]
    if wants_durable {
        tracing::warn!("Persistent session store requested but async-sqlite feature not enabled, using memory store");
    }

    tracing::info!("Using in-memory session store");
    Arc::new(MemorySessionStore::new())
}
