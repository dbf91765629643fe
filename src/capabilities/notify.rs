//! 订单邮件通知能力
//!
//! 只在用户明确确认后由编排器的 confirm_notification 调用；回答生成流程从不发送。
//! WebhookNotifier 把订单 JSON POST 到自动化工作流（如 n8n），由其负责实际发信。

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::OrderRecord;

/// 通知发送
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_order_summary(&self, order: &OrderRecord) -> Result<(), String>;
}

/// 未替换的示例地址视为未配置
const PLACEHOLDER_WEBHOOK: &str = "https://your-n8n-instance/webhook/order_email";

#[derive(Debug, Serialize)]
struct OrderEmailPayload<'a> {
    order_id: &'a str,
    customer_name: Option<&'a str>,
    customer_email: Option<&'a str>,
    product: Option<&'a str>,
    status: &'a str,
    amount: Option<&'a str>,
    requested_at: String,
}

impl<'a> From<&'a OrderRecord> for OrderEmailPayload<'a> {
    fn from(order: &'a OrderRecord) -> Self {
        Self {
            order_id: &order.order_id,
            customer_name: order.customer_name.as_deref(),
            customer_email: order.customer_email.as_deref(),
            product: order.product.as_deref(),
            status: &order.status,
            amount: order.amount.as_deref(),
            requested_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, url }
    }

    /// 已配置且不是示例地址时返回 URL
    pub fn endpoint(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty() && *u != PLACEHOLDER_WEBHOOK)
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_order_summary(&self, order: &OrderRecord) -> Result<(), String> {
        let Some(url) = self.endpoint() else {
            tracing::warn!("Notification webhook not configured, skipping order {}", order.order_id);
            return Err("webhook url not configured".to_string());
        };

        let payload = OrderEmailPayload::from(order);
        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| format!("webhook request failed: {e}"))?;
        response
            .error_for_status()
            .map_err(|e| format!("webhook rejected: {e}"))?;

        tracing::info!("Order email requested: {}", order.order_id);
        Ok(())
    }
}
