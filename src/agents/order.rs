//! 订单节点：提取订单号并查询订单库
//!
//! 提取先走正则级联，全部落空后再让模型兜底（低温度、短输出）。
//! 查询成功后标记“待确认邮件”；本节点从不发送通知。

use std::sync::Arc;

use crate::capabilities::OrderStore;
use crate::core::{AgentError, ConversationState};
use crate::llm::{generate_text, GenerationParams, LlmClient};

use super::extract::{extract_by_patterns, sanitize_llm_candidate};

const EXTRACT_SYSTEM_PROMPT: &str =
    "You extract order identifiers from customer messages. Reply with the identifier only.";

fn extract_prompt(text: &str) -> String {
    format!(
        "Extract the order ID from the user message below. Order IDs usually look like ORD-2024-001 or ORDER123.\n\n\
         User message: {text}\n\n\
         Reply with the order ID only and nothing else. If there is no order ID, reply \"not found\".\n\n\
         Order ID:"
    )
}

pub struct OrderResolver {
    store: Arc<dyn OrderStore>,
    llm: Arc<dyn LlmClient>,
    extract_params: GenerationParams,
}

impl OrderResolver {
    pub fn new(store: Arc<dyn OrderStore>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            store,
            llm,
            extract_params: GenerationParams::with_temperature(0.1).max_tokens(50),
        }
    }

    /// 提取订单号：正则级联优先，模型兜底；模型调用失败视为未找到
    pub async fn extract_order_id(&self, text: &str) -> Option<String> {
        if let Some((stage, id)) = extract_by_patterns(text) {
            tracing::info!(stage, order_id = %id, "Order id extracted by pattern");
            return Some(id);
        }

        tracing::info!("No pattern matched, asking model to extract order id");
        match generate_text(
            self.llm.as_ref(),
            &extract_prompt(text),
            Some(EXTRACT_SYSTEM_PROMPT),
            &self.extract_params,
        )
        .await
        {
            Ok(reply) => {
                let id = sanitize_llm_candidate(&reply);
                if let Some(ref id) = id {
                    tracing::info!(order_id = %id, "Order id extracted by model");
                }
                id
            }
            Err(e) => {
                tracing::warn!("Model order id extraction failed: {}", e);
                None
            }
        }
    }

    /// 写入 order_record / email_prompt_pending / pending_email_address / error_note
    pub async fn resolve(&self, state: &mut ConversationState) {
        let Some(order_id) = self.extract_order_id(&state.normalized_input).await else {
            tracing::warn!("Could not extract order id from: {}", state.normalized_input);
            clear_order(state);
            state.note_error(AgentError::ExtractionFailure);
            return;
        };

        match self.store.get_order(&order_id).await {
            Ok(Some(record)) => {
                tracing::info!("Order found: {}", record.order_id);
                state.pending_email_address = record.customer_email.clone();
                state.email_prompt_pending = true;
                state.order_record = Some(record);
            }
            Ok(None) => {
                tracing::warn!("Order not found: {}", order_id);
                clear_order(state);
                state.note_error(AgentError::RecordNotFound(order_id));
            }
            Err(e) => {
                tracing::warn!("Order store lookup failed for {}: {}", order_id, e);
                clear_order(state);
                state.note_error(AgentError::OrderStoreFailure(e));
            }
        }
    }
}

fn clear_order(state: &mut ConversationState) {
    state.order_record = None;
    state.email_prompt_pending = false;
    state.pending_email_address = None;
}
