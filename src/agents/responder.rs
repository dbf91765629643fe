//! 回答合成节点：把订单信息、知识片段与用户问题合并为一次生成调用
//!
//! 有待确认的订单邮件时，在 prompt 末尾追加确认指令；模型只被要求“询问”，
//! 实际发送只发生在用户确认后的 confirm_notification。

use std::fmt::Write as _;
use std::sync::Arc;

use crate::core::{AgentError, ConversationState, Intent};
use crate::llm::{collect_stream, GenerationParams, LlmClient, LlmError};
use crate::memory::{recent_turns, Message};

/// 生成失败时的固定回复
pub const FALLBACK_APOLOGY: &str = "抱歉，生成回答时出现错误，请稍后再试。";

/// 空输入时的固定回复
pub const NO_INPUT_APOLOGY: &str = "抱歉，我没有收到您的输入。";

pub const RESPONDER_SYSTEM_PROMPT: &str = r#"You are a professional customer-support assistant. Give accurate, friendly and helpful answers based on the user's question and the context provided.
If the context contains order information, explain the order status in detail.
If the context contains knowledge-base results, base your answer on them.
If there is no relevant context, answer from your own knowledge.
Always reply in the same language as the user."#;

pub struct ResponseSynthesizer {
    llm: Arc<dyn LlmClient>,
    params: GenerationParams,
    stream: bool,
    max_history_turns: usize,
}

impl ResponseSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            params: GenerationParams::default(),
            stream: false,
            max_history_turns: 10,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.params.temperature = temperature;
        self
    }

    /// 通过流式接口生成并收齐
    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_max_history_turns(mut self, turns: usize) -> Self {
        self.max_history_turns = turns;
        self
    }

    /// 只写 response_text（失败时附带 error_note）
    pub async fn respond(&self, state: &mut ConversationState) {
        if state.normalized_input.is_empty() {
            tracing::warn!("Empty input, returning fixed reply");
            state.response_text = NO_INPUT_APOLOGY.to_string();
            return;
        }

        let messages = self.build_messages(state);
        match self.generate(&messages).await {
            Ok(text) if !text.trim().is_empty() => {
                tracing::info!("Response generated, {} chars", text.chars().count());
                state.response_text = text.trim().to_string();
            }
            Ok(_) => {
                tracing::warn!("Model returned an empty response");
                state.response_text = FALLBACK_APOLOGY.to_string();
                state.note_error(AgentError::GenerationFailure("empty completion".to_string()));
            }
            Err(e) => {
                tracing::error!("Response generation failed: {}", e);
                state.response_text = FALLBACK_APOLOGY.to_string();
                state.note_error(AgentError::GenerationFailure(e.to_string()));
            }
        }
    }

    /// [system, 最近若干轮历史, 本轮 prompt]
    pub fn build_messages(&self, state: &ConversationState) -> Vec<Message> {
        let history = recent_turns(&state.history, self.max_history_turns);
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(RESPONDER_SYSTEM_PROMPT));
        messages.extend_from_slice(history);
        messages.push(Message::user(build_prompt(state)));
        messages
    }

    async fn generate(&self, messages: &[Message]) -> Result<String, LlmError> {
        if self.stream {
            let stream = self.llm.complete_stream(messages, &self.params).await?;
            collect_stream(stream).await
        } else {
            self.llm.complete(messages, &self.params).await
        }
    }
}

/// 本轮用户 prompt：上下文块 + 用户问题 + （可选）邮件确认指令
pub fn build_prompt(state: &ConversationState) -> String {
    let mut prompt = String::new();

    let has_context = state.order_record.is_some() || !state.documents.is_empty();
    if has_context {
        prompt.push_str("Context:\n");
        if let Some(order) = &state.order_record {
            prompt.push_str("Order information:\n");
            prompt.push_str(&order.render());
            prompt.push('\n');
        }
        if !state.documents.is_empty() {
            prompt.push_str("Knowledge base results:\n");
            for (i, doc) in state.documents.iter().enumerate() {
                let _ = writeln!(prompt, "{}. {}", i + 1, doc.text);
            }
        }
        prompt.push_str("\nUser question: ");
    }
    prompt.push_str(&state.normalized_input);

    if state.email_prompt_pending {
        if state.intent == Intent::Order {
            prompt.push_str(
                "\n\nImportant: the user has just looked up an order. First summarize the order details, \
                 then ask whether they would like the order summary emailed to ",
            );
        } else {
            prompt.push_str(
                "\n\nImportant: an order the user looked up earlier in this conversation is still waiting \
                 for their decision. Answer the current question first, then ask once more whether they \
                 would like the order summary emailed to ",
            );
        }
        match state.pending_email_address.as_deref() {
            Some(address) => prompt.push_str(address),
            None => prompt.push_str("the customer's email address"),
        }
        prompt.push_str(
            ". Do not send anything and never claim an email has been sent until the user explicitly \
             confirms in a later message; if the user declines or does not confirm, say it will not be sent.",
        );
    }

    prompt
}
