//! 意图分类能力
//!
//! 默认实现基于文本生成：固定的分类指令 + 用户输入，返回模型的原始短标签。
//! 标签到 Intent 的解析在路由节点完成。

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{generate_text, GenerationParams, LlmClient, LlmError};

/// 意图分类：返回模型给出的短标签（未解析）
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify_intent(&self, text: &str) -> Result<String, LlmError>;
}

pub const CLASSIFY_SYSTEM_PROMPT: &str = r#"You are the intent classifier of a customer-support assistant. Classify the user's message into exactly one category:
- order: questions about orders, tickets, shipping, delivery or order status
- rag: questions about products, usage instructions, policies or FAQs that need the knowledge base
- chat: greetings, small talk and anything else

Reply with exactly one word: order, rag or chat."#;

/// 基于 LLM 的分类器
pub struct LlmIntentClassifier {
    llm: Arc<dyn LlmClient>,
    params: GenerationParams,
}

impl LlmIntentClassifier {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            params: GenerationParams::with_temperature(0.3),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.params.temperature = temperature;
        self
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify_intent(&self, text: &str) -> Result<String, LlmError> {
        generate_text(
            self.llm.as_ref(),
            text,
            Some(CLASSIFY_SYSTEM_PROMPT),
            &self.params,
        )
        .await
    }
}
