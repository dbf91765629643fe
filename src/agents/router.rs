//! 路由节点：把输入分类为 order / knowledge / chat
//!
//! 从不失败：空输入与分类异常都落到 Chat。

use std::sync::Arc;

use crate::capabilities::IntentClassifier;
use crate::core::{AgentError, ConversationState, Intent};

pub struct IntentRouter {
    classifier: Arc<dyn IntentClassifier>,
}

impl IntentRouter {
    pub fn new(classifier: Arc<dyn IntentClassifier>) -> Self {
        Self { classifier }
    }

    /// 只写 intent（异常时附带 error_note）
    pub async fn route(&self, state: &mut ConversationState) {
        if state.normalized_input.is_empty() {
            tracing::warn!("Empty input, routing to chat without classification");
            state.intent = Intent::Chat;
            state.note_error(AgentError::EmptyInput);
            return;
        }

        state.intent = match self.classifier.classify_intent(&state.normalized_input).await {
            Ok(label) => {
                let intent = Intent::from_label(&label);
                tracing::info!(label = %label, intent = %intent, "Intent classified");
                intent
            }
            Err(e) => {
                tracing::warn!("Intent classification failed, defaulting to chat: {}", e);
                state.note_error(AgentError::ClassificationFailure(e.to_string()));
                Intent::Chat
            }
        };
    }
}
