//! 知识检索节点：按 top_k 取回相关片段
//!
//! 无结果与检索异常都只写空列表和 error_note，不会中断本轮。

use std::sync::Arc;

use crate::capabilities::DocumentRetriever;
use crate::core::{AgentError, ConversationState};

pub const DEFAULT_TOP_K: usize = 3;

pub struct KnowledgeRetriever {
    retriever: Arc<dyn DocumentRetriever>,
    top_k: usize,
}

impl KnowledgeRetriever {
    pub fn new(retriever: Arc<dyn DocumentRetriever>) -> Self {
        Self {
            retriever,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// 只写 documents（失败时附带 error_note）
    pub async fn retrieve(&self, state: &mut ConversationState) {
        state.documents.clear();
        let query = state.normalized_input.as_str();
        if query.is_empty() {
            tracing::warn!("Empty query, skipping retrieval");
            return;
        }

        match self.retriever.retrieve(query, self.top_k).await {
            Ok(mut docs) if !docs.is_empty() => {
                docs.truncate(self.top_k);
                tracing::info!("Retrieved {} documents", docs.len());
                state.documents = docs;
            }
            Ok(_) => {
                tracing::warn!("No relevant documents for query");
                state.note_error(AgentError::RetrievalFailure("no relevant documents".to_string()));
            }
            Err(e) => {
                tracing::warn!("Document retrieval failed: {}", e);
                state.note_error(AgentError::RetrievalFailure(e));
            }
        }
    }
}
