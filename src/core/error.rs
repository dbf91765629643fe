//! 编排错误分类
//!
//! 节点级错误在节点内被吞掉，只以 Display 文本写入 error_note；
//! 只有编排器自身的失败（会话存取、状态损坏）才会让整轮请求失败。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("empty input")]
    EmptyInput,

    #[error("intent classification failed: {0}")]
    ClassificationFailure(String),

    #[error("identifier not found")]
    ExtractionFailure,

    #[error("order {0} not found")]
    RecordNotFound(String),

    #[error("order store error: {0}")]
    OrderStoreFailure(String),

    #[error("retrieval failed: {0}")]
    RetrievalFailure(String),

    #[error("session store unavailable: {0}")]
    SessionStoreUnavailable(String),

    #[error("generation failed: {0}")]
    GenerationFailure(String),

    #[error("conversation state corrupted: {0}")]
    StateCorrupted(String),

    #[error("notification failed: {0}")]
    Notification(String),
}

impl AgentError {
    /// 是否使整轮请求失败（其余错误只降级为 error_note）
    pub fn is_request_level(&self) -> bool {
        matches!(
            self,
            AgentError::SessionStoreUnavailable(_) | AgentError::StateCorrupted(_)
        )
    }
}
