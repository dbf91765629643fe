//! 编排图中的节点
//!
//! - **router**: 意图路由
//! - **order**: 订单号提取与订单查询（提取级联见 extract）
//! - **knowledge**: 知识检索
//! - **responder**: 回答合成
//!
//! 每个节点只写自己负责的 ConversationState 字段，失败降级为默认值 + error_note。

pub mod extract;
pub mod knowledge;
pub mod order;
pub mod responder;
pub mod router;

pub use knowledge::{KnowledgeRetriever, DEFAULT_TOP_K};
pub use order::OrderResolver;
pub use responder::{build_prompt, ResponseSynthesizer, FALLBACK_APOLOGY, NO_INPUT_APOLOGY};
pub use router::IntentRouter;
