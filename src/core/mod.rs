//! 核心编排层：会话状态、错误分类、编排图、编排器与构建器

pub mod builder;
pub mod error;
pub mod graph;
pub mod orchestrator;
pub mod state;

pub use builder::{create_orchestrator_builder, OrchestratorBuilder};
pub use error::AgentError;
pub use graph::{path_for, Node};
pub use orchestrator::{NotificationOutcome, Orchestrator, REQUEST_FAILED_APOLOGY};
pub use state::{ConversationState, Document, Intent, OrderRecord, TurnOutcome};
