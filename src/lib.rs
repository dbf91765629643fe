//! Support Agent - 多节点客服智能体编排核心
//!
//! 模块划分：
//! - **agent**: 无界面运行时（供命令行 / HTTP 调用）
//! - **agents**: 编排图节点（路由、订单、知识检索、回答合成）
//! - **capabilities**: 外部能力契约（意图分类、订单库、知识检索、邮件通知）及本地实现
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 会话状态、错误分类、编排图、编排器
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **memory**: 对话历史与分词
//! - **observability**: tracing 日志初始化
//! - **session**: 会话存储（内存 / SQLite）

pub mod agent;
pub mod agents;
pub mod capabilities;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod session;

pub use core::{Orchestrator, OrchestratorBuilder, TurnOutcome};
