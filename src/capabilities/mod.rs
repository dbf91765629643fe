//! 能力契约：编排核心调用、但不实现的外部服务
//!
//! - **classifier**: 意图分类（默认基于文本生成）
//! - **orders**: 订单查询
//! - **retrieval**: 知识库检索
//! - **notify**: 订单邮件通知
//!
//! 每个契约附带一个本地实现，供测试与离线演示使用。

pub mod classifier;
pub mod notify;
pub mod orders;
pub mod retrieval;

pub use classifier::{IntentClassifier, LlmIntentClassifier};
pub use notify::{Notifier, WebhookNotifier};
pub use orders::{InMemoryOrderStore, OrderStore};
pub use retrieval::{DocumentRetriever, KeywordRetriever, Passage};
