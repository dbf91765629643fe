//! 记忆层：线程内对话历史与检索分词

pub mod conversation;
pub mod tokenizer;

pub use conversation::{prune_history, recent_turns, Message, Role};
