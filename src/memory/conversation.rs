//! 短期记忆：对话历史
//!
//! 每个线程保留最近 N 轮（user + assistant）消息，随会话状态一起持久化，
//! 供回答生成时作为前文上下文。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条消息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 超出 max_turns*2 条时丢弃最旧的消息
pub fn prune_history(messages: &mut Vec<Message>, max_turns: usize) {
    let keep = max_turns * 2;
    if messages.len() > keep {
        messages.drain(..messages.len() - keep);
    }
}

/// 取最近 max_turns 轮，不修改原历史
pub fn recent_turns(messages: &[Message], max_turns: usize) -> &[Message] {
    let keep = max_turns * 2;
    &messages[messages.len().saturating_sub(keep)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_keeps_latest_turns() {
        let mut history = Vec::new();
        for i in 0..5 {
            history.push(Message::user(format!("q{i}")));
            history.push(Message::assistant(format!("a{i}")));
        }
        prune_history(&mut history, 2);
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content, "q3");
        assert_eq!(history[3].content, "a4");
    }

    #[test]
    fn test_recent_turns_short_history() {
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        assert_eq!(recent_turns(&history, 3).len(), 2);
        assert!(recent_turns(&history, 0).is_empty());
    }
}
