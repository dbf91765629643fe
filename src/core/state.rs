//! 会话状态：每轮贯穿编排图的唯一记录
//!
//! 各节点只写自己负责的字段（显式字段级写入），不会删除前面节点写入的内容。

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::memory::{prune_history, Message};

/// 识别出的意图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// 订单 / 工单 / 物流查询
    Order,
    /// 需要检索知识库的问题
    Knowledge,
    /// 闲聊及其它一切无法归类的输入
    #[default]
    Chat,
}

impl Intent {
    /// 把分类器的原始回复解析为意图：小写后包含 "order" → Order，
    /// 包含 "rag" / "knowledge" → Knowledge，其余一律 Chat
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.contains("order") {
            Intent::Order
        } else if label.contains("rag") || label.contains("knowledge") {
            Intent::Knowledge
        } else {
            Intent::Chat
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Order => "order",
            Intent::Knowledge => "knowledge",
            Intent::Chat => "chat",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 订单记录（来自外部订单库）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default = "default_order_status")]
    pub status: String,
    #[serde(default)]
    pub amount: Option<String>,
}

fn default_order_status() -> String {
    "pending".to_string()
}

impl OrderRecord {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            customer_name: None,
            customer_email: None,
            product: None,
            status: default_order_status(),
            amount: None,
        }
    }

    pub fn with_customer(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self.customer_email = Some(email.into());
        self
    }

    pub fn with_product(mut self, product: impl Into<String>, amount: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self.amount = Some(amount.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// 渲染为 prompt 中的结构化文本，缺失字段显示为 "-"
    pub fn render(&self) -> String {
        let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        format!(
            "- order_id: {}\n- customer_name: {}\n- customer_email: {}\n- product: {}\n- status: {}\n- amount: {}",
            self.order_id,
            field(&self.customer_name),
            field(&self.customer_email),
            field(&self.product),
            self.status,
            field(&self.amount),
        )
    }
}

/// 检索到的知识库片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub relevance_score: f32,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    pub fn new(text: impl Into<String>, relevance_score: f32) -> Self {
        Self {
            text: text.into(),
            relevance_score,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// 一个线程的会话状态，每轮加载、经过编排图、再整体保存
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationState {
    /// 用户原始输入
    pub raw_input: String,
    /// 下游节点使用的工作副本
    pub normalized_input: String,
    pub intent: Intent,
    /// 仅在订单查询成功后存在，跨轮保留
    pub order_record: Option<OrderRecord>,
    /// 按相关度降序，长度不超过 top_k
    pub documents: Vec<Document>,
    pub response_text: String,
    /// 最近一次非致命错误，仅用于诊断
    pub error_note: Option<String>,
    /// 已查到订单、等待用户确认是否发送邮件
    pub email_prompt_pending: bool,
    pub pending_email_address: Option<String>,
    /// 最近若干轮对话
    pub history: Vec<Message>,
    /// 已完成的轮数
    pub turn: u64,
}

impl ConversationState {
    pub fn new(message: &str) -> Self {
        let mut state = Self::default();
        state.begin_turn(message);
        state
    }

    /// 开始新一轮：覆盖本轮字段，保留跨轮字段（订单、邮件确认标记、历史）
    pub fn begin_turn(&mut self, message: &str) {
        self.raw_input = message.to_string();
        self.normalized_input = message.trim().to_string();
        self.intent = Intent::Chat;
        self.documents.clear();
        self.response_text.clear();
        self.error_note = None;
    }

    /// 本轮结束：写入历史并计数
    pub fn finish_turn(&mut self, max_context_turns: usize) {
        if !self.normalized_input.is_empty() {
            self.history.push(Message::user(self.normalized_input.clone()));
            self.history.push(Message::assistant(self.response_text.clone()));
            prune_history(&mut self.history, max_context_turns);
        }
        self.turn += 1;
    }

    /// 记录非致命错误；后写覆盖先写
    pub fn note_error(&mut self, note: impl fmt::Display) {
        self.error_note = Some(note.to_string());
    }
}

/// processMessage 返回给调用方的字段子集
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub response_text: String,
    pub intent: Intent,
    pub order_record: Option<OrderRecord>,
    pub documents: Vec<Document>,
    pub error_note: Option<String>,
}

impl From<&ConversationState> for TurnOutcome {
    fn from(state: &ConversationState) -> Self {
        Self {
            response_text: state.response_text.clone(),
            intent: state.intent,
            order_record: state.order_record.clone(),
            documents: state.documents.clone(),
            error_note: state.error_note.clone(),
        }
    }
}
