//! 编排器：每条消息跑一遍编排图
//!
//! 加载线程状态（没有则新建）→ 开始新一轮 → 从 router 起按转移表依次执行节点 →
//! 写入历史 → 整体保存 → 返回 TurnOutcome。
//! 节点失败只降级为 error_note；会话存取失败才使整轮失败，此时返回通用致歉且不保存任何东西。

use std::sync::Arc;

use serde::Serialize;

use crate::agents::{IntentRouter, KnowledgeRetriever, OrderResolver, ResponseSynthesizer};
use crate::capabilities::Notifier;
use crate::core::graph::Node;
use crate::core::{AgentError, ConversationState, Intent, TurnOutcome};
use crate::session::SessionStore;

/// 整轮失败时的通用回复
pub const REQUEST_FAILED_APOLOGY: &str = "抱歉，处理您的请求时出现错误，请稍后再试。";

/// confirm_notification 的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Sent {
        order_id: String,
        email: Option<String>,
    },
    /// 线程上没有待确认的订单邮件
    NothingPending,
}

pub struct Orchestrator {
    router: IntentRouter,
    order: OrderResolver,
    knowledge: KnowledgeRetriever,
    responder: ResponseSynthesizer,
    sessions: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    max_context_turns: usize,
}

impl Orchestrator {
    pub fn new(
        router: IntentRouter,
        order: OrderResolver,
        knowledge: KnowledgeRetriever,
        responder: ResponseSynthesizer,
        sessions: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            router,
            order,
            knowledge,
            responder,
            sessions,
            notifier,
            max_context_turns: 10,
        }
    }

    pub fn with_max_context_turns(mut self, turns: usize) -> Self {
        self.max_context_turns = turns;
        self
    }

    pub fn session_backend(&self) -> &'static str {
        self.sessions.backend()
    }

    /// 处理一条用户消息；从不返回错误
    pub async fn process_message(&self, message: &str, thread_id: &str) -> TurnOutcome {
        match self.run_turn(message, thread_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(thread_id, "Turn failed: {}", e);
                TurnOutcome {
                    response_text: REQUEST_FAILED_APOLOGY.to_string(),
                    intent: Intent::Chat,
                    order_record: None,
                    documents: Vec::new(),
                    error_note: Some(e.to_string()),
                }
            }
        }
    }

    async fn run_turn(&self, message: &str, thread_id: &str) -> Result<TurnOutcome, AgentError> {
        let mut state = self.sessions.load(thread_id).await?.unwrap_or_default();
        state.begin_turn(message);

        let mut node = Node::ENTRY;
        loop {
            tracing::debug!(thread_id, node = node.name(), "Running node");
            self.run_node(node, &mut state).await;
            match node.next(state.intent) {
                Some(next) => node = next,
                None => break,
            }
        }

        state.finish_turn(self.max_context_turns);
        self.sessions.save(thread_id, &state).await?;
        tracing::info!(
            thread_id,
            turn = state.turn,
            intent = %state.intent,
            "Turn completed"
        );
        Ok(TurnOutcome::from(&state))
    }

    async fn run_node(&self, node: Node, state: &mut ConversationState) {
        match node {
            Node::Router => self.router.route(state).await,
            Node::Order => self.order.resolve(state).await,
            Node::Knowledge => self.knowledge.retrieve(state).await,
            Node::Respond => self.responder.respond(state).await,
            Node::Done => {}
        }
    }

    /// 用户确认后发送订单邮件；只有这里会调用 Notifier
    pub async fn confirm_notification(
        &self,
        thread_id: &str,
    ) -> Result<NotificationOutcome, AgentError> {
        let Some(mut state) = self.sessions.load(thread_id).await? else {
            return Ok(NotificationOutcome::NothingPending);
        };
        let order = match (&state.order_record, state.email_prompt_pending) {
            (Some(order), true) => order.clone(),
            _ => return Ok(NotificationOutcome::NothingPending),
        };

        self.notifier
            .send_order_summary(&order)
            .await
            .map_err(AgentError::Notification)?;

        let email = state.pending_email_address.take();
        state.email_prompt_pending = false;
        self.sessions.save(thread_id, &state).await?;
        tracing::info!(thread_id, order_id = %order.order_id, "Order summary sent");

        Ok(NotificationOutcome::Sent {
            order_id: order.order_id,
            email,
        })
    }

    /// 读取线程当前状态（只读，供诊断与接口层使用）
    pub async fn snapshot(&self, thread_id: &str) -> Result<Option<ConversationState>, AgentError> {
        self.sessions.load(thread_id).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::capabilities::{InMemoryOrderStore, KeywordRetriever, LlmIntentClassifier};
    use crate::llm::MockLlmClient;
    use crate::session::MemorySessionStore;

    struct RecordingNotifier {
        sent: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_order_summary(&self, order: &crate::core::OrderRecord) -> Result<(), String> {
            self.sent.lock().unwrap().push(order.order_id.clone());
            Ok(())
        }
    }

    struct DownStore;

    #[async_trait]
    impl SessionStore for DownStore {
        async fn load(&self, _: &str) -> Result<Option<ConversationState>, AgentError> {
            Err(AgentError::SessionStoreUnavailable("connection refused".into()))
        }
        async fn save(&self, _: &str, _: &ConversationState) -> Result<(), AgentError> {
            Err(AgentError::SessionStoreUnavailable("connection refused".into()))
        }
        async fn delete(&self, _: &str) -> Result<bool, AgentError> {
            Ok(false)
        }
        fn backend(&self) -> &'static str {
            "down"
        }
    }

    fn orchestrator(
        llm: Arc<MockLlmClient>,
        sessions: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Orchestrator {
        let orders = Arc::new(InMemoryOrderStore::from_records([
            crate::core::OrderRecord::new("ORD-2024-001").with_customer("张三", "zs@example.com"),
        ]));
        Orchestrator::new(
            IntentRouter::new(Arc::new(LlmIntentClassifier::new(llm.clone()))),
            OrderResolver::new(orders, llm.clone()),
            KnowledgeRetriever::new(Arc::new(KeywordRetriever::new())),
            ResponseSynthesizer::new(llm),
            sessions,
            notifier,
        )
    }

    fn recorder() -> Arc<RecordingNotifier> {
        Arc::new(RecordingNotifier {
            sent: std::sync::Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_store_failure_is_request_level() {
        let llm = Arc::new(MockLlmClient::new());
        let orch = orchestrator(llm.clone(), Arc::new(DownStore), recorder());

        let outcome = orch.process_message("你好", "t1").await;

        assert_eq!(outcome.response_text, REQUEST_FAILED_APOLOGY);
        assert_eq!(outcome.intent, Intent::Chat);
        assert!(outcome.error_note.unwrap().contains("session store unavailable"));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_confirm_notification_sends_once() {
        let llm = Arc::new(MockLlmClient::with_replies(["order", "订单已发货，需要发送邮件吗？"]));
        let notifier = recorder();
        let sessions = Arc::new(MemorySessionStore::new());
        let orch = orchestrator(llm, sessions.clone(), notifier.clone());

        orch.process_message("ORD-2024-001 到哪了", "t1").await;
        assert!(notifier.sent.lock().unwrap().is_empty());

        let outcome = orch.confirm_notification("t1").await.unwrap();
        assert_eq!(
            outcome,
            NotificationOutcome::Sent {
                order_id: "ORD-2024-001".to_string(),
                email: Some("zs@example.com".to_string()),
            }
        );
        assert_eq!(*notifier.sent.lock().unwrap(), vec!["ORD-2024-001".to_string()]);

        let state = orch.snapshot("t1").await.unwrap().unwrap();
        assert!(!state.email_prompt_pending);
        assert!(state.order_record.is_some());
        assert_eq!(sessions.len().await, 1);

        let again = orch.confirm_notification("t1").await.unwrap();
        assert_eq!(again, NotificationOutcome::NothingPending);
    }

    #[tokio::test]
    async fn test_confirm_on_unknown_thread() {
        let orch = orchestrator(
            Arc::new(MockLlmClient::new()),
            Arc::new(MemorySessionStore::new()),
            recorder(),
        );
        assert_eq!(
            orch.confirm_notification("nobody").await.unwrap(),
            NotificationOutcome::NothingPending
        );
        assert!(orch.snapshot("nobody").await.unwrap().is_none());
    }

    struct OfflineOrders;

    #[async_trait]
    impl crate::capabilities::OrderStore for OfflineOrders {
        async fn get_order(&self, _: &str) -> Result<Option<crate::core::OrderRecord>, String> {
            Err("db offline".to_string())
        }
    }

    #[tokio::test]
    async fn test_order_store_error_still_answers() {
        let llm = Arc::new(MockLlmClient::with_replies(["order", "订单系统暂时不可用，请稍后再试。"]));
        let sessions = Arc::new(MemorySessionStore::new());
        let orch = Orchestrator::new(
            IntentRouter::new(Arc::new(LlmIntentClassifier::new(llm.clone()))),
            OrderResolver::new(Arc::new(OfflineOrders), llm.clone()),
            KnowledgeRetriever::new(Arc::new(KeywordRetriever::new())),
            ResponseSynthesizer::new(llm.clone()),
            sessions,
            recorder(),
        );

        let outcome = orch.process_message("ORD-2024-001 到哪了", "t1").await;

        assert_eq!(outcome.intent, Intent::Order);
        assert_eq!(outcome.response_text, "订单系统暂时不可用，请稍后再试。");
        assert!(outcome.order_record.is_none());
        assert!(outcome.error_note.unwrap().starts_with("order store error"));
        assert_eq!(llm.call_count(), 2);

        let state = orch.snapshot("t1").await.unwrap().unwrap();
        assert!(!state.email_prompt_pending);
        assert_eq!(state.turn, 1);
    }
}
