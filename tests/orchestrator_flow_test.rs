//! 编排流程集成测试：Mock LLM + 内存订单库 / 知识库 / 会话存储

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use support_agent::agents::{FALLBACK_APOLOGY, NO_INPUT_APOLOGY};
    use support_agent::capabilities::{InMemoryOrderStore, KeywordRetriever, WebhookNotifier};
    use support_agent::config::{AppConfig, SessionSection};
    use support_agent::core::{Intent, Orchestrator, OrchestratorBuilder, OrderRecord};
    use support_agent::llm::MockLlmClient;
    use support_agent::memory::Role;
    use support_agent::session::{create_session_store, MemorySessionStore, SessionStore};

    fn orders() -> Arc<InMemoryOrderStore> {
        Arc::new(InMemoryOrderStore::from_records([
            OrderRecord::new("ORD-2024-001")
                .with_customer("张三", "zhangsan@example.com")
                .with_product("无线蓝牙耳机", "299.00")
                .with_status("shipped"),
        ]))
    }

    fn corpus() -> Arc<KeywordRetriever> {
        let retriever = KeywordRetriever::new();
        retriever.add("Refund policy: refunds are issued within 7 days after the return arrives.");
        retriever.add("Refund requests need the original order number.");
        retriever.add("Refund status can be checked in the refund center.");
        retriever.add("Refund shipping costs are covered for damaged items.");
        retriever.add("Shipping usually takes 3 to 5 business days.");
        Arc::new(retriever)
    }

    async fn build(
        llm: Arc<MockLlmClient>,
        retriever: Arc<KeywordRetriever>,
        sessions: Arc<dyn SessionStore>,
    ) -> Orchestrator {
        OrchestratorBuilder::new(AppConfig::default())
            .with_llm(llm)
            .with_order_store(orders())
            .with_retriever(retriever)
            .with_session_store(sessions)
            .with_notifier(Arc::new(WebhookNotifier::new(None, 5)))
            .build()
            .await
    }

    #[tokio::test]
    async fn test_empty_message_skips_classification() {
        let llm = Arc::new(MockLlmClient::new());
        let orch = build(llm.clone(), corpus(), Arc::new(MemorySessionStore::new())).await;

        let outcome = orch.process_message("", "t-empty").await;

        assert_eq!(outcome.intent, Intent::Chat);
        assert_eq!(outcome.response_text, NO_INPUT_APOLOGY);
        assert!(!outcome.response_text.is_empty());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_intent_is_always_one_of_three() {
        let llm = Arc::new(MockLlmClient::with_replies([
            "ORDER",
            "回答一",
            "I'm not sure, maybe rag?",
            "回答二",
            "¯\\_(ツ)_/¯",
            "回答三",
        ]));
        let orch = build(llm, corpus(), Arc::new(MemorySessionStore::new())).await;

        let a = orch.process_message("ORD-2024-001 到哪了", "t1").await;
        let b = orch.process_message("refund policy", "t2").await;
        let c = orch.process_message("hi", "t3").await;

        assert_eq!(a.intent, Intent::Order);
        assert_eq!(b.intent, Intent::Knowledge);
        assert_eq!(c.intent, Intent::Chat);
    }

    #[tokio::test]
    async fn test_order_lookup_sets_email_prompt() {
        let llm = Arc::new(MockLlmClient::with_replies(["order", "您的订单已发货。"]));
        let sessions = Arc::new(MemorySessionStore::new());
        let orch = build(llm.clone(), corpus(), sessions.clone()).await;

        let outcome = orch.process_message("帮我查下订单 ORD-2024-001", "t1").await;

        let record = outcome.order_record.expect("order record");
        assert_eq!(record.order_id, "ORD-2024-001");
        assert_eq!(record.status, "shipped");
        assert!(outcome.error_note.is_none());
        assert_eq!(outcome.response_text, "您的订单已发货。");

        let state = sessions.load("t1").await.unwrap().unwrap();
        assert!(state.email_prompt_pending);
        assert_eq!(
            state.pending_email_address.as_deref(),
            Some("zhangsan@example.com")
        );

        // classify + respond, no model extraction
        assert_eq!(llm.call_count(), 2);
        let calls = llm.calls();
        let prompt = &calls[1].last().unwrap().content;
        assert!(prompt.contains("order_id: ORD-2024-001"));
        assert!(prompt.contains("zhangsan@example.com"));
        assert!(prompt.contains("just looked up an order"));
    }

    #[tokio::test]
    async fn test_missing_identifier_falls_back_to_model() {
        let llm = Arc::new(MockLlmClient::with_replies([
            "order",
            "not found",
            "请提供您的订单号。",
        ]));
        let orch = build(llm.clone(), corpus(), Arc::new(MemorySessionStore::new())).await;

        let outcome = orch.process_message("订单：AB12 怎么还没到", "t1").await;

        assert_eq!(outcome.intent, Intent::Order);
        assert!(outcome.order_record.is_none());
        assert_eq!(outcome.error_note.as_deref(), Some("identifier not found"));
        assert_eq!(outcome.response_text, "请提供您的订单号。");
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unknown_order_note() {
        let llm = Arc::new(MockLlmClient::with_replies(["order", "没有找到该订单。"]));
        let orch = build(llm, corpus(), Arc::new(MemorySessionStore::new())).await;

        let outcome = orch.process_message("ORD-2024-404 在哪", "t1").await;

        assert!(outcome.order_record.is_none());
        assert_eq!(outcome.error_note.as_deref(), Some("order ORD-2024-404 not found"));
    }

    #[tokio::test]
    async fn test_knowledge_documents_bounded_by_top_k() {
        let llm = Arc::new(MockLlmClient::with_replies(["rag", "退款 7 天内到账。"]));
        let orch = build(llm.clone(), corpus(), Arc::new(MemorySessionStore::new())).await;

        let outcome = orch.process_message("refund policy", "t1").await;

        assert_eq!(outcome.intent, Intent::Knowledge);
        assert_eq!(outcome.documents.len(), 3);
        assert!(outcome
            .documents
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));
        let calls = llm.calls();
        let prompt = &calls[1].last().unwrap().content;
        assert!(prompt.contains("Knowledge base results:"));
        assert!(prompt.contains("1. Refund"));
    }

    #[tokio::test]
    async fn test_empty_corpus_still_answers() {
        let llm = Arc::new(MockLlmClient::with_replies(["rag", "一般 7 天内可以退货。"]));
        let orch = build(
            llm.clone(),
            Arc::new(KeywordRetriever::new()),
            Arc::new(MemorySessionStore::new()),
        )
        .await;

        let outcome = orch.process_message("退货政策是什么", "t1").await;

        assert_eq!(outcome.intent, Intent::Knowledge);
        assert!(outcome.documents.is_empty());
        assert!(outcome.error_note.is_some());
        assert_eq!(outcome.response_text, "一般 7 天内可以退货。");
        let calls = llm.calls();
        let prompt = &calls[1].last().unwrap().content;
        assert!(!prompt.contains("Knowledge base results"));
    }

    #[tokio::test]
    async fn test_two_turns_keep_continuity() {
        let llm = Arc::new(MockLlmClient::with_replies([
            "order",
            "订单已发货，需要把订单信息发到 zhangsan@example.com 吗？",
            "chat",
            "好的。",
        ]));
        let sessions = Arc::new(MemorySessionStore::new());
        let orch = build(llm.clone(), corpus(), sessions.clone()).await;

        orch.process_message("ORD-2024-001 到哪了", "t1").await;
        let second = orch.process_message("好的，谢谢", "t1").await;

        assert_eq!(second.intent, Intent::Chat);
        assert_eq!(second.order_record.unwrap().order_id, "ORD-2024-001");

        let state = sessions.load("t1").await.unwrap().unwrap();
        assert!(state.email_prompt_pending);
        assert_eq!(state.turn, 2);
        assert_eq!(state.history.len(), 4);

        // second respond call: system + previous turn + current prompt with email instruction
        let calls = llm.calls();
        let call = &calls[3];
        assert_eq!(call.len(), 4);
        assert_eq!(call[1].role, Role::User);
        assert_eq!(call[1].content, "ORD-2024-001 到哪了");
        assert!(call[3].content.contains("never claim an email has been sent"));
        assert!(!call[3].content.contains("just looked up"));

        // threads are independent
        let other = orch.process_message("你好", "t2").await;
        assert!(other.order_record.is_none());
    }

    #[tokio::test]
    async fn test_generation_failure_returns_apology() {
        let llm = Arc::new(MockLlmClient::with_replies(["chat"]));
        llm.push_error("upstream 500");
        let orch = build(llm, corpus(), Arc::new(MemorySessionStore::new())).await;

        let outcome = orch.process_message("在吗", "t1").await;

        assert_eq!(outcome.response_text, FALLBACK_APOLOGY);
        assert!(outcome.error_note.unwrap().contains("upstream 500"));
    }

    #[tokio::test]
    async fn test_notification_requires_configured_webhook() {
        let llm = Arc::new(MockLlmClient::with_replies(["order", "已发货"]));
        let sessions = Arc::new(MemorySessionStore::new());
        let orch = build(llm, corpus(), sessions.clone()).await;

        orch.process_message("ORD-2024-001", "t1").await;
        let result = orch.confirm_notification("t1").await;

        assert!(result.is_err());
        let state = sessions.load("t1").await.unwrap().unwrap();
        assert!(state.email_prompt_pending);
    }

    #[tokio::test]
    async fn test_ephemeral_fallback_keeps_contract() {
        let sessions = create_session_store(&SessionSection {
            backend: "sqlite".to_string(),
            db_path: None,
        })
        .await;
        assert_eq!(sessions.backend(), "memory");

        let llm = Arc::new(MockLlmClient::with_replies(["order", "已发货", "chat", "不客气"]));
        let orch = build(llm, corpus(), sessions.clone()).await;

        let first = orch.process_message("ORD-2024-001", "t1").await;
        let second = orch.process_message("谢谢", "t1").await;

        assert!(first.order_record.is_some());
        assert!(second.order_record.is_some());
        assert_eq!(sessions.load("t1").await.unwrap().unwrap().turn, 2);
    }
}
