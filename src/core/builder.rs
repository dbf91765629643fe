//! 编排器构建器：统一的初始化逻辑
//!
//! 所有能力默认按配置创建，测试与嵌入方可用 with_* 注入自己的实现。
//! 种子文件读取失败只记录告警并使用空库，不阻止启动。

use std::path::PathBuf;
use std::sync::Arc;

use crate::agents::{IntentRouter, KnowledgeRetriever, OrderResolver, ResponseSynthesizer};
use crate::capabilities::{
    DocumentRetriever, InMemoryOrderStore, IntentClassifier, KeywordRetriever,
    LlmIntentClassifier, Notifier, OrderStore, WebhookNotifier,
};
use crate::config::AppConfig;
use crate::core::Orchestrator;
use crate::llm::{create_llm_from_config, LlmClient};
use crate::session::{create_session_store, SessionStore};

pub struct OrchestratorBuilder {
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
    classifier: Option<Arc<dyn IntentClassifier>>,
    orders: Option<Arc<dyn OrderStore>>,
    retriever: Option<Arc<dyn DocumentRetriever>>,
    sessions: Option<Arc<dyn SessionStore>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl OrchestratorBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            llm: None,
            classifier: None,
            orders: None,
            retriever: None,
            sessions: None,
            notifier: None,
        }
    }

    /// 文本生成后端（同时用于分类、订单号兜底提取与回答生成）
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_order_store(mut self, orders: Arc<dyn OrderStore>) -> Self {
        self.orders = Some(orders);
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn DocumentRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn build_order_store(&self) -> Arc<dyn OrderStore> {
        let Some(path) = self.config.orders.seed_path.as_ref() else {
            return Arc::new(InMemoryOrderStore::new());
        };
        match InMemoryOrderStore::load_json(path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::warn!("Failed to load order seed {:?}: {}", path, e);
                Arc::new(InMemoryOrderStore::new())
            }
        }
    }

    fn build_retriever(&self) -> Arc<dyn DocumentRetriever> {
        let Some(path) = self.config.retrieval.corpus_path.as_ref() else {
            return Arc::new(KeywordRetriever::new());
        };
        match KeywordRetriever::load_json(path) {
            Ok(retriever) => Arc::new(retriever),
            Err(e) => {
                tracing::warn!("Failed to load knowledge corpus {:?}: {}", path, e);
                Arc::new(KeywordRetriever::new())
            }
        }
    }

    /// 组装编排器；会话存储未注入时按 [session] 配置创建（失败退回内存）
    pub async fn build(self) -> Orchestrator {
        let cfg = &self.config;
        let llm = self
            .llm
            .clone()
            .unwrap_or_else(|| create_llm_from_config(cfg));
        let classifier = self.classifier.clone().unwrap_or_else(|| {
            Arc::new(
                LlmIntentClassifier::new(llm.clone())
                    .with_temperature(cfg.llm.classify_temperature),
            )
        });
        let orders = self
            .orders
            .clone()
            .unwrap_or_else(|| self.build_order_store());
        let retriever = self
            .retriever
            .clone()
            .unwrap_or_else(|| self.build_retriever());
        let notifier = self.notifier.clone().unwrap_or_else(|| {
            Arc::new(WebhookNotifier::new(
                cfg.notify.webhook_url.clone(),
                cfg.notify.timeout_secs,
            ))
        });
        let sessions = match self.sessions.clone() {
            Some(sessions) => sessions,
            None => create_session_store(&cfg.session).await,
        };

        Orchestrator::new(
            IntentRouter::new(classifier),
            OrderResolver::new(orders, llm.clone()),
            KnowledgeRetriever::new(retriever).with_top_k(cfg.retrieval.top_k),
            ResponseSynthesizer::new(llm)
                .with_temperature(cfg.llm.temperature)
                .with_streaming(cfg.llm.stream)
                .with_max_history_turns(cfg.app.max_context_turns),
            sessions,
            notifier,
        )
        .with_max_context_turns(cfg.app.max_context_turns)
    }
}

/// 便捷函数：加载配置（失败则用默认值）并创建构建器
pub fn create_orchestrator_builder(config_path: Option<PathBuf>) -> OrchestratorBuilder {
    let config = crate::config::load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });
    OrchestratorBuilder::new(config)
}
