//! LLM 层：客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）

pub mod deepseek;
pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use crate::config::AppConfig;

pub use deepseek::{create_deepseek_client, DEEPSEEK_CHAT};
pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
pub use traits::{
    build_messages, collect_stream, generate_text, GenerationParams, LlmClient, LlmError,
    TokenStream,
};

/// 按配置与环境变量选择 LLM 后端；无可用 Key 或 provider = mock 时使用 Mock
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let timeout = cfg.llm.timeouts.request;
    if provider == "mock" {
        tracing::info!("Using Mock LLM (configured)");
        return Arc::new(MockLlmClient::new());
    }

    let has_deepseek_key = std::env::var("DEEPSEEK_API_KEY").is_ok();
    let has_openai_key = std::env::var("OPENAI_API_KEY").is_ok();
    let use_deepseek = has_deepseek_key || (provider == "deepseek" && has_openai_key);
    let use_openai = has_openai_key && provider != "deepseek";

    if use_deepseek {
        let model = cfg.llm.model.clone().unwrap_or_else(|| DEEPSEEK_CHAT.to_string());
        tracing::info!("Using DeepSeek LLM ({})", model);
        Arc::new(create_deepseek_client(Some(&model)).with_request_timeout(timeout))
    } else if use_openai {
        let model = cfg.llm.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string());
        tracing::info!("Using OpenAI LLM ({})", model);
        Arc::new(
            OpenAiClient::new(cfg.llm.base_url.as_deref(), &model, None)
                .with_request_timeout(timeout),
        )
    } else {
        tracing::warn!("No API key set or provider unknown, using Mock LLM");
        Arc::new(MockLlmClient::new())
    }
}
