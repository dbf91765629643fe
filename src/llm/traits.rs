//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient：complete（非流式）、complete_stream（流式 Token）。
//! 编排核心只依赖完整字符串：流式输出由 collect_stream 收齐后再使用。

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{stream, Stream, TryStreamExt};
use thiserror::Error;

use crate::memory::Message;

/// 流式 Token
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// LLM 调用错误
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Stream error: {0}")]
    Stream(String),
}

/// 单次生成参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

impl GenerationParams {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature,
            max_tokens: None,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// LLM 客户端 trait：非流式完成与流式完成（返回 Token 流）
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(
        &self,
        messages: &[Message],
        params: &GenerationParams,
    ) -> Result<String, LlmError>;

    /// 流式完成；默认实现把非流式结果包装成单元素流
    async fn complete_stream(
        &self,
        messages: &[Message],
        params: &GenerationParams,
    ) -> Result<TokenStream, LlmError> {
        let content = self.complete(messages, params).await?;
        Ok(Box::pin(stream::iter(vec![Ok(content)])))
    }
}

/// 组装 [system?, user] 消息
pub fn build_messages(prompt: &str, system_prompt: Option<&str>) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_prompt {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(prompt));
    messages
}

/// 文本生成能力：prompt + 可选 system prompt，返回去掉首尾空白的完整文本
pub async fn generate_text(
    llm: &dyn LlmClient,
    prompt: &str,
    system_prompt: Option<&str>,
    params: &GenerationParams,
) -> Result<String, LlmError> {
    let messages = build_messages(prompt, system_prompt);
    let text = llm.complete(&messages, params).await?;
    Ok(text.trim().to_string())
}

/// 把 Token 流收齐为完整字符串，任一分片出错即整体失败
pub async fn collect_stream(stream: TokenStream) -> Result<String, LlmError> {
    stream
        .try_fold(String::new(), |mut acc, chunk| async move {
            acc.push_str(&chunk);
            Ok::<_, LlmError>(acc)
        })
        .await
}
