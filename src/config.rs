//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SUPPORT__*` 覆盖（双下划线表示嵌套，如 `SUPPORT__SESSION__BACKEND=sqlite`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub session: SessionSection,
    pub retrieval: RetrievalSection,
    pub orders: OrdersSection,
    pub notify: NotifySection,
    pub web: WebSection,
}

/// [app] 段：应用名、对话历史保留轮数
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: Option<String>,
    #[serde(default = "default_max_context_turns")]
    pub max_context_turns: usize,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            max_context_turns: default_max_context_turns(),
        }
    }
}

fn default_max_context_turns() -> usize {
    10
}

/// [llm] 段：后端选择、采样温度、超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：deepseek / openai / mock
    #[serde(default = "default_provider")]
    pub provider: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// 生成最终回答的温度
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// 意图分类的温度
    #[serde(default = "default_classify_temperature")]
    pub classify_temperature: f32,
    /// 回答生成是否走流式接口（核心总是收齐后再返回）
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            temperature: default_temperature(),
            classify_temperature: default_classify_temperature(),
            stream: false,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_classify_temperature() -> f32 {
    0.3
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

/// [session] 段：会话存储后端（memory / sqlite）
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_session_backend")]
    pub backend: String,
    /// SQLite 文件路径，backend = sqlite 时使用
    pub db_path: Option<PathBuf>,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            backend: default_session_backend(),
            db_path: None,
        }
    }
}

fn default_session_backend() -> String {
    "memory".to_string()
}

/// [retrieval] 段：知识库检索条数与语料文件
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalSection {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// JSON 语料：[{ "text": "...", "metadata": { ... } }]
    pub corpus_path: Option<PathBuf>,
}

impl Default for RetrievalSection {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            corpus_path: None,
        }
    }
}

fn default_top_k() -> usize {
    3
}

/// [orders] 段：内存订单库的种子数据
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OrdersSection {
    /// JSON 订单列表：[{ "order_id": "ORD-2024-001", ... }]
    pub seed_path: Option<PathBuf>,
}

/// [notify] 段：订单邮件通知 Webhook
#[derive(Debug, Clone, Deserialize)]
pub struct NotifySection {
    pub webhook_url: Option<String>,
    #[serde(default = "default_notify_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_notify_timeout_secs(),
        }
    }
}

fn default_notify_timeout_secs() -> u64 {
    30
}

/// [web] 段：HTTP 接口监听端口（support-web）
#[derive(Debug, Clone, Deserialize)]
pub struct WebSection {
    #[serde(default = "default_web_port")]
    pub port: u16,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            port: default_web_port(),
        }
    }
}

fn default_web_port() -> u16 {
    8080
}

/// 从 config 目录加载配置，环境变量 SUPPORT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 SUPPORT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    for name in ["config/default", "../config/default"] {
        let path = format!("{name}.toml");
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SUPPORT")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
