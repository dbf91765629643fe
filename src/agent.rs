//! 无界面运行时
//!
//! 供命令行 REPL 与 HTTP 接口共用：加载配置、组装编排器、分配线程 ID。

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::{create_orchestrator_builder, Orchestrator};

/// 按配置（缺失时用默认值）创建可多会话共享的编排器
pub async fn create_orchestrator(config_path: Option<PathBuf>) -> Arc<Orchestrator> {
    let builder = create_orchestrator_builder(config_path);
    tracing::info!(
        provider = %builder.config().llm.provider,
        session_backend = %builder.config().session.backend,
        "Creating orchestrator"
    );
    Arc::new(builder.build().await)
}

/// 调用方未提供线程 ID 时生成新的
pub fn resolve_thread_id(thread_id: Option<&str>) -> String {
    thread_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
