//! 客服智能体 HTTP 接口
//!
//! 启动: cargo run --bin support-web --features web
//! - POST /query  {"query": "...", "thread_id": "..."} → TurnOutcome
//! - POST /notify {"thread_id": "..."}                 → 通知结果

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use support_agent::agent::resolve_thread_id;
use support_agent::core::{
    create_orchestrator_builder, NotificationOutcome, Orchestrator, TurnOutcome,
};

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<Orchestrator>,
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
    #[serde(default)]
    thread_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct QueryResponse {
    thread_id: String,
    #[serde(flatten)]
    outcome: TurnOutcome,
}

#[derive(Debug, Deserialize)]
struct NotifyRequest {
    thread_id: String,
}

#[derive(Debug, Serialize)]
struct NotifyResponse {
    thread_id: String,
    #[serde(flatten)]
    outcome: NotificationOutcome,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    support_agent::observability::init();

    let builder = create_orchestrator_builder(None);
    let port = std::env::var("SUPPORT_WEB_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(builder.config().web.port);
    tracing::info!(
        provider = %builder.config().llm.provider,
        session_backend = %builder.config().session.backend,
        "Creating orchestrator"
    );
    let state = AppState {
        orchestrator: Arc::new(builder.build().await),
    };

    let app = Router::new()
        .route("/query", post(api_query))
        .route("/notify", post(api_notify))
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Support agent API: http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn api_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Json<QueryResponse> {
    let thread_id = resolve_thread_id(req.thread_id.as_deref());
    let outcome = state.orchestrator.process_message(&req.query, &thread_id).await;
    Json(QueryResponse { thread_id, outcome })
}

async fn api_notify(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<NotifyResponse>, (StatusCode, String)> {
    let thread_id = req.thread_id.trim().to_string();
    if thread_id.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "thread_id is required".to_string()));
    }

    let outcome = state
        .orchestrator
        .confirm_notification(&thread_id)
        .await
        .map_err(|e| {
            let status = if e.is_request_level() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::BAD_GATEWAY
            };
            (status, e.to_string())
        })?;
    Ok(Json(NotifyResponse { thread_id, outcome }))
}
