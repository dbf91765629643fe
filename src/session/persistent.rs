//! 持久化会话存储
//!
//! 使用 SQLite 保存每个线程的会话状态（JSON），支持跨重启恢复。
//! 每次保存整体 upsert，同一 thread_id 后写者胜。

#![cfg(feature = "async-sqlite")]

use std::path::Path;

use async_trait::async_trait;
use sqlx::Row;

use super::store::SessionStore;
use crate::core::{AgentError, ConversationState};

pub struct PersistentSessionStore {
    pool: sqlx::sqlite::SqlitePool,
}

impl PersistentSessionStore {
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, sqlx::Error> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path.as_ref().display());

        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        let store = Self { pool };
        store.init_tables().await?;
        Ok(store)
    }

    async fn init_tables(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS conversation_sessions (
                thread_id TEXT PRIMARY KEY,
                state TEXT NOT NULL,
                turn INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn unavailable(e: sqlx::Error) -> AgentError {
    AgentError::SessionStoreUnavailable(e.to_string())
}

#[async_trait]
impl SessionStore for PersistentSessionStore {
    async fn load(&self, thread_id: &str) -> Result<Option<ConversationState>, AgentError> {
        let row = sqlx::query("SELECT state FROM conversation_sessions WHERE thread_id = ?")
            .bind(thread_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.try_get("state").map_err(unavailable)?;
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| AgentError::StateCorrupted(format!("thread {thread_id}: {e}")))
    }

    async fn save(&self, thread_id: &str, state: &ConversationState) -> Result<(), AgentError> {
        let raw = serde_json::to_string(state)
            .map_err(|e| AgentError::StateCorrupted(e.to_string()))?;

        sqlx::query(
            "INSERT INTO conversation_sessions (thread_id, state, turn, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(thread_id) DO UPDATE SET
                state = excluded.state,
                turn = excluded.turn,
                updated_at = excluded.updated_at",
        )
        .bind(thread_id)
        .bind(raw)
        .bind(state.turn as i64)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(())
    }

    async fn delete(&self, thread_id: &str) -> Result<bool, AgentError> {
        let result = sqlx::query("DELETE FROM conversation_sessions WHERE thread_id = ?")
            .bind(thread_id)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(result.rows_affected() > 0)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
