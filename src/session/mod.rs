//! 会话存储：按线程保存 ConversationState
//!
//! 内存实现随进程消失；SQLite 实现（feature = "async-sqlite"）跨重启保留。

#[cfg(feature = "async-sqlite")]
mod persistent;
mod store;

#[cfg(feature = "async-sqlite")]
pub use persistent::PersistentSessionStore;
pub use store::{create_session_store, MemorySessionStore, SessionStore};
