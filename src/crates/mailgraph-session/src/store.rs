//! Extensible session storage trait for custom backend implementations
//!
//! This module defines [`SessionStore`] - the abstraction that lets the
//! assistant core persist conversation history in any storage system
//! (in-memory, SQLite, PostgreSQL, Redis, object storage) without
//! assuming a specific engine.
//!
//! # Overview
//!
//! A store keeps one append-only turn sequence per (user identity,
//! thread identity) pair:
//!
//! - **`load`** returns the ordered history for a thread; a thread that
//!   was never written loads as an empty sequence, not an error - first
//!   use of a new thread id is indistinguishable from an empty one.
//! - **`append`** is the only mutation. Stores never truncate or compact
//!   history; pruning is an external concern layered on top.
//! - Distinct thread ids are fully isolated: concurrent reads and writes
//!   for different threads must not interfere.
//!
//! # Implementing a Custom Backend
//!
//! ```rust,ignore
//! use mailgraph_session::{SessionStore, Turn, Result, SessionError};
//! use async_trait::async_trait;
//!
//! struct SqliteSessionStore {
//!     pool: sqlx::SqlitePool,
//! }
//!
//! #[async_trait]
//! impl SessionStore for SqliteSessionStore {
//!     async fn load(&self, user_id: &str, thread_id: &str) -> Result<Vec<Turn>> {
//!         let rows = sqlx::query(
//!             "SELECT turn FROM turns WHERE user_id = ? AND thread_id = ? ORDER BY seq",
//!         )
//!         .bind(user_id)
//!         .bind(thread_id)
//!         .fetch_all(&self.pool)
//!         .await
//!         .map_err(|e| SessionError::Storage(e.to_string()))?;
//!
//!         rows.iter()
//!             .map(|row| Ok(serde_json::from_str(row.get("turn"))?))
//!             .collect()
//!     }
//!
//!     async fn append(&self, user_id: &str, thread_id: &str, turn: Turn) -> Result<()> {
//!         let json = serde_json::to_string(&turn)?;
//!         sqlx::query("INSERT INTO turns (user_id, thread_id, turn) VALUES (?, ?, ?)")
//!             .bind(user_id)
//!             .bind(thread_id)
//!             .bind(json)
//!             .execute(&self.pool)
//!             .await
//!             .map_err(|e| SessionError::Storage(e.to_string()))?;
//!         Ok(())
//!     }
//! }
//! ```
//!
//! # Thread Safety
//!
//! Implementations must be `Send + Sync`. Within one thread id, callers
//! hold an exclusive lease for the duration of a turn, so stores only
//! need per-thread isolation, not per-thread ordering guarantees beyond
//! the append sequence.
//!
//! # See Also
//!
//! - [`InMemorySessionStore`](crate::memory::InMemorySessionStore) - Reference implementation
//! - [`ConversationSession`](crate::session::ConversationSession) - Thread-bound handle

use crate::error::Result;
use crate::turn::Turn;
use async_trait::async_trait;

/// Storage backend for append-only conversation history
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the ordered turn history for a thread
    ///
    /// Returns an empty sequence for a thread id that has never been
    /// written.
    async fn load(&self, user_id: &str, thread_id: &str) -> Result<Vec<Turn>>;

    /// Append one turn to a thread's history
    async fn append(&self, user_id: &str, thread_id: &str, turn: Turn) -> Result<()>;

    /// Append a batch of turns in order
    ///
    /// Provided method; backends with transactional writes may override
    /// it to commit the batch atomically.
    async fn append_all(&self, user_id: &str, thread_id: &str, turns: Vec<Turn>) -> Result<()> {
        for turn in turns {
            self.append(user_id, thread_id, turn).await?;
        }
        Ok(())
    }
}

/// Generate a fresh opaque thread identifier
pub fn new_thread_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_thread_ids_are_unique() {
        let a = new_thread_id();
        let b = new_thread_id();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }
}
