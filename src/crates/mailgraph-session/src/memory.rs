//! In-memory session store
//!
//! [`InMemorySessionStore`] is the reference [`SessionStore`] backend:
//! a tokio `RwLock` over a map keyed by (user id, thread id). It is the
//! default for tests, examples, and single-process deployments where
//! history does not need to survive a restart.
//!
//! ```rust,ignore
//! use mailgraph_session::{InMemorySessionStore, SessionStore, Turn};
//!
//! let store = InMemorySessionStore::new();
//! store.append("user@x.com", "thread-1", Turn::user("hi")).await?;
//!
//! let turns = store.load("user@x.com", "thread-1").await?;
//! assert_eq!(turns.len(), 1);
//! ```

use crate::error::Result;
use crate::store::SessionStore;
use crate::turn::Turn;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type ThreadKey = (String, String);

/// Thread-safe in-memory session store
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    threads: Arc<RwLock<HashMap<ThreadKey, Vec<Turn>>>>,
}

impl InMemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            threads: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of threads with at least one turn
    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }

    /// Total number of turns across all threads
    pub async fn turn_count(&self) -> usize {
        self.threads.read().await.values().map(|t| t.len()).sum()
    }

    /// Drop all stored history
    pub async fn clear(&self) {
        self.threads.write().await.clear();
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, user_id: &str, thread_id: &str) -> Result<Vec<Turn>> {
        let threads = self.threads.read().await;
        Ok(threads
            .get(&(user_id.to_string(), thread_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, user_id: &str, thread_id: &str, turn: Turn) -> Result<()> {
        let mut threads = self.threads.write().await;
        threads
            .entry((user_id.to_string(), thread_id.to_string()))
            .or_default()
            .push(turn);
        Ok(())
    }
}
