//! Thread-bound conversation handle
//!
//! [`ConversationSession`] binds a user identity and a thread identity to
//! a [`SessionStore`], giving the turn loop a single object to load from
//! and append to. Identifiers are opaque strings; the session compares
//! them only for equality and never inspects their structure.

use crate::error::Result;
use crate::store::{new_thread_id, SessionStore};
use crate::turn::Turn;
use std::sync::Arc;

/// A (user identity, thread identity) pair bound to a checkpoint store
#[derive(Clone)]
pub struct ConversationSession {
    user_id: String,
    thread_id: String,
    store: Arc<dyn SessionStore>,
}

impl ConversationSession {
    /// Open a session for the given user and thread
    ///
    /// When `thread_id` is `None` a fresh id is generated - the first
    /// user message of a new conversation.
    pub fn open(
        store: Arc<dyn SessionStore>,
        user_id: impl Into<String>,
        thread_id: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            thread_id: thread_id.unwrap_or_else(new_thread_id),
            store,
        }
    }

    /// The user identity this session is bound to
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The thread identity this session is bound to
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// Load the full ordered turn history
    pub async fn load(&self) -> Result<Vec<Turn>> {
        self.store.load(&self.user_id, &self.thread_id).await
    }

    /// Append one turn
    pub async fn append(&self, turn: Turn) -> Result<()> {
        self.store.append(&self.user_id, &self.thread_id, turn).await
    }

    /// Append a batch of turns in order
    pub async fn append_all(&self, turns: Vec<Turn>) -> Result<()> {
        self.store
            .append_all(&self.user_id, &self.thread_id, turns)
            .await
    }
}

impl std::fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSession")
            .field("user_id", &self.user_id)
            .field("thread_id", &self.thread_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySessionStore;

    #[tokio::test]
    async fn test_open_generates_thread_id_when_missing() {
        let store = Arc::new(InMemorySessionStore::new());
        let a = ConversationSession::open(store.clone(), "u", None);
        let b = ConversationSession::open(store, "u", None);

        assert!(!a.thread_id().is_empty());
        assert_ne!(a.thread_id(), b.thread_id());
    }

    #[tokio::test]
    async fn test_reopen_with_same_thread_id_recovers_history() {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

        let session = ConversationSession::open(store.clone(), "u", Some("t-1".into()));
        session.append(Turn::user("hello")).await.unwrap();
        session.append(Turn::assistant("hi there")).await.unwrap();

        let reopened = ConversationSession::open(store, "u", Some("t-1".into()));
        let turns = reopened.load().await.unwrap();

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "hello");
        assert_eq!(turns[1].content, "hi there");
    }
}
