//! # mailgraph-session - Conversation Persistence
//!
//! Turn types and checkpoint-store abstractions for the mailgraph
//! assistant core. A conversation is an append-only ordered sequence of
//! [`Turn`]s keyed by an opaque (user identity, thread identity) pair;
//! this crate owns that data model and the storage seam behind it.
//!
//! # Overview
//!
//! - **[`Turn`]** - one exchange unit (user input, assistant output with
//!   optional [`OperationRequest`]s, or a tool result), immutable once
//!   appended.
//! - **[`SessionStore`]** - the injected persistence interface. `load`
//!   of an unknown thread returns an empty history; `append` is the only
//!   mutation.
//! - **[`InMemorySessionStore`]** - reference backend for tests and
//!   single-process use.
//! - **[`ConversationSession`]** - binds a user and thread to a store
//!   for the duration of a conversation.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use mailgraph_session::{ConversationSession, InMemorySessionStore, Turn};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemorySessionStore::new());
//! let session = ConversationSession::open(store, "user@x.com", None);
//!
//! session.append(Turn::user("What emails do I have?")).await?;
//! let history = session.load().await?;
//! ```
//!
//! # Serialization point
//!
//! One (user, thread) pair runs one sequential turn loop at a time; the
//! append-only history is the serialization point. Distinct threads are
//! fully independent and may proceed in parallel against the same store.

pub mod error;
pub mod memory;
pub mod session;
pub mod store;
pub mod turn;

pub use error::{Result, SessionError};
pub use memory::InMemorySessionStore;
pub use session::ConversationSession;
pub use store::{new_thread_id, SessionStore};
pub use turn::{OperationRequest, Turn, TurnRole};
