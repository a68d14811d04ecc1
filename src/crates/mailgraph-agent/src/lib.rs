//! # mailgraph-agent - Request Routing and Response Streaming Core
//!
//! The turn-handling core of a conversational mail assistant: a small
//! state machine that decides, turn by turn, whether to invoke tools,
//! request authorization, or finish; a renderer that deduplicates and
//! incrementally assembles streamed partial output; and a formatter
//! that normalizes heterogeneous tool results into one display format.
//!
//! # Components
//!
//! - **[`classify`]** - tags each streamed chunk as plain text, email
//!   payload, or authorization notice. Structural evidence beats
//!   keywords; malformed data degrades instead of failing.
//! - **[`format`]** - renders email payloads as a canonical numbered
//!   block with stable placeholders for missing fields.
//! - **[`render`]** - [`StreamRenderer`], the per-response dedup buffer.
//!   All dedup state lives in the renderer instance; nothing is shared
//!   process-wide.
//! - **[`router`]** - [`TurnRouter`], the
//!   Reasoning / AwaitingAuthorization / InvokingTool / Terminated state
//!   machine with an explicit cycle budget.
//! - **[`agent`]** - [`MailAgent`], which wires planner, router,
//!   renderer, and session into one conversational turn.
//!
//! # Data Flow
//!
//! ```text
//! user input → session history → Planner → assistant turn
//!      → TurnRouter (authorize? invoke? finish?)
//!      → ToolInvoker results → classify → format → StreamRenderer
//!      → loop until Terminated → session.append_all → rendered response
//! ```
//!
//! External collaborators - the language model, the authorization
//! provider, the mail provider's API, and the storage engine - sit
//! behind the [`Planner`], [`Authorizer`](mailgraph_tools::Authorizer),
//! [`MailTool`](mailgraph_tools::MailTool), and
//! [`SessionStore`](mailgraph_session::SessionStore) traits.

pub mod agent;
pub mod classify;
pub mod error;
pub mod format;
pub mod render;
pub mod router;

pub use agent::{MailAgent, MailAgentConfig, Planner, TerminationReason, TurnOutcome};
pub use classify::{classify, ContentClass, EmailContent};
pub use error::{AgentError, PlannerError, Result};
pub use format::{format_email_text, format_emails, NO_RESULTS_MESSAGE};
pub use render::StreamRenderer;
pub use router::{RouteOutcome, RouterState, TurnRouter};

// Convenience re-exports so downstream crates can depend on this crate
// alone for the common types.
pub use mailgraph_session::{
    ConversationSession, InMemorySessionStore, OperationRequest, SessionStore, Turn, TurnRole,
};
pub use mailgraph_tools::{
    AuthResponse, AuthStatus, Authorizer, EmailPayload, EmailRecord, MailTool, ToolInvoker,
    ToolMetadata, ToolRegistry,
};
