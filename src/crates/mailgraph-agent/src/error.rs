//! Error Types - Agent Core Errors
//!
//! Almost every failure in the turn loop is absorbed below the turn
//! boundary and converted into a visible, human-readable turn: tool
//! errors, unresolved authorization, exceeded transition budgets, and
//! malformed payloads all surface to the user instead of failing the
//! call. The only hard failure is the session store - without
//! persistence there is no safe degraded behavior.

use thiserror::Error;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that escape the turn boundary
#[derive(Error, Debug)]
pub enum AgentError {
    /// Checkpoint store failure (hard - the session layer cannot degrade)
    #[error("Session error: {0}")]
    Session(#[from] mailgraph_session::SessionError),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

/// Errors from the external reasoning layer
///
/// Planner failures are absorbed into a visible turn by the agent loop;
/// this type is what [`Planner`](crate::agent::Planner) implementations
/// return.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Provider/transport failure
    #[error("Planner provider error: {0}")]
    Provider(String),

    /// Response could not be interpreted as an assistant turn
    #[error("Invalid planner response: {0}")]
    InvalidResponse(String),
}
