//! Error Types - Tool Layer Errors
//!
//! Failures from the external mail-tool layer. Inside a turn these are
//! absorbed by the invocation adapter and surfaced as visible tool-result
//! turns; the enum itself is what tool implementations return.

use thiserror::Error;

/// Result type for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors that can occur while executing an external operation
#[derive(Error, Debug)]
pub enum ToolError {
    /// Requested operation is not in the catalog
    #[error("Operation not found: {0}")]
    NotFound(String),

    /// Provider-side execution failure
    #[error("Operation failed: {0}")]
    Execution(String),

    /// Arguments did not match the operation's schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Operation did not complete within the caller-supplied timeout
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Authorization provider failure
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}
