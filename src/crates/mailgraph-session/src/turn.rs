//! Turn Types - Conversation Units for the Assistant Loop
//!
//! A [`Turn`] is one exchange unit in a conversation: user input, an
//! assistant reply (optionally requesting operations), or a tool result.
//! Turns are immutable once appended to a session; a conversation is an
//! append-only ordered sequence of them.
//!
//! # Operation Flow
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  1. User Turn                                            │
//! │     "Show me emails from today"                          │
//! └────────────────────────┬─────────────────────────────────┘
//!                          ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  2. Assistant Turn with OperationRequest                 │
//! │     content: "Let me look that up."                      │
//! │     operations: [                                        │
//! │       { id: "op_1", name: "Gmail_ListEmails",            │
//! │         args: {"query": "after:today"} }                 │
//! │     ]                                                    │
//! └────────────────────────┬─────────────────────────────────┘
//!                          ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  3. Tool-Result Turn                                     │
//! │     content: "{\"emails\": [...]}"                       │
//! │     operation_id: "op_1"                                 │
//! └────────────────────────┬─────────────────────────────────┘
//!                          ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  4. Assistant Turn (final answer, no operations)         │
//! │     "You have 3 emails from today: ..."                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use mailgraph_session::{Turn, OperationRequest};
//! use serde_json::json;
//!
//! let user = Turn::user("Draft a reply to Sam");
//!
//! let request = OperationRequest::new(
//!     "op_1",
//!     "Gmail_WriteDraftEmail",
//!     json!({"recipient": "sam@x.com", "subject": "Re: lunch"}),
//! );
//! let assistant = Turn::assistant("Creating the draft.")
//!     .with_operations(vec![request]);
//!
//! let result = Turn::tool_result("{\"status\": \"ok\"}", "op_1");
//!
//! assert!(assistant.has_operations());
//! assert_eq!(result.operation_id.as_deref(), Some("op_1"));
//! ```
//!
//! # Serialization Format
//!
//! Turns serialize to JSON with a kebab-case role tag:
//!
//! ```json
//! {"role": "user", "content": "Hello", "created_at": "..."}
//!
//! {"role": "assistant", "content": "Looking it up.",
//!  "operations": [{"id": "op_1", "name": "Gmail_ListEmails", "args": {}}]}
//!
//! {"role": "tool-result", "content": "{...}", "operation_id": "op_1"}
//! ```
//!
//! # See Also
//!
//! - [`crate::store::SessionStore`] - Persisting turns
//! - [`crate::session::ConversationSession`] - Thread-bound turn history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A named operation an assistant turn asks to execute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationRequest {
    /// Unique identifier for this request within the conversation
    pub id: String,

    /// Name of the operation to execute (opaque catalog entry)
    pub name: String,

    /// Arguments to pass to the operation
    pub args: Value,
}

impl OperationRequest {
    /// Create a new operation request
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }
}

/// Role of a turn in the conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TurnRole {
    /// End-user input
    User,
    /// Assistant output, possibly requesting operations
    Assistant,
    /// Result of an executed operation
    ToolResult,
}

/// One exchange unit in a conversation
///
/// Turns are value types: once appended to a session they are never
/// mutated or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Turn role
    pub role: TurnRole,

    /// Turn content (text, or a serialized payload for tool results)
    pub content: String,

    /// Operations requested by this turn (assistant turns only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<OperationRequest>>,

    /// Id of the operation request this turn answers (tool-result turns)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Additional metadata (auditing flags, provider extras)
    #[serde(flatten)]
    pub metadata: HashMap<String, Value>,
}

impl Turn {
    /// Create a new turn with the given role and content
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            operations: None,
            operation_id: None,
            created_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    /// Create a tool-result turn answering an operation request
    pub fn tool_result(content: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self {
            role: TurnRole::ToolResult,
            content: content.into(),
            operations: None,
            operation_id: Some(operation_id.into()),
            created_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Attach operation requests to an assistant turn
    pub fn with_operations(mut self, operations: Vec<OperationRequest>) -> Self {
        self.operations = Some(operations);
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Check if this is a user turn
    pub fn is_user(&self) -> bool {
        self.role == TurnRole::User
    }

    /// Check if this is an assistant turn
    pub fn is_assistant(&self) -> bool {
        self.role == TurnRole::Assistant
    }

    /// Check if this is a tool-result turn
    pub fn is_tool_result(&self) -> bool {
        self.role == TurnRole::ToolResult
    }

    /// Check if this turn requests any operations
    pub fn has_operations(&self) -> bool {
        self.operations.as_ref().map_or(false, |ops| !ops.is_empty())
    }

    /// Operations requested by this turn, empty when none
    pub fn requested_operations(&self) -> &[OperationRequest] {
        self.operations.as_deref().unwrap_or(&[])
    }

    /// Check for a truthy metadata flag
    pub fn metadata_flag(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_creation() {
        let turn = Turn::user("Hello");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.content, "Hello");
        assert!(turn.is_user());
        assert!(!turn.has_operations());
    }

    #[test]
    fn test_turn_roles() {
        let user = Turn::user("Hi");
        let assistant = Turn::assistant("Hello");
        let result = Turn::tool_result("{}", "op-1");

        assert!(user.is_user());
        assert!(assistant.is_assistant());
        assert!(result.is_tool_result());
        assert_eq!(result.operation_id.as_deref(), Some("op-1"));
    }

    #[test]
    fn test_turn_with_operations() {
        let request = OperationRequest::new("op_1", "Gmail_ListEmails", serde_json::json!({}));
        let turn = Turn::assistant("Looking it up").with_operations(vec![request]);

        assert!(turn.has_operations());
        assert_eq!(turn.requested_operations().len(), 1);
        assert_eq!(turn.requested_operations()[0].name, "Gmail_ListEmails");
    }

    #[test]
    fn test_turn_metadata_flag() {
        let turn = Turn::tool_result("{}", "op_1")
            .with_metadata("generated_default_body", serde_json::json!(true));

        assert!(turn.metadata_flag("generated_default_body"));
        assert!(!turn.metadata_flag("error"));
    }

    #[test]
    fn test_role_serialization_tags() {
        let result = Turn::tool_result("{}", "op_1");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["role"], "tool-result");

        let user = Turn::user("hi");
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_turn_round_trip() {
        let turn = Turn::assistant("Checking.").with_operations(vec![OperationRequest::new(
            "op_1",
            "Gmail_SearchEmails",
            serde_json::json!({"query": "subject:meeting"}),
        )]);

        let json = serde_json::to_string(&turn).unwrap();
        let back: Turn = serde_json::from_str(&json).unwrap();

        assert_eq!(back.role, TurnRole::Assistant);
        assert_eq!(back.content, turn.content);
        assert_eq!(back.requested_operations(), turn.requested_operations());
    }
}
