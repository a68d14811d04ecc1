//! # mailgraph-tools - Tool Invocation Adapter
//!
//! The seam between the assistant core and the external mail-tool layer:
//! a catalog of named operations ([`MailTool`] + [`ToolRegistry`]), an
//! authorization provider interface ([`Authorizer`]), and the invocation
//! adapter ([`ToolInvoker`]) that executes operation requests and turns
//! every outcome - success, provider error, timeout - into a visible
//! tool-result turn.
//!
//! # Overview
//!
//! - The catalog is supplied at startup and treated as opaque names plus
//!   argument schemas; the core never interprets provider semantics.
//! - Consent-gated operations go through one [`Authorizer`] check per
//!   turn; a pending grant carries the URL the user must visit.
//! - Invocation is strictly sequential per turn and bounded by a
//!   caller-supplied timeout; a timeout is an error result, not a hang.
//! - [`EmailRecord`] / [`EmailPayload`] normalize the provider's loose
//!   email JSON at the boundary.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use mailgraph_tools::{ToolInvoker, ToolRegistry};
//! use mailgraph_session::OperationRequest;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ToolRegistry::from_tools(gateway_tools));
//! let invoker = ToolInvoker::new(registry);
//!
//! let request = OperationRequest::new("op_1", "Gmail_ListEmails",
//!     serde_json::json!({"query": "after:today", "max_results": 5}));
//! let result_turn = invoker.invoke(&request).await;
//! ```

pub mod adapter;
pub mod auth;
pub mod email;
pub mod error;
pub mod tool;

pub use adapter::ToolInvoker;
pub use auth::{AlwaysAuthorized, AuthResponse, AuthStatus, Authorizer};
pub use email::{EmailPayload, EmailRecord};
pub use error::{Result, ToolError};
pub use tool::{MailTool, ToolInput, ToolMetadata, ToolOutput, ToolRegistry};
