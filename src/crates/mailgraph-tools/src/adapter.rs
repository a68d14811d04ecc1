//! ToolInvoker - Invocation Adapter for Catalog Operations
//!
//! The adapter sits between the turn router and the registry. Its job is
//! to make tool execution total: whatever the provider does - succeed,
//! fail, hang - the adapter produces a visible tool-result [`Turn`] and
//! the conversation continues. Retry, if any, is a reasoning-level
//! decision made by the next planner call, never the adapter's.
//!
//! # Execution Flow
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Assistant Turn                                          │
//! │  operations: [{id: "op_1", name: "Gmail_ListEmails"}]    │
//! └────────────────────┬─────────────────────────────────────┘
//!                      ↓ ToolInvoker::invoke_all
//! ┌──────────────────────────────────────────────────────────┐
//! │  For each request, strictly in request order:            │
//! │  1. Apply compose default-body policy if applicable      │
//! │  2. registry.execute(name, args) under tokio timeout     │
//! │  3. Ok(value)  -> tool-result turn with serialized value │
//! │     Err(error) -> tool-result turn with error JSON       │
//! └────────────────────┬─────────────────────────────────────┘
//!                      ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  Tool-Result Turns (appended to the conversation)        │
//! │  {"error": "Operation timed out after 30s",              │
//! │   "status": "error"}                                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Compose default policy
//!
//! A compose-type operation invoked without a non-empty `body` argument
//! is not rejected: the adapter substitutes a generated professional
//! default and flags the result turn with
//! `"generated_default_body": true` so the surface can disclose that the
//! body was synthesized.

use crate::error::ToolError;
use crate::tool::ToolRegistry;
use mailgraph_session::{OperationRequest, Turn};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes operation requests against the registry, converting every
/// failure into a visible tool-result turn
#[derive(Clone)]
pub struct ToolInvoker {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolInvoker {
    /// Create an invoker over the given registry
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-operation timeout (default: 30s)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The registry this invoker executes against
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute one operation request, returning its result turn
    ///
    /// Never fails: provider errors, unknown operations, bad arguments,
    /// and timeouts all surface as tool-result turns carrying error JSON
    /// and an `"error": true` metadata flag.
    pub async fn invoke(&self, request: &OperationRequest) -> Turn {
        let (args, substituted) = self.apply_compose_default(request);

        debug!(operation = %request.name, "invoking operation");

        let result = match tokio::time::timeout(
            self.timeout,
            self.registry.execute(&request.name, args),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout(self.timeout)),
        };

        let mut turn = match result {
            Ok(value) => {
                let content =
                    serde_json::to_string(&value).unwrap_or_else(|_| value.to_string());
                Turn::tool_result(content, request.id.clone())
            }
            Err(error) => {
                warn!(operation = %request.name, %error, "operation failed");
                let content = json!({
                    "error": error.to_string(),
                    "status": "error",
                })
                .to_string();
                Turn::tool_result(content, request.id.clone())
                    .with_metadata("error", json!(true))
            }
        };

        if substituted {
            turn = turn.with_metadata("generated_default_body", json!(true));
        }

        turn.with_metadata("operation", json!(request.name.clone()))
    }

    /// Execute a turn's requests strictly sequentially in request order
    pub async fn invoke_all(&self, requests: &[OperationRequest]) -> Vec<Turn> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.invoke(request).await);
        }
        results
    }

    /// Substitute a generated body for compose operations missing one
    ///
    /// Returns the effective arguments and whether substitution happened.
    fn apply_compose_default(&self, request: &OperationRequest) -> (Value, bool) {
        let is_compose = self
            .registry
            .get(&request.name)
            .map_or(false, |tool| tool.is_compose());

        if !is_compose {
            return (request.args.clone(), false);
        }

        let has_body = request
            .args
            .get("body")
            .and_then(|v| v.as_str())
            .map_or(false, |s| !s.trim().is_empty());

        if has_body {
            return (request.args.clone(), false);
        }

        let mut args = request.args.clone();
        if let Some(obj) = args.as_object_mut() {
            obj.insert(
                "body".to_string(),
                json!(default_compose_body(&request.args)),
            );
        }

        debug!(operation = %request.name, "substituted generated default body");
        (args, true)
    }
}

/// Generate a professional default body for a compose operation
///
/// Deterministic for a given request: the subject, when present, is woven
/// into the opening line.
fn default_compose_body(args: &Value) -> String {
    let subject = args.get("subject").and_then(|v| v.as_str());

    match subject {
        Some(subject) if !subject.trim().is_empty() => format!(
            "Hello,\n\nI wanted to reach out regarding \"{}\". \
             Please let me know if you have any questions or if there is \
             anything you need from my side.\n\nBest regards",
            subject.trim()
        ),
        _ => "Hello,\n\nI wanted to follow up with you. Please let me know \
              if you have any questions or if there is anything you need \
              from my side.\n\nBest regards"
            .to_string(),
    }
}
