//! Turn Router - The Per-Turn State Machine
//!
//! The router decides, turn by turn, whether the assistant should invoke
//! tools, request authorization, or finish. It is a small explicit state
//! machine over four states:
//!
//! ```text
//!                ┌──────────────┐
//!      START ──→ │  Reasoning   │ ←───────────────┐
//!                └──────┬───────┘                 │
//!        no operations  │  operations requested   │ results appended
//!            ┌──────────┼──────────┐              │
//!            ↓          ↓          ↓              │
//!   ┌────────────┐  ┌─────────────────────┐  ┌────┴──────────┐
//!   │ Terminated │  │ AwaitingAuthorization│→ │ InvokingTool  │
//!   └────────────┘  └──────────┬──────────┘   └───────────────┘
//!            ↑                 │ still pending after one check
//!            └─────────────────┘
//! ```
//!
//! Transition rules:
//!
//! - `Reasoning → InvokingTool`: the latest assistant turn requests
//!   operations and none needs unresolved authorization.
//! - `Reasoning → AwaitingAuthorization`: at least one requested
//!   operation needs a grant this conversation has not seen. When a turn
//!   mixes consent-gated and already-authorized operations, the gated
//!   ones are resolved first, in request order; nothing executes until
//!   every check for the turn has resolved.
//! - `AwaitingAuthorization → InvokingTool`: every check came back
//!   granted.
//! - `AwaitingAuthorization → Terminated`: a grant is still pending
//!   after one check. The router emits a notice turn carrying the
//!   consent URL verbatim and ends the turn - the user re-invokes after
//!   authorizing; there is no polling loop.
//! - `InvokingTool → Reasoning`: all of the turn's operations completed
//!   (success or tool-level error) and their results were appended.
//! - A cycle budget bounds Reasoning↔InvokingTool loops; exceeding it
//!   forces `Terminated` with a reported notice, never silent
//!   truncation.

use crate::classify::AUTH_MARKER;
use mailgraph_session::{OperationRequest, Turn};
use mailgraph_tools::{Authorizer, ToolInvoker};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default maximum Reasoning↔InvokingTool cycles per turn
const DEFAULT_MAX_CYCLES: usize = 10;

/// Router state, per turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterState {
    /// Deciding the next transition from the latest assistant turn
    Reasoning,
    /// Resolving consent for gated operations
    AwaitingAuthorization,
    /// Executing the turn's operations
    InvokingTool,
    /// The turn is over
    Terminated,
}

/// Outcome of one routing step
#[derive(Debug)]
pub enum RouteOutcome {
    /// Operations executed; results to append, control back to Reasoning
    ToolResults(Vec<Turn>),
    /// A grant is pending; the notice turn carries the consent URL
    AuthorizationPending {
        /// Operation that could not proceed
        operation: String,
        /// Consent URL, verbatim from the provider
        url: Option<String>,
        /// Visible notice turn to append and render
        notice: Turn,
    },
    /// Cycle budget exhausted; the notice turn reports the condition
    BudgetExceeded {
        /// Cycles consumed when the budget tripped
        cycles: usize,
        /// Visible notice turn to append and render
        notice: Turn,
    },
    /// The latest assistant turn requested nothing; the turn is done
    Finished,
}

/// Per-conversation router over the four-state machine
pub struct TurnRouter {
    authorizer: Arc<dyn Authorizer>,
    invoker: ToolInvoker,
    max_cycles: usize,
    cycles: usize,
    granted: HashSet<String>,
    state: RouterState,
}

impl TurnRouter {
    /// Create a router over the given authorizer and invoker
    pub fn new(authorizer: Arc<dyn Authorizer>, invoker: ToolInvoker) -> Self {
        Self {
            authorizer,
            invoker,
            max_cycles: DEFAULT_MAX_CYCLES,
            cycles: 0,
            granted: HashSet::new(),
            state: RouterState::Reasoning,
        }
    }

    /// Set the Reasoning↔InvokingTool cycle budget (default: 10)
    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Current state
    pub fn state(&self) -> RouterState {
        self.state
    }

    /// Cycles consumed so far this conversation turn
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Reset to `Reasoning` with a fresh cycle budget for a new user turn
    ///
    /// Completed grants survive the reset; they belong to the
    /// conversation, not the turn.
    pub fn reset_for_turn(&mut self) {
        self.state = RouterState::Reasoning;
        self.cycles = 0;
    }

    /// Run one routing step from the latest assistant turn
    ///
    /// The pending action - the set of requested operations - is derived
    /// from `turns` on every call and discarded once resolved; it never
    /// outlives the step that produced it.
    pub async fn route(&mut self, user_id: &str, turns: &[Turn]) -> RouteOutcome {
        let requested = latest_requested_operations(turns);

        if requested.is_empty() {
            debug!(state = ?self.state, "no operations requested, terminating turn");
            self.state = RouterState::Terminated;
            return RouteOutcome::Finished;
        }

        // Consent-gated operations resolve first, in request order.
        let mut gated = Vec::new();
        for request in &requested {
            if !self.granted.contains(&request.name)
                && self
                    .authorizer
                    .requires_authorization(&request.name, user_id)
                    .await
            {
                gated.push(request.clone());
            }
        }

        if !gated.is_empty() {
            self.state = RouterState::AwaitingAuthorization;
            if let Some(outcome) = self.resolve_authorization(user_id, &gated).await {
                return outcome;
            }
        }

        self.invoke(&requested).await
    }

    /// Check each gated operation exactly once
    ///
    /// Returns `Some` terminal outcome while a grant stays pending,
    /// `None` once every check resolved as granted.
    async fn resolve_authorization(
        &mut self,
        user_id: &str,
        gated: &[OperationRequest],
    ) -> Option<RouteOutcome> {
        for request in gated {
            let response = match self.authorizer.authorize(&request.name, user_id).await {
                Ok(response) => response,
                Err(error) => {
                    warn!(operation = %request.name, %error, "authorization check failed");
                    self.state = RouterState::Terminated;
                    let notice = Turn::assistant(format!(
                        "{} {}. The authorization check failed: {}. Please try again.",
                        AUTH_MARKER, request.name, error
                    ));
                    return Some(RouteOutcome::AuthorizationPending {
                        operation: request.name.clone(),
                        url: None,
                        notice,
                    });
                }
            };

            if response.is_granted() {
                debug!(operation = %request.name, "authorization granted");
                self.granted.insert(request.name.clone());
                continue;
            }

            // One check, no polling: surface the URL and end the turn.
            self.state = RouterState::Terminated;
            let notice = match &response.url {
                Some(url) => Turn::assistant(format!(
                    "{} {}. Visit the following URL to authorize: {} \
                     Then send your request again.",
                    AUTH_MARKER, request.name, url
                )),
                None => Turn::assistant(format!(
                    "{} {}. No authorization URL was provided; please check \
                     your account configuration and try again.",
                    AUTH_MARKER, request.name
                )),
            };
            return Some(RouteOutcome::AuthorizationPending {
                operation: request.name.clone(),
                url: response.url.clone(),
                notice,
            });
        }

        self.state = RouterState::InvokingTool;
        None
    }

    async fn invoke(&mut self, requested: &[OperationRequest]) -> RouteOutcome {
        if self.cycles >= self.max_cycles {
            warn!(cycles = self.cycles, "transition budget exceeded");
            self.state = RouterState::Terminated;
            let notice = Turn::assistant(format!(
                "Stopping here: this request needed more than {} tool cycles. \
                 Try narrowing the request and asking again.",
                self.max_cycles
            ))
            .with_metadata("budget_exceeded", serde_json::json!(true));
            return RouteOutcome::BudgetExceeded {
                cycles: self.cycles,
                notice,
            };
        }

        self.cycles += 1;
        self.state = RouterState::InvokingTool;
        debug!(cycle = self.cycles, operations = requested.len(), "invoking operations");

        let results = self.invoker.invoke_all(requested).await;

        self.state = RouterState::Reasoning;
        RouteOutcome::ToolResults(results)
    }
}

/// Operations requested by the latest assistant turn, if any
fn latest_requested_operations(turns: &[Turn]) -> Vec<OperationRequest> {
    turns
        .iter()
        .rev()
        .find(|turn| turn.is_assistant())
        .map(|turn| turn.requested_operations().to_vec())
        .unwrap_or_default()
}
