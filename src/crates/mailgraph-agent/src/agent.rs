//! MailAgent - Turn Loop Assembly
//!
//! Wires the planner seam, the turn router, the invocation adapter, and
//! the deduplicating renderer into one conversational turn:
//!
//! ```text
//! user input
//!     ↓
//! session.load() ──→ planner.plan() ──→ assistant turn
//!                          ↑                 │
//!                          │                 ↓
//!                    tool results ←── TurnRouter.route()
//!                          │                 │
//!                          │   AuthorizationPending / BudgetExceeded /
//!                          │   Finished → loop ends
//!                          ↓
//!                   StreamRenderer (ingest each chunk in order)
//!                          ↓
//! session.append_all(new turns) ──→ TurnOutcome { rendered, ... }
//! ```
//!
//! New turns are buffered locally and flushed to the session only after
//! the loop settles, so a cancelled turn leaves the conversation either
//! fully appended or untouched - never partially.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use mailgraph_agent::{MailAgentConfig, Planner};
//! use mailgraph_tools::{AlwaysAuthorized, ToolRegistry};
//! use std::sync::Arc;
//!
//! let agent = MailAgentConfig::new(planner, registry, Arc::new(AlwaysAuthorized))
//!     .with_system_prompt("You are a helpful email assistant.")
//!     .with_max_cycles(10)
//!     .build();
//!
//! let session = ConversationSession::open(store, "user@x.com", None);
//! let outcome = agent.run_turn(&session, "show me emails from today").await?;
//! println!("{}", outcome.rendered);
//! ```

use crate::error::{PlannerError, Result};
use crate::render::StreamRenderer;
use crate::router::{RouteOutcome, RouterState, TurnRouter};
use async_trait::async_trait;
use mailgraph_session::{ConversationSession, Turn};
use mailgraph_tools::{Authorizer, ToolInvoker, ToolRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// The external reasoning layer
///
/// Given the system prompt and the ordered turn history, produce the
/// next assistant turn - plain text, or text plus operation requests.
/// The quality of that decision is out of scope here; the loop only
/// depends on the turn shape.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Produce the next assistant turn
    async fn plan(
        &self,
        system_prompt: Option<&str>,
        turns: &[Turn],
    ) -> std::result::Result<Turn, PlannerError>;
}

/// Why a turn ended
#[derive(Debug, Clone, PartialEq)]
pub enum TerminationReason {
    /// The assistant finished with a final answer
    Complete,
    /// A consent grant is pending; the user must visit the URL
    AuthorizationPending {
        /// Operation awaiting consent
        operation: String,
        /// Consent URL, when the provider supplied one
        url: Option<String>,
    },
    /// The Reasoning↔InvokingTool budget tripped
    BudgetExceeded {
        /// Cycles consumed
        cycles: usize,
    },
}

/// Result of one conversational turn
#[derive(Debug)]
pub struct TurnOutcome {
    /// Deduplicated rendered response
    pub rendered: String,
    /// Router state at the end of the turn
    pub state: RouterState,
    /// Why the turn ended
    pub termination: TerminationReason,
    /// Turns appended to the session by this call (user turn included)
    pub new_turns: Vec<Turn>,
}

/// Configuration builder for [`MailAgent`]
pub struct MailAgentConfig {
    planner: Arc<dyn Planner>,
    registry: Arc<ToolRegistry>,
    authorizer: Arc<dyn Authorizer>,
    system_prompt: Option<String>,
    max_cycles: Option<usize>,
    tool_timeout: Option<Duration>,
}

impl MailAgentConfig {
    /// Create a configuration over the three external seams
    pub fn new(
        planner: Arc<dyn Planner>,
        registry: Arc<ToolRegistry>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            planner,
            registry,
            authorizer,
            system_prompt: None,
            max_cycles: None,
            tool_timeout: None,
        }
    }

    /// Set the system prompt passed to every planner call
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the Reasoning↔InvokingTool cycle budget
    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = Some(max_cycles);
        self
    }

    /// Set the per-operation invocation timeout
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    /// Build the agent
    pub fn build(self) -> MailAgent {
        let mut invoker = ToolInvoker::new(self.registry.clone());
        if let Some(timeout) = self.tool_timeout {
            invoker = invoker.with_timeout(timeout);
        }

        MailAgent {
            planner: self.planner,
            invoker,
            authorizer: self.authorizer,
            system_prompt: self.system_prompt,
            max_cycles: self.max_cycles,
        }
    }
}

/// The assembled conversational agent
pub struct MailAgent {
    planner: Arc<dyn Planner>,
    invoker: ToolInvoker,
    authorizer: Arc<dyn Authorizer>,
    system_prompt: Option<String>,
    max_cycles: Option<usize>,
}

impl MailAgent {
    /// Run one conversational turn for the given session
    ///
    /// Only session-store failures return `Err`; everything else - tool
    /// errors, unresolved authorization, planner failures, budget
    /// exhaustion - is absorbed into visible turns and a rendered
    /// response.
    pub async fn run_turn(
        &self,
        session: &ConversationSession,
        input: &str,
    ) -> Result<TurnOutcome> {
        let history = session.load().await?;

        let mut router = TurnRouter::new(self.authorizer.clone(), self.invoker.clone());
        if let Some(max_cycles) = self.max_cycles {
            router = router.with_max_cycles(max_cycles);
        }

        let mut renderer = StreamRenderer::new().ignore_echo_of(input);
        let mut new_turns = vec![Turn::user(input)];
        let termination;

        loop {
            let mut turns = history.clone();
            turns.extend(new_turns.iter().cloned());

            let assistant = match self
                .planner
                .plan(self.system_prompt.as_deref(), &turns)
                .await
            {
                Ok(turn) => turn,
                Err(error) => {
                    // Absorbed below the turn boundary: the failure
                    // becomes a visible turn and the turn ends.
                    warn!(%error, "planner failed");
                    let turn =
                        Turn::assistant(format!("Error processing request: {}", error));
                    renderer.ingest(&turn.content);
                    new_turns.push(turn);
                    termination = TerminationReason::Complete;
                    break;
                }
            };

            if !assistant.content.trim().is_empty() {
                renderer.ingest(&assistant.content);
            }
            new_turns.push(assistant);

            let mut turns = history.clone();
            turns.extend(new_turns.iter().cloned());

            match router.route(session.user_id(), &turns).await {
                RouteOutcome::ToolResults(results) => {
                    for result in &results {
                        renderer.ingest(&result.content);
                    }
                    new_turns.extend(results);
                }
                RouteOutcome::AuthorizationPending { operation, url, notice } => {
                    renderer.ingest(&notice.content);
                    new_turns.push(notice);
                    termination = TerminationReason::AuthorizationPending { operation, url };
                    break;
                }
                RouteOutcome::BudgetExceeded { cycles, notice } => {
                    renderer.ingest(&notice.content);
                    new_turns.push(notice);
                    termination = TerminationReason::BudgetExceeded { cycles };
                    break;
                }
                RouteOutcome::Finished => {
                    termination = TerminationReason::Complete;
                    break;
                }
            }
        }

        renderer.finalize();

        debug!(
            turns = new_turns.len(),
            state = ?router.state(),
            "turn settled, persisting"
        );

        // Flush only after the loop settles: cancellation before this
        // point appends nothing.
        session.append_all(new_turns.clone()).await?;

        Ok(TurnOutcome {
            rendered: renderer.snapshot().to_string(),
            state: router.state(),
            termination,
            new_turns,
        })
    }
}
