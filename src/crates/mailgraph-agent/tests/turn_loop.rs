//! End-to-end turn loop tests: scripted planner, fake tools, real
//! router, renderer, and session store.

use async_trait::async_trait;
use mailgraph_agent::{
    MailAgentConfig, Planner, PlannerError, RouterState, TerminationReason,
};
use mailgraph_session::{
    ConversationSession, InMemorySessionStore, OperationRequest, Turn,
};
use mailgraph_tools::{
    AlwaysAuthorized, AuthResponse, Authorizer, MailTool, Result as ToolResult, ToolInput,
    ToolOutput, ToolRegistry,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Planner that replays a fixed script of assistant turns.
struct ScriptedPlanner {
    calls: Arc<AtomicUsize>,
    script: Vec<Turn>,
}

impl ScriptedPlanner {
    fn new(script: Vec<Turn>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                script,
            },
            calls,
        )
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn plan(
        &self,
        _system_prompt: Option<&str>,
        _turns: &[Turn],
    ) -> Result<Turn, PlannerError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .get(index)
            .cloned()
            .ok_or_else(|| PlannerError::Provider("script exhausted".into()))
    }
}

struct ListEmailsTool;

#[async_trait]
impl MailTool for ListEmailsTool {
    fn name(&self) -> &str {
        "Gmail_ListEmails"
    }

    fn description(&self) -> &str {
        "List emails from the inbox"
    }

    async fn execute(&self, _args: ToolInput) -> ToolResult<ToolOutput> {
        Ok(json!({
            "emails": [
                {"subject": "Hi", "from_name": "Sam", "from_email": "sam@x.com", "snippet": "short"},
                {"subject": "Standup", "from_name": "Ana", "from_email": "ana@x.com", "snippet": "moved to 10am"}
            ]
        }))
    }
}

struct SlowTool;

#[async_trait]
impl MailTool for SlowTool {
    fn name(&self) -> &str {
        "List_Emails"
    }

    fn description(&self) -> &str {
        "Never answers in time"
    }

    async fn execute(&self, _args: ToolInput) -> ToolResult<ToolOutput> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(json!({}))
    }
}

struct SendEmailTool {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl MailTool for SendEmailTool {
    fn name(&self) -> &str {
        "Send_Email"
    }

    fn description(&self) -> &str {
        "Send an email"
    }

    fn requires_authorization(&self) -> bool {
        true
    }

    async fn execute(&self, _args: ToolInput) -> ToolResult<ToolOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"sent": true}))
    }
}

/// Authorizer whose grants never complete.
struct AlwaysPending;

#[async_trait]
impl Authorizer for AlwaysPending {
    async fn requires_authorization(&self, operation: &str, _user_id: &str) -> bool {
        operation == "Send_Email"
    }

    async fn authorize(&self, _operation: &str, _user_id: &str) -> ToolResult<AuthResponse> {
        Ok(AuthResponse::pending("https://auth/x"))
    }
}

fn session() -> ConversationSession {
    ConversationSession::open(Arc::new(InMemorySessionStore::new()), "user@x.com", None)
}

#[tokio::test]
async fn test_list_emails_flow_renders_formatted_block() {
    let (planner, calls) = ScriptedPlanner::new(vec![
        Turn::assistant("Fetching your emails.").with_operations(vec![OperationRequest::new(
            "op_1",
            "Gmail_ListEmails",
            json!({"query": "after:today", "max_results": 5}),
        )]),
        Turn::assistant("Those are the two most recent messages."),
    ]);

    let agent = MailAgentConfig::new(
        Arc::new(planner),
        Arc::new(ToolRegistry::from_tools(vec![Box::new(ListEmailsTool)])),
        Arc::new(AlwaysAuthorized),
    )
    .with_system_prompt("You are a helpful email assistant.")
    .build();

    let session = session();
    let outcome = agent
        .run_turn(&session, "show me emails from today")
        .await
        .unwrap();

    // planner ran twice: request + final answer
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(outcome.termination, TerminationReason::Complete);
    assert_eq!(outcome.state, RouterState::Terminated);

    // tool output was normalized through the formatter, not echoed raw
    assert!(outcome
        .rendered
        .contains("1. Subject: \"Hi\" from Sam (sam@x.com)"));
    assert!(outcome.rendered.contains("Preview: short"));
    assert!(outcome.rendered.contains("2. Subject: \"Standup\""));
    assert!(!outcome.rendered.contains("{\"emails\""));

    // user, assistant(request), tool-result, assistant(final)
    let stored = session.load().await.unwrap();
    assert_eq!(stored.len(), 4);
    assert!(stored[0].is_user());
    assert!(stored[1].has_operations());
    assert!(stored[2].is_tool_result());
    assert!(stored[3].is_assistant());
}

#[tokio::test]
async fn test_pending_authorization_surfaces_url_and_terminates() {
    let tool_calls = Arc::new(AtomicUsize::new(0));
    let (planner, _) = ScriptedPlanner::new(vec![Turn::assistant("Sending now.")
        .with_operations(vec![OperationRequest::new(
            "op_1",
            "Send_Email",
            json!({"recipient": "sam@x.com", "subject": "Hello"}),
        )])]);

    let agent = MailAgentConfig::new(
        Arc::new(planner),
        Arc::new(ToolRegistry::from_tools(vec![Box::new(SendEmailTool {
            calls: tool_calls.clone(),
        })])),
        Arc::new(AlwaysPending),
    )
    .build();

    let session = session();
    let outcome = agent
        .run_turn(&session, "send sam an email")
        .await
        .unwrap();

    assert_eq!(outcome.state, RouterState::Terminated);
    assert_eq!(
        outcome.termination,
        TerminationReason::AuthorizationPending {
            operation: "Send_Email".to_string(),
            url: Some("https://auth/x".to_string()),
        }
    );
    // the literal URL reaches both the rendered output and the session
    assert!(outcome.rendered.contains("https://auth/x"));
    let stored = session.load().await.unwrap();
    assert!(stored.iter().any(|t| t.content.contains("https://auth/x")));
    assert_eq!(tool_calls.load(Ordering::SeqCst), 0, "tool never invoked");
}

#[tokio::test]
async fn test_timeout_surfaces_tool_error_and_session_survives() {
    let (planner, calls) = ScriptedPlanner::new(vec![
        Turn::assistant("Checking.").with_operations(vec![OperationRequest::new(
            "op_1",
            "List_Emails",
            json!({}),
        )]),
        Turn::assistant("The mail service did not answer in time; try again shortly."),
    ]);

    let agent = MailAgentConfig::new(
        Arc::new(planner),
        Arc::new(ToolRegistry::from_tools(vec![Box::new(SlowTool)])),
        Arc::new(AlwaysAuthorized),
    )
    .with_tool_timeout(Duration::from_millis(20))
    .build();

    let session = session();
    let outcome = agent.run_turn(&session, "list my emails").await.unwrap();

    // the error was visible to the next reasoning step, which explained it
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(outcome.termination, TerminationReason::Complete);

    let stored = session.load().await.unwrap();
    let error_turn = stored
        .iter()
        .find(|t| t.is_tool_result())
        .expect("tool-result turn persisted");
    assert!(error_turn.metadata_flag("error"));
    assert!(error_turn.content.contains("timed out"));

    // the session stays usable for the next turn
    let (planner, _) = ScriptedPlanner::new(vec![Turn::assistant("Still here.")]);
    let agent = MailAgentConfig::new(
        Arc::new(planner),
        Arc::new(ToolRegistry::new()),
        Arc::new(AlwaysAuthorized),
    )
    .build();
    let next = agent.run_turn(&session, "are you there?").await.unwrap();
    assert!(next.rendered.contains("Still here."));
}

#[tokio::test]
async fn test_budget_exceeded_is_reported_not_silent() {
    // A planner that requests the same operation forever.
    struct LoopingPlanner;

    #[async_trait]
    impl Planner for LoopingPlanner {
        async fn plan(
            &self,
            _system_prompt: Option<&str>,
            _turns: &[Turn],
        ) -> Result<Turn, PlannerError> {
            Ok(
                Turn::assistant("one more pass").with_operations(vec![OperationRequest::new(
                    "op",
                    "Gmail_ListEmails",
                    json!({}),
                )]),
            )
        }
    }

    let agent = MailAgentConfig::new(
        Arc::new(LoopingPlanner),
        Arc::new(ToolRegistry::from_tools(vec![Box::new(ListEmailsTool)])),
        Arc::new(AlwaysAuthorized),
    )
    .with_max_cycles(3)
    .build();

    let session = session();
    let outcome = agent.run_turn(&session, "loop forever").await.unwrap();

    assert_eq!(
        outcome.termination,
        TerminationReason::BudgetExceeded { cycles: 3 }
    );
    assert!(outcome.rendered.contains("tool cycles"));

    let stored = session.load().await.unwrap();
    assert!(stored.iter().any(|t| t.metadata_flag("budget_exceeded")));
}

#[tokio::test]
async fn test_repeated_assistant_content_renders_once() {
    let (planner, _) = ScriptedPlanner::new(vec![
        Turn::assistant("Working on it.").with_operations(vec![OperationRequest::new(
            "op_1",
            "Gmail_ListEmails",
            json!({}),
        )]),
        // The model repeats itself verbatim before finishing.
        Turn::assistant("Working on it."),
    ]);

    let agent = MailAgentConfig::new(
        Arc::new(planner),
        Arc::new(ToolRegistry::from_tools(vec![Box::new(ListEmailsTool)])),
        Arc::new(AlwaysAuthorized),
    )
    .build();

    let outcome = agent
        .run_turn(&session(), "check my inbox")
        .await
        .unwrap();

    assert_eq!(outcome.rendered.matches("Working on it.").count(), 1);
}
