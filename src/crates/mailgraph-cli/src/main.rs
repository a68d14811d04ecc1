//! mailgraph CLI - natural-language mail assistant
//!
//! Main entry point for the mailgraph command-line tool.

mod config;
mod gateway;
mod planner;
mod repl;

use clap::Parser;
use config::{GatewayConfig, PlannerConfig};
use gateway::HttpToolGateway;
use mailgraph_agent::MailAgentConfig;
use mailgraph_session::{ConversationSession, InMemorySessionStore};
use mailgraph_tools::ToolRegistry;
use planner::OpenAiPlanner;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a helpful mail assistant with access to the user's \
email tools. When the user asks about their email, use the tools to retrieve actual data \
instead of guessing; never just repeat the user's query back. When creating a draft, always \
provide meaningful body content, and use the subject to write a professional default when \
the user gave none. After using tools, summarize what you found or accomplished; if nothing \
matched, say so and suggest a different search.";

#[derive(Parser)]
#[command(name = "mailgraph")]
#[command(about = "mailgraph - natural-language mail assistant", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// API key for the chat-completions planner endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,

    /// Base URL of the planner endpoint
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    openai_base_url: String,

    /// Planner model identifier
    #[arg(long, env = "MODEL_CHOICE", default_value = "gpt-4o-mini")]
    model: String,

    /// API key for the mail-tool gateway
    #[arg(long, env = "GATEWAY_API_KEY", hide_env_values = true)]
    gateway_api_key: String,

    /// Base URL of the mail-tool gateway
    #[arg(long, env = "GATEWAY_BASE_URL", default_value = "https://api.arcade.dev/v1")]
    gateway_base_url: String,

    /// Email address identifying the user to the gateway
    #[arg(long, env = "EMAIL")]
    user_email: String,

    /// Resume an existing conversation thread
    #[arg(long)]
    thread: Option<String>,

    /// Toolkit to load from the gateway catalog
    #[arg(long, default_value = "Gmail")]
    toolkit: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let planner_config = PlannerConfig::new(
        cli.openai_api_key,
        cli.openai_base_url,
        cli.model,
    );
    let gateway_config = GatewayConfig::new(
        cli.gateway_api_key,
        cli.gateway_base_url,
        cli.user_email.clone(),
    );

    let mut gateway = HttpToolGateway::new(gateway_config);
    let catalog = gateway
        .fetch_catalog(&cli.toolkit)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load tool catalog: {}", e))?;

    let registry = Arc::new(ToolRegistry::from_tools(gateway.into_tools(catalog)));
    let planner = OpenAiPlanner::new(planner_config, registry.metadata());

    let agent = MailAgentConfig::new(
        Arc::new(planner),
        registry,
        Arc::new(gateway),
    )
    .with_system_prompt(SYSTEM_PROMPT)
    .build();

    let store = Arc::new(InMemorySessionStore::new());
    let session = ConversationSession::open(store, cli.user_email, cli.thread);

    repl::run(agent, session).await
}
