//! Interactive read-eval-print loop.
//!
//! Free-text input goes through the agent's turn loop; a small fixed set
//! of meta-commands (`help`, `quit`, `clear`) bypasses the router
//! entirely.

use colored::Colorize;
use mailgraph_agent::{MailAgent, TerminationReason};
use mailgraph_session::ConversationSession;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::error;

const HELP_TEXT: &str = r#"
mailgraph - natural-language mail assistant

Email search:
  "Show me emails from today"
  "Find emails from john@example.com"
  "Search for emails about meetings"

Draft management:
  "Create a new email to test@example.com with subject 'Test' and body 'Hello'"
  "Draft a reply to the latest email"
  "Show me my drafts"

Email operations:
  "Send the draft with subject 'Test'"
  "Update draft with subject 'Test' with new body 'Updated content'"

Meta-commands:
  help           show this message
  clear          clear the screen
  quit / exit    leave the assistant
"#;

/// Run the REPL until the user quits.
pub async fn run(agent: MailAgent, session: ConversationSession) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = tokio::io::stdout();

    println!("{}", "mailgraph mail assistant".bold());
    println!("thread {}", session.thread_id().dimmed());
    println!("Type 'help' for available commands or 'quit' to exit.\n");

    loop {
        stdout.write_all("mail> ".as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" => {
                println!("{}", HELP_TEXT);
                continue;
            }
            "clear" => {
                // ANSI clear screen + cursor home
                print!("\x1B[2J\x1B[1;1H");
                continue;
            }
            _ => {}
        }

        match agent.run_turn(&session, input).await {
            Ok(outcome) => {
                if outcome.rendered.is_empty() {
                    println!("{}", "No response received.".yellow());
                } else {
                    println!("\n{}\n", outcome.rendered);
                }

                match outcome.termination {
                    TerminationReason::AuthorizationPending { operation, .. } => {
                        println!(
                            "{}",
                            format!(
                                "Complete the authorization for {} in your browser, \
                                 then send your request again.",
                                operation
                            )
                            .yellow()
                        );
                    }
                    TerminationReason::BudgetExceeded { cycles } => {
                        println!(
                            "{}",
                            format!("Stopped after {} tool cycles.", cycles).yellow()
                        );
                    }
                    TerminationReason::Complete => {}
                }
            }
            Err(err) => {
                error!(%err, "turn failed");
                println!("{}", format!("Error: {}", err).red());
            }
        }
    }

    Ok(())
}
