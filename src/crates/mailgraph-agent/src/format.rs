//! Email formatter - canonical rendering of email payloads
//!
//! Converts a normalized [`EmailPayload`] into the single display format
//! every email list shares, whatever shape the provider returned it in.
//! Formatting is a pure function of its input: same payload, same bytes,
//! no global state consulted.
//!
//! ```text
//! Here are the emails from your inbox:
//!
//! 1. Subject: "Weekly sync" from Alice (alice@x.com)
//!    Preview: Agenda attached for tomorrow...
//!
//! 2. Subject: "No subject" from Unknown (unknown@example.com)
//!    No preview available
//! ```

use mailgraph_tools::EmailPayload;
use std::collections::HashSet;

/// Maximum body length before truncation
const MAX_BODY_CHARS: usize = 500;

/// Marker appended to truncated bodies
const TRUNCATION_MARKER: &str = "...\n[Content truncated - full email content available]";

/// Rendered when a payload holds no records
pub const NO_RESULTS_MESSAGE: &str = "No emails found matching your search criteria.";

/// Placeholder for a missing subject
const NO_SUBJECT: &str = "No subject";

/// Placeholder for a missing sender name
const UNKNOWN_SENDER: &str = "Unknown";

/// Placeholder for a missing sender address
const UNKNOWN_ADDRESS: &str = "unknown@example.com";

/// Format an email payload into the canonical numbered block
///
/// An empty payload renders the no-results message, never an empty
/// string. Records that repeat an earlier record's (subject, date,
/// snippet) identity are listed once; numbering counts emitted records
/// only.
pub fn format_emails(payload: &EmailPayload) -> String {
    if payload.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    let mailbox = payload.mailbox.as_deref().unwrap_or("your inbox");
    let mut out = format!("Here are the emails from {}:\n\n", mailbox);

    let mut seen: HashSet<String> = HashSet::new();
    let mut count = 0usize;

    for email in &payload.emails {
        let identity = format!(
            "{}|{}|{}",
            email.subject.as_deref().unwrap_or(""),
            email.date.as_deref().unwrap_or(""),
            email
                .snippet
                .as_deref()
                .unwrap_or("")
                .chars()
                .take(50)
                .collect::<String>(),
        );
        if !seen.insert(identity) {
            continue;
        }

        count += 1;

        let subject = email.subject.as_deref().unwrap_or(NO_SUBJECT);
        let from_name = email.from_name.as_deref().unwrap_or(UNKNOWN_SENDER);
        let from_email = email.from_email.as_deref().unwrap_or(UNKNOWN_ADDRESS);

        out.push_str(&format!(
            "{}. Subject: \"{}\" from {} ({})\n",
            count, subject, from_name, from_email
        ));

        match (&email.body, &email.snippet) {
            (Some(body), _) if !body.trim().is_empty() => {
                out.push_str(&format!("   Content: {}\n", truncate_body(body)));
            }
            (_, Some(snippet)) if !snippet.trim().is_empty() => {
                out.push_str(&format!("   Preview: {}\n", snippet));
            }
            _ => {
                out.push_str("   No preview available\n");
            }
        }

        out.push('\n');
    }

    out
}

/// Clean up keyword-indicated email text that never parsed structurally
///
/// Drops empty and `null` lines and re-joins paragraphs; best-effort
/// rendering in place of a canonical block.
pub fn format_email_text(content: &str) -> String {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.eq_ignore_ascii_case("null"))
        .collect();

    lines.join("\n\n")
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_CHARS {
        return body.to_string();
    }
    let truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
    format!("{}{}", truncated, TRUNCATION_MARKER)
}
