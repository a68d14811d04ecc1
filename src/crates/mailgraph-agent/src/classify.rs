//! Content classifier for streamed chunks
//!
//! Every chunk that reaches the renderer is first classified as plain
//! conversational text, email-payload data, or an authorization notice.
//! Structural evidence (a successful payload parse) takes priority over
//! keyword evidence so that prose which merely mentions "subject" is not
//! mistaken for email data; malformed structured data degrades to the
//! keyword path instead of failing. Classification never fails a turn.
//!
//! The heuristic token lists are module-level constants so they can be
//! tested (and tuned) independently of the classification logic.

use mailgraph_tools::EmailPayload;
use regex::Regex;
use std::sync::OnceLock;

/// Marker phrase that opens every authorization notice
pub const AUTH_MARKER: &str = "Authorization required for";

/// Tokens that indicate raw email data in unstructured text
///
/// Field labels only - broad words like "email" alone match too much
/// prose to be useful.
pub const EMAIL_INDICATORS: &[&str] = &[
    "\"emails\"",
    "emails\":",
    "subject:",
    "from:",
    "date:",
    "snippet:",
    "thread_id",
    "message_id",
    "full email:",
];

/// Phrases that mark a chunk as a user query rather than email data
pub const USER_QUERY_MARKERS: &[&str] = &[
    "show me",
    "what emails",
    "get emails",
    "find emails",
    "search for emails",
    "list emails",
    "display emails",
    "retrieve emails",
    "draft a reply",
];

/// Classification of one streamed chunk
#[derive(Debug, Clone, PartialEq)]
pub enum ContentClass {
    /// Plain conversational text
    PlainText,
    /// Email data, structured or keyword-indicated
    EmailPayload(EmailContent),
    /// A consent request for a named operation
    AuthorizationNotice {
        /// Operation the notice refers to
        operation: String,
        /// Consent URL, when the notice carries one
        url: Option<String>,
    },
}

/// How the email evidence was established
#[derive(Debug, Clone, PartialEq)]
pub enum EmailContent {
    /// Parsed provider payload; the formatter renders it canonically
    Structured(EmailPayload),
    /// Field-label evidence only; rendered as cleaned-up text
    Unstructured,
}

fn auth_notice_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Authorization required for\s+([A-Za-z0-9_\-]+)")
            .expect("authorization notice pattern is valid")
    })
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").expect("url pattern is valid"))
}

fn structure_regexes() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"(?i)subject\s*:",
            r"(?i)from\s*:",
            r"(?i)date\s*:",
            r"(?i)snippet\s*:",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("structure pattern is valid"))
        .collect()
    })
}

/// Classify one streamed chunk
pub fn classify(chunk: &str) -> ContentClass {
    let trimmed = chunk.trim();
    if trimmed.is_empty() {
        return ContentClass::PlainText;
    }

    if let Some(captures) = auth_notice_regex().captures(trimmed) {
        let operation = captures[1].to_string();
        let url = url_regex()
            .find(trimmed)
            .map(|m| m.as_str().trim_end_matches(['.', ',']).to_string());
        return ContentClass::AuthorizationNotice { operation, url };
    }

    // Structural match first: a parseable payload wins outright.
    if let Some(payload) = EmailPayload::parse(trimmed) {
        return ContentClass::EmailPayload(EmailContent::Structured(payload));
    }

    let lower = trimmed.to_lowercase();

    // Chunks that read as queries or short summaries stay plain text
    // even when they mention email vocabulary.
    if USER_QUERY_MARKERS.iter().any(|m| lower.contains(m)) {
        return ContentClass::PlainText;
    }
    if lower.contains("here are") && lower.contains("emails") && trimmed.len() < 200 {
        return ContentClass::PlainText;
    }

    let keyword_hit = EMAIL_INDICATORS.iter().any(|t| lower.contains(t));
    let structure_hit = structure_regexes().iter().any(|re| re.is_match(trimmed));

    if keyword_hit || structure_hit {
        return ContentClass::EmailPayload(EmailContent::Unstructured);
    }

    ContentClass::PlainText
}
