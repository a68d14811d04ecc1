//! Email record shapes consumed from the mail-tool layer
//!
//! The provider returns email data as loose JSON: sometimes a list under
//! an `emails` key, sometimes a single record, with any field missing.
//! [`EmailRecord`] and [`EmailPayload`] absorb that looseness once, at
//! the boundary, so the formatter downstream only sees one shape.
//! Absence of any field is valid input, never an error; a failed parse
//! yields `None` rather than propagating.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A read-only email value from the external mail-tool layer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmailRecord {
    /// Subject line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Sender display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,

    /// Sender address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,

    /// Provider-formatted date string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Short preview text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,

    /// Full body, when the provider returned it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Provider thread identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl EmailRecord {
    /// Build a record from a loose provider object
    ///
    /// Tolerates the `from` fallback field some providers use for both
    /// name and address, and strips angle brackets from addresses like
    /// `"Sam <sam@x.com>"`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let field = |key: &str| -> Option<String> {
            obj.get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .filter(|s| !s.is_empty())
        };

        let from = field("from");
        let from_name = field("from_name").or_else(|| from.clone());
        let from_email = field("from_email")
            .or(from)
            .map(|addr| clean_address(&addr));

        Some(Self {
            subject: field("subject"),
            from_name,
            from_email,
            date: field("date"),
            snippet: field("snippet"),
            body: field("body"),
            thread_id: field("thread_id"),
        })
    }

    /// Whether the object looks like an email record at all
    fn looks_like_record(value: &Value) -> bool {
        value.as_object().map_or(false, |obj| {
            ["subject", "from_name", "from_email", "snippet", "body"]
                .iter()
                .any(|key| obj.contains_key(*key))
        })
    }
}

/// Strip angle brackets from an address, keeping the address part of
/// `"Display Name <addr@host>"`.
fn clean_address(raw: &str) -> String {
    if let (Some(start), Some(end)) = (raw.find('<'), raw.rfind('>')) {
        if start < end {
            return raw[start + 1..end].trim().to_string();
        }
    }
    raw.trim().to_string()
}

/// A normalized list of email records plus the mailbox they came from
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmailPayload {
    /// Records in provider order
    pub emails: Vec<EmailRecord>,

    /// Mailbox label the provider attached, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailbox: Option<String>,
}

impl EmailPayload {
    /// Parse provider output into a normalized payload
    ///
    /// Accepts `{"emails": [...]}` (optionally with a `from` mailbox
    /// label), `{"email": {...}}`, or a single bare record object. Any
    /// other shape - including malformed JSON - returns `None`.
    pub fn parse(chunk: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(chunk.trim()).ok()?;
        Self::from_value(&value)
    }

    /// Parse an already-deserialized provider value
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        if let Some(list) = obj.get("emails").and_then(|v| v.as_array()) {
            let emails = list.iter().filter_map(EmailRecord::from_value).collect();
            return Some(Self {
                emails,
                mailbox: obj
                    .get("from")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
            });
        }

        if let Some(single) = obj.get("email") {
            let record = EmailRecord::from_value(single)?;
            return Some(Self {
                emails: vec![record],
                mailbox: None,
            });
        }

        if EmailRecord::looks_like_record(value) {
            let record = EmailRecord::from_value(value)?;
            return Some(Self {
                emails: vec![record],
                mailbox: None,
            });
        }

        None
    }

    /// Whether the payload holds no records
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}
