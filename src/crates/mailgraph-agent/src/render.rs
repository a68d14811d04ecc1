//! Deduplicating Renderer - Incremental Response Assembly
//!
//! Streamed responses repeat themselves: the same assistant content can
//! arrive once per state transition, and tool results echo through
//! multiple chunks. [`StreamRenderer`] accumulates classified chunks
//! into one growing display buffer while guaranteeing that no content
//! fingerprint renders twice within a single streamed response.
//!
//! # Ownership
//!
//! All dedup state is owned by one renderer instance per in-flight
//! response - nothing is shared process-wide, so concurrent users can
//! never leak rendered content into each other's responses. The
//! fingerprint set dies with the renderer at [`finalize`].
//!
//! # Ingestion Flow
//!
//! ```text
//! chunk ──→ classify ──┬─ PlainText ─────────────────────┐
//!                      ├─ EmailPayload ──→ format_emails ─┤
//!                      └─ AuthorizationNotice ────────────┤
//!                                                         ↓
//!                                       fingerprint (SHA-256)
//!                                                         ↓
//!                                 seen before? ──yes──→ drop silently
//!                                       │no
//!                                       ↓
//!                                 append to buffer
//! ```
//!
//! Authorization notices dedup by operation name rather than content, so
//! repeated notices for one operation collapse while notices for
//! different operations all render.
//!
//! # Concurrency contract
//!
//! A renderer is single-writer per in-flight response; `ingest` takes
//! `&mut self`, so the type system enforces serialized ingestion. Chunks
//! must be ingested in arrival order - [`ingest_stream`] drives that
//! from any ordered chunk stream.
//!
//! [`finalize`]: StreamRenderer::finalize
//! [`ingest_stream`]: StreamRenderer::ingest_stream

use crate::classify::{classify, ContentClass, EmailContent};
use crate::format::{format_email_text, format_emails};
use futures::{Stream, StreamExt};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::debug;

type Fingerprint = [u8; 32];

/// Accumulates one streamed response, suppressing duplicate blocks
#[derive(Debug, Default)]
pub struct StreamRenderer {
    buffer: String,
    seen: HashSet<Fingerprint>,
    ignore_echo: Option<String>,
    finalized: bool,
}

impl StreamRenderer {
    /// Create a renderer for one in-flight response
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress chunks that merely repeat the user's query verbatim
    pub fn ignore_echo_of(mut self, user_input: impl Into<String>) -> Self {
        self.ignore_echo = Some(user_input.into());
        self
    }

    /// Ingest one chunk in arrival order
    ///
    /// Duplicate blocks are dropped silently; ingest after finalize is a
    /// no-op.
    pub fn ingest(&mut self, chunk: &str) {
        if self.finalized {
            debug!("chunk ingested after finalize, dropping");
            return;
        }

        let trimmed = chunk.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
            return;
        }

        if let Some(echo) = &self.ignore_echo {
            if trimmed.eq_ignore_ascii_case(echo.trim()) {
                debug!("dropping echo of user input");
                return;
            }
        }

        match classify(trimmed) {
            ContentClass::PlainText => {
                self.push_block(trimmed.to_string(), None);
            }
            ContentClass::EmailPayload(EmailContent::Structured(payload)) => {
                let formatted = format_emails(&payload);
                self.push_block(formatted, None);
            }
            ContentClass::EmailPayload(EmailContent::Unstructured) => {
                let formatted = format_email_text(trimmed);
                self.push_block(formatted, None);
            }
            ContentClass::AuthorizationNotice { operation, .. } => {
                // Notices dedup on the operation they refer to, not on
                // their exact wording.
                let key = fingerprint(&format!("authorization:{}", operation));
                self.push_block(trimmed.to_string(), Some(key));
            }
        }
    }

    /// Drive ingestion from an ordered stream of chunks
    pub async fn ingest_stream<S>(&mut self, stream: S)
    where
        S: Stream<Item = String>,
    {
        futures::pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            self.ingest(&chunk);
        }
    }

    /// The accumulated response so far
    pub fn snapshot(&self) -> &str {
        &self.buffer
    }

    /// Seal the renderer; calling twice has no additional effect
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        let trimmed_len = self.buffer.trim_end().len();
        self.buffer.truncate(trimmed_len);
    }

    /// Whether the renderer has been finalized
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn push_block(&mut self, block: String, key: Option<Fingerprint>) {
        let normalized = block.trim();
        if normalized.is_empty() {
            return;
        }

        let key = key.unwrap_or_else(|| fingerprint(normalized));
        if !self.seen.insert(key) {
            debug!("dropping duplicate block");
            return;
        }

        if !self.buffer.is_empty() {
            if !self.buffer.ends_with('\n') {
                self.buffer.push('\n');
            }
            self.buffer.push('\n');
        }
        self.buffer.push_str(normalized);
        self.buffer.push('\n');
    }
}

fn fingerprint(content: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_chunks_render_once() {
        let mut renderer = StreamRenderer::new();
        renderer.ingest("Meeting at 3pm");
        renderer.ingest("Meeting at 3pm");
        renderer.finalize();

        assert_eq!(renderer.snapshot().matches("Meeting at 3pm").count(), 1);
    }

    #[test]
    fn test_distinct_chunks_all_render_in_order() {
        let mut renderer = StreamRenderer::new();
        renderer.ingest("first block");
        renderer.ingest("second block");

        let snapshot = renderer.snapshot();
        let first = snapshot.find("first block").unwrap();
        let second = snapshot.find("second block").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_email_payload_is_formatted_before_dedup() {
        let mut renderer = StreamRenderer::new();
        let payload = r#"{"emails":[{"subject":"Hi","from_name":"Sam","from_email":"sam@x.com","snippet":"short"}]}"#;

        renderer.ingest(payload);
        renderer.ingest(payload);

        let snapshot = renderer.snapshot();
        assert!(snapshot.contains("1. Subject: \"Hi\" from Sam (sam@x.com)"));
        assert_eq!(snapshot.matches("Subject: \"Hi\"").count(), 1);
        // Raw JSON never reaches the buffer
        assert!(!snapshot.contains("{\"emails\""));
    }

    #[test]
    fn test_auth_notice_dedups_by_operation() {
        let mut renderer = StreamRenderer::new();
        renderer.ingest("Authorization required for Gmail_SendEmail. Visit: https://auth/x");
        renderer.ingest("Authorization required for Gmail_SendEmail. Visit: https://auth/x");
        renderer.ingest("Authorization required for Gmail_ListEmails. Visit: https://auth/y");

        let snapshot = renderer.snapshot();
        assert_eq!(snapshot.matches("Gmail_SendEmail").count(), 1);
        assert_eq!(snapshot.matches("Gmail_ListEmails").count(), 1);
    }

    #[test]
    fn test_auth_notice_renders_after_plain_text() {
        let mut renderer = StreamRenderer::new();
        renderer.ingest("I need permission first.");
        renderer.ingest("Authorization required for Send_Email. Visit: https://auth/x");

        let snapshot = renderer.snapshot();
        assert!(snapshot.contains("I need permission first."));
        assert!(snapshot.contains("https://auth/x"));
    }

    #[test]
    fn test_echo_of_user_input_suppressed() {
        let mut renderer = StreamRenderer::new().ignore_echo_of("what emails do I have?");
        renderer.ingest("What emails do I have?");
        renderer.ingest("You have 2 unread emails.");

        let snapshot = renderer.snapshot();
        assert!(!snapshot.contains("What emails do I have?"));
        assert!(snapshot.contains("You have 2 unread emails."));
    }

    #[test]
    fn test_null_and_empty_chunks_dropped() {
        let mut renderer = StreamRenderer::new();
        renderer.ingest("");
        renderer.ingest("   ");
        renderer.ingest("null");
        renderer.ingest("real content");

        assert_eq!(renderer.snapshot().trim(), "real content");
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut renderer = StreamRenderer::new();
        renderer.ingest("content");
        renderer.finalize();
        let first = renderer.snapshot().to_string();

        renderer.finalize();
        assert_eq!(renderer.snapshot(), first);

        renderer.ingest("after finalize");
        assert_eq!(renderer.snapshot(), first);
    }

    #[tokio::test]
    async fn test_ingest_stream_preserves_arrival_order() {
        use tokio_stream::wrappers::ReceiverStream;

        let (tx, rx) = tokio::sync::mpsc::channel(4);
        tx.send("one".to_string()).await.unwrap();
        tx.send("two".to_string()).await.unwrap();
        tx.send("one".to_string()).await.unwrap();
        drop(tx);

        let mut renderer = StreamRenderer::new();
        renderer.ingest_stream(ReceiverStream::new(rx)).await;
        renderer.finalize();

        let snapshot = renderer.snapshot();
        assert_eq!(snapshot.matches("one").count(), 1);
        assert!(snapshot.find("one").unwrap() < snapshot.find("two").unwrap());
    }

    proptest! {
        /// Every distinct block renders at most once, regardless of how
        /// often or in what order duplicates arrive.
        #[test]
        fn prop_no_fingerprint_renders_twice(
            sequence in proptest::collection::vec(0usize..4, 0..32)
        ) {
            let candidates = [
                "alpha update ready",
                "bravo digest complete",
                "charlie summary sent",
                "delta report queued",
            ];

            let mut renderer = StreamRenderer::new();
            for index in &sequence {
                renderer.ingest(candidates[*index]);
            }
            renderer.finalize();

            let snapshot = renderer.snapshot();
            for candidate in candidates {
                prop_assert!(snapshot.matches(candidate).count() <= 1);
            }
        }
    }
}
