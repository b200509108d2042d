//! Sample data fixtures for testing.
//!
//! This module provides ready-made test data for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // comm-events = { path = "../comm-events", features = ["test-fixtures"] }
//!
//! use comm_events::fixtures;
//!
//! let messages = fixtures::sample_messages();
//! let threads = fixtures::sample_threads();
//! ```

use crate::{Message, ThreadMeta};

/// Returns sample messages from the fixtures file.
///
/// Contains 15 messages across five threads and three calendar days:
/// - a productive GitHub review thread (evidence, acknowledgments)
/// - a hostile GitHub thread (insults, a fork threat, a NACK pile-on)
/// - a heated-but-fair BIP discussion
/// - an IRC exchange with one stonewalling participant
/// - a hedged mailing-list thread
pub fn sample_messages() -> Vec<Message> {
    let jsonl = include_str!("../tests/fixtures/sample_messages.jsonl");
    jsonl
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            Message::from_jsonl(l)
                .unwrap_or_else(|e| panic!("Failed to parse message line: {}\nError: {}", l, e))
        })
        .collect()
}

/// Returns sample thread metadata matching [`sample_messages`].
pub fn sample_threads() -> Vec<ThreadMeta> {
    let jsonl = include_str!("../tests/fixtures/sample_threads.jsonl");
    jsonl
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            ThreadMeta::from_jsonl(l)
                .unwrap_or_else(|e| panic!("Failed to parse thread line: {}\nError: {}", l, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Source;

    #[test]
    fn fixtures_parse_and_validate() {
        let messages = sample_messages();
        assert_eq!(messages.len(), 15);
        for msg in &messages {
            msg.validate()
                .unwrap_or_else(|e| panic!("fixture {} invalid: {}", msg.id, e));
        }
    }

    #[test]
    fn fixtures_cover_all_sources() {
        let messages = sample_messages();
        for source in Source::all() {
            assert!(
                messages.iter().any(|m| m.source == *source),
                "no fixture message for source {}",
                source
            );
        }
    }

    #[test]
    fn every_fixture_message_has_thread_meta() {
        let messages = sample_messages();
        let threads = sample_threads();
        for msg in &messages {
            assert!(
                threads.iter().any(|t| t.thread_id == msg.thread_id),
                "message {} has no thread meta",
                msg.id
            );
        }
    }
}
