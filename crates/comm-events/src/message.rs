//! Message Types
//!
//! Input records produced by the scrapers. The analyzer treats these as
//! immutable and read-only; a rerun over the same records must see the
//! same bytes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Communication channel a message was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    #[serde(rename = "github")]
    GitHub,
    Bips,
    Irc,
    MailingList,
}

impl Source {
    /// Returns the lowercase identifier used in persisted records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::GitHub => "github",
            Source::Bips => "bips",
            Source::Irc => "irc",
            Source::MailingList => "mailing_list",
        }
    }

    /// Returns all source variants.
    pub fn all() -> &'static [Source] {
        &[Source::GitHub, Source::Bips, Source::Irc, Source::MailingList]
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single scraped message: one comment, one mail, one IRC line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier assigned by the scraper (e.g. "gh-28421-c3")
    pub id: String,
    /// Identifier of the discussion thread this message belongs to
    pub thread_id: String,
    /// Author handle as reported by the source
    pub author: String,
    /// Channel the message came from
    pub source: Source,
    /// Raw message text
    pub body: String,
    /// When the message was posted (UTC)
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Parses a message from a single JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Returns the UTC calendar day the message was posted on.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Checks the record is complete enough to score.
    ///
    /// Scrapers occasionally emit rows with empty fields or bodies that are
    /// nothing but replacement characters from a bad decode. Those are
    /// skipped upstream rather than scored as empty text.
    pub fn validate(&self) -> Result<(), MalformedMessage> {
        if self.id.trim().is_empty() {
            return Err(MalformedMessage::MissingField { field: "id" });
        }
        if self.thread_id.trim().is_empty() {
            return Err(MalformedMessage::MissingField { field: "thread_id" });
        }
        if self.author.trim().is_empty() {
            return Err(MalformedMessage::MissingField { field: "author" });
        }
        if !self
            .body
            .chars()
            .any(|c| c.is_alphanumeric() || c.is_ascii_punctuation())
        {
            return Err(MalformedMessage::UnusableBody {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Thread metadata supplied by the ingestion boundary where available.
///
/// ACK/NACK counts come from the scraper's review tally, not from text
/// pattern matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMeta {
    pub thread_id: String,
    pub title: String,
    pub source: Source,
    #[serde(default)]
    pub ack_count: u32,
    #[serde(default)]
    pub nack_count: u32,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl ThreadMeta {
    /// Parses thread metadata from a single JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// A message record that cannot be scored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedMessage {
    #[error("message is missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("message `{id}` has no usable text body")]
    UnusableBody { id: String },
}
