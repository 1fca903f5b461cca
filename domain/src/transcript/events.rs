//! Delivery event types for the session transcript.
//!
//! Every observable fact about a running session is one [`LogEntry`]
//! appended to the session's durable log. The push stream and the poll
//! endpoint both read the same entries; a [`SequencedEntry`] carries its
//! log offset so replay after a reconnect deduplicates cleanly.

use super::entities::{Recommendation, Turn};
use serde::{Deserialize, Serialize};

/// Whether a session's log is still being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    Ongoing,
    Completed,
}

impl FeedStatus {
    pub fn is_completed(self) -> bool {
        matches!(self, FeedStatus::Completed)
    }
}

/// One record in the append-only session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEntry {
    /// A produced negotiation turn
    Turn(Turn),
    /// A transient operator-facing notice (e.g. a collaborator fallback)
    Notice { message: String },
    /// The final recommendation
    Recommendation(Recommendation),
    /// Explicit completion marker; always the last entry of a session
    Completed,
}

impl LogEntry {
    pub fn notice(message: impl Into<String>) -> Self {
        LogEntry::Notice {
            message: message.into(),
        }
    }

    /// Returns the turn if this entry carries one.
    pub fn as_turn(&self) -> Option<&Turn> {
        match self {
            LogEntry::Turn(turn) => Some(turn),
            _ => None,
        }
    }

    /// Whether this entry ends the session's stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LogEntry::Completed)
    }
}

/// A log entry stamped with its offset in the session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedEntry {
    pub offset: u64,
    pub entry: LogEntry,
}

impl SequencedEntry {
    pub fn new(offset: u64, entry: LogEntry) -> Self {
        Self { offset, entry }
    }
}
