//! Transcript log port
//!
//! The single authoritative record of a session's output. The orchestrator
//! is the only writer; the poll path reads pages by offset and the push
//! path subscribes to the same log — two views, one copy.

use async_trait::async_trait;
use council_domain::{FeedStatus, InviteCode, LogEntry, Recommendation, SequencedEntry};
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors from transcript log operations
#[derive(Error, Debug, Clone)]
pub enum LogError {
    #[error("no transcript for session {0}")]
    SessionNotFound(String),
}

/// One page of log entries for a polling client.
#[derive(Debug, Clone)]
pub struct TranscriptPage {
    /// Entries at offsets >= the requested cursor, in order
    pub entries: Vec<SequencedEntry>,
    /// Total number of entries currently in the log
    pub total: u64,
    pub status: FeedStatus,
    /// Present once the recommendation entry has been appended
    pub recommendation: Option<Recommendation>,
}

/// A push subscription: everything already in the log plus a live tail.
///
/// The snapshot and the receiver may overlap around the subscription
/// instant; consumers deduplicate by offset (see `SessionFeed`).
pub struct TranscriptSubscription {
    pub snapshot: Vec<SequencedEntry>,
    pub live: broadcast::Receiver<SequencedEntry>,
}

/// Append-only per-session transcript log with integer offsets.
#[async_trait]
pub trait TranscriptLog: Send + Sync {
    /// Create (or reset) the log for a session about to start discussing.
    async fn init_session(&self, code: &InviteCode);

    /// Append one entry, notify subscribers, and return its offset.
    ///
    /// Appending [`LogEntry::Recommendation`] records the outcome on the
    /// page metadata; appending [`LogEntry::Completed`] flips the status.
    async fn append(&self, code: &InviteCode, entry: LogEntry) -> Result<u64, LogError>;

    /// Read entries at `from_offset` and later.
    ///
    /// A cursor equal to the current length yields an empty page (with
    /// status), never an error: that is the steady state of an up-to-date
    /// poller.
    async fn read_from(&self, code: &InviteCode, from_offset: u64)
    -> Result<TranscriptPage, LogError>;

    /// Subscribe for live entries, including a replay snapshot.
    async fn subscribe(&self, code: &InviteCode) -> Result<TranscriptSubscription, LogError>;

    /// Drop a session's log (teardown or TTL expiry).
    async fn remove(&self, code: &InviteCode);

    /// Evict logs idle longer than `ttl_ms`; returns how many were evicted.
    async fn sweep_idle(&self, ttl_ms: u64) -> usize;
}
