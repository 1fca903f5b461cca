//! In-process transcript log
//!
//! The durable append-only log plus its push fan-out, in one place: every
//! append stores the entry, mirrors it to the optional recorder, and
//! broadcasts it to live subscribers. Poll readers and push subscribers see
//! the exact same sequence because there is only one sequence.

use async_trait::async_trait;
use council_application::ports::transcript_log::{
    LogError, TranscriptLog, TranscriptPage, TranscriptSubscription,
};
use council_application::ports::transcript_recorder::TranscriptRecorder;
use council_domain::{
    FeedStatus, InviteCode, LogEntry, Recommendation, SequencedEntry, util::now_ms,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

/// Buffered entries per live subscriber before it is considered lagging.
const CHANNEL_CAPACITY: usize = 256;

struct SessionLog {
    entries: Vec<SequencedEntry>,
    status: FeedStatus,
    recommendation: Option<Recommendation>,
    updated_at_ms: u64,
    tx: broadcast::Sender<SequencedEntry>,
}

impl SessionLog {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            entries: Vec::new(),
            status: FeedStatus::Ongoing,
            recommendation: None,
            updated_at_ms: now_ms(),
            tx,
        }
    }
}

/// Transcript log backed by process memory.
pub struct InMemoryTranscriptLog {
    sessions: RwLock<HashMap<String, SessionLog>>,
    recorder: Option<Arc<dyn TranscriptRecorder>>,
}

impl InMemoryTranscriptLog {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            recorder: None,
        }
    }

    /// Mirror every appended entry to a recorder (e.g. a JSONL file).
    pub fn with_recorder(mut self, recorder: Arc<dyn TranscriptRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }
}

impl Default for InMemoryTranscriptLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptLog for InMemoryTranscriptLog {
    async fn init_session(&self, code: &InviteCode) {
        debug!(session = %code, "initialising transcript log");
        self.sessions
            .write()
            .await
            .insert(code.as_str().to_string(), SessionLog::new());
    }

    async fn append(&self, code: &InviteCode, entry: LogEntry) -> Result<u64, LogError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(code.as_str())
            .ok_or_else(|| LogError::SessionNotFound(code.to_string()))?;

        match &entry {
            LogEntry::Recommendation(rec) => session.recommendation = Some(rec.clone()),
            LogEntry::Completed => session.status = FeedStatus::Completed,
            _ => {}
        }

        let offset = session.entries.len() as u64;
        let sequenced = SequencedEntry::new(offset, entry);
        session.entries.push(sequenced.clone());
        session.updated_at_ms = now_ms();

        if let Some(recorder) = &self.recorder {
            recorder.record(code, &sequenced);
        }
        // No live subscribers is fine; the log is the source of truth
        let _ = session.tx.send(sequenced);

        Ok(offset)
    }

    async fn read_from(
        &self,
        code: &InviteCode,
        from_offset: u64,
    ) -> Result<TranscriptPage, LogError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(code.as_str())
            .ok_or_else(|| LogError::SessionNotFound(code.to_string()))?;

        let entries = session
            .entries
            .iter()
            .skip(from_offset.min(session.entries.len() as u64) as usize)
            .cloned()
            .collect();

        Ok(TranscriptPage {
            entries,
            total: session.entries.len() as u64,
            status: session.status,
            recommendation: session.recommendation.clone(),
        })
    }

    async fn subscribe(&self, code: &InviteCode) -> Result<TranscriptSubscription, LogError> {
        // Snapshot and receiver are taken under the same lock appends write
        // through, so no entry can fall between them.
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(code.as_str())
            .ok_or_else(|| LogError::SessionNotFound(code.to_string()))?;

        Ok(TranscriptSubscription {
            snapshot: session.entries.clone(),
            live: session.tx.subscribe(),
        })
    }

    async fn remove(&self, code: &InviteCode) {
        if self.sessions.write().await.remove(code.as_str()).is_some() {
            debug!(session = %code, "transcript log removed");
        }
    }

    async fn sweep_idle(&self, ttl_ms: u64) -> usize {
        let now = now_ms();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now.saturating_sub(s.updated_at_ms) <= ttl_ms);
        before - sessions.len()
    }
}
