//! Transcript recorder port
//!
//! Optional side channel mirroring every appended log entry to an external
//! sink (a JSONL file in the default implementation). Recording must never
//! fail the append path; implementations swallow their own errors.

use council_domain::{InviteCode, SequencedEntry};

/// Sink for a durable off-process copy of session transcripts.
pub trait TranscriptRecorder: Send + Sync {
    fn record(&self, code: &InviteCode, entry: &SequencedEntry);
}

/// No-op recorder for when transcript recording is not configured.
pub struct NoRecorder;

impl TranscriptRecorder for NoRecorder {
    fn record(&self, _code: &InviteCode, _entry: &SequencedEntry) {}
}
