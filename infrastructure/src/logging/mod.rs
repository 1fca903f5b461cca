//! Transcript recording sinks.

pub mod jsonl;

pub use jsonl::JsonlTranscriptRecorder;
