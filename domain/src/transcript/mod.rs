//! Transcript entities and delivery event types.

pub mod entities;
pub mod events;

pub use entities::{Recommendation, RecommendationSource, Turn, TurnKind};
pub use events::{FeedStatus, LogEntry, SequencedEntry};
