//! Domain layer for table-council
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council is one bounded multi-party negotiation over where to eat:
//!
//! - **Room**: the joinable session keyed by an invite code, with a
//!   forward-only lifecycle (waiting → ready → discussing → completed)
//! - **Turn**: one utterance produced by a participant's agent, permanently
//!   ordered in the transcript
//! - **Recommendation**: the single outcome every completed session carries
//!
//! ## Taste
//!
//! Each participant owns one immutable [`TasteProfile`]; the aggregate
//! [`MergedSignal`] is recomputed from current profiles whenever needed and
//! never stored.

pub mod core;
pub mod prompt;
pub mod room;
pub mod taste;
pub mod transcript;
pub mod util;

// Re-export commonly used types
pub use core::{error::DomainError, invite::InviteCode};
pub use prompt::NegotiationPrompt;
pub use room::{
    entities::{Participant, Room, RoomStatus, RoomStatusSummary},
    error::RoomError,
    store::RoomStore,
};
pub use taste::{
    entities::{CuisinePreference, PriceTier, TasteProfile, TasteVector},
    merge::{MergedSignal, merge_profiles},
};
pub use transcript::{
    entities::{Recommendation, RecommendationSource, Turn, TurnKind},
    events::{FeedStatus, LogEntry, SequencedEntry},
};
