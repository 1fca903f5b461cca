//! Application layer for table-council
//!
//! Use cases and ports. The negotiation engine lives here: agents produce
//! turns through the [`ports::text_generator::TextGenerator`] port, the
//! orchestrator drives the fixed-round protocol, and [`RoomService`] is the
//! transport-agnostic surface the UI layer calls.

pub mod agent;
pub mod config;
pub mod ports;
pub mod stream;
pub mod use_cases;

pub use agent::{AgentPhase, NegotiationAgent, TurnContext};
pub use config::{DeliverySettings, NegotiationSettings};
pub use ports::{
    dish_analyzer::{AnalysisError, DishAnalyzer},
    place_lookup::{LookupError, PlaceLookup, Venue},
    text_generator::{GenerationError, Message, Role, TextGenerator},
    transcript_log::{LogError, TranscriptLog, TranscriptPage, TranscriptSubscription},
    transcript_recorder::TranscriptRecorder,
};
pub use stream::{FeedEvent, SessionFeed};
pub use use_cases::{
    recommend::RecommendationResolver,
    room_service::{RoomService, SessionApiError},
    run_negotiation::NegotiationRun,
};
