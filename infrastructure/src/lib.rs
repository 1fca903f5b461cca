//! Infrastructure layer for table-council
//!
//! Adapters behind the application ports: in-process session storage, the
//! durable transcript log with push fan-out, HTTP collaborator clients,
//! offline stand-ins, configuration loading, and transcript recording.

pub mod config;
pub mod log;
pub mod logging;
pub mod providers;
pub mod store;

pub use config::{ConfigLoader, FileConfig};
pub use log::InMemoryTranscriptLog;
pub use logging::JsonlTranscriptRecorder;
pub use providers::{
    chat_api::{ChatApiClient, ChatApiConfig},
    dish_analyzer::ChatDishAnalyzer,
    offline::{HeuristicDishAnalyzer, OfflineTextGenerator},
    place_search::{PlaceSearchConfig, PoiPlaceSearch},
};
pub use store::{InMemoryRoomStore, JsonFileRoomStore};
