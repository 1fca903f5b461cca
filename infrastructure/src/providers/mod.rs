//! Collaborator adapters: HTTP clients and offline stand-ins.

pub mod chat_api;
pub mod dish_analyzer;
pub mod offline;
pub mod place_search;

pub use chat_api::{ChatApiClient, ChatApiConfig};
pub use dish_analyzer::ChatDishAnalyzer;
pub use offline::{HeuristicDishAnalyzer, OfflineTextGenerator};
pub use place_search::{PlaceSearchConfig, PoiPlaceSearch};
