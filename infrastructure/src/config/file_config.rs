//! Configuration file schema

use crate::providers::chat_api::ChatApiConfig;
use crate::providers::place_search::PlaceSearchConfig;
use council_application::{DeliverySettings, NegotiationSettings};
use serde::{Deserialize, Serialize};

/// External collaborator endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub chat: ChatApiConfig,
    pub places: PlaceSearchConfig,
}

/// Root of `council.toml`.
///
/// ```toml
/// [negotiation]
/// max_rounds = 5
/// city = "Beijing"
///
/// [delivery]
/// heartbeat_secs = 10
///
/// [providers.chat]
/// api_key = "sk-..."
///
/// [providers.places]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub negotiation: NegotiationSettings,
    pub delivery: DeliverySettings,
    pub providers: ProvidersConfig,
}
