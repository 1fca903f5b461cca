//! Place lookup port
//!
//! Interface to the external venue-search collaborator used by the grounded
//! recommendation tier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A real venue returned by the place-lookup collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub address: String,
    /// Provider category string, e.g. "Chinese restaurant;Sichuan"
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// Average per-head cost in the provider's currency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_cost: Option<f32>,
    /// "longitude,latitude" as reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<String>,
}

/// Errors from the place-lookup collaborator.
///
/// Transient failures are treated exactly like a not-found result by the
/// recommendation fallback chain.
#[derive(Error, Debug, Clone)]
pub enum LookupError {
    #[error("place lookup transport error: {0}")]
    Transport(String),

    #[error("place lookup rejected the request: {0}")]
    Rejected(String),
}

/// Venue search collaborator
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Search for a venue matching a cuisine or free-text query in a city.
    ///
    /// `Ok(None)` means the provider answered but found nothing.
    async fn lookup(&self, query: &str, city: &str) -> Result<Option<Venue>, LookupError>;
}
