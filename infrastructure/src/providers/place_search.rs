//! POI place search
//!
//! Adapter for an AMap-style place-search REST API implementing the
//! [`PlaceLookup`] port. Results are filtered to restaurant categories and
//! the best-rated hit is returned. With no API key configured the adapter
//! serves a small built-in sample set so the rest of the stack keeps
//! working offline.

use async_trait::async_trait;
use council_application::ports::place_lookup::{LookupError, PlaceLookup, Venue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Restaurant POI category prefixes: Chinese, foreign, fast food, casual,
/// cafe/teahouse.
const RESTAURANT_TYPECODES: [&str; 5] = ["0501", "0502", "0503", "0504", "0505"];

/// Connection settings for the place-search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceSearchConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for PlaceSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://restapi.amap.com/v3".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    pois: Vec<Poi>,
}

#[derive(Deserialize, Clone)]
struct Poi {
    name: String,
    #[serde(rename = "type", default)]
    category: String,
    #[serde(default)]
    typecode: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    biz_ext: Option<BizExt>,
}

#[derive(Deserialize, Clone, Default)]
struct BizExt {
    #[serde(default)]
    rating: Option<String>,
    #[serde(default)]
    cost: Option<String>,
}

impl Poi {
    fn is_restaurant(&self) -> bool {
        RESTAURANT_TYPECODES
            .iter()
            .any(|prefix| self.typecode.starts_with(prefix))
    }

    fn rating(&self) -> Option<f32> {
        self.biz_ext.as_ref()?.rating.as_ref()?.parse().ok()
    }

    fn into_venue(self) -> Venue {
        let rating = self.rating();
        let avg_cost = self
            .biz_ext
            .as_ref()
            .and_then(|b| b.cost.as_ref())
            .and_then(|c| c.parse().ok());
        Venue {
            name: self.name,
            address: self.address,
            category: self.category,
            rating,
            avg_cost,
            coordinates: if self.location.is_empty() {
                None
            } else {
                Some(self.location)
            },
        }
    }
}

/// HTTP adapter for the place-lookup collaborator.
pub struct PoiPlaceSearch {
    client: reqwest::Client,
    config: PlaceSearchConfig,
}

impl PoiPlaceSearch {
    pub fn new(config: PlaceSearchConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn pick_best(mut pois: Vec<Poi>) -> Option<Poi> {
        pois.retain(Poi::is_restaurant);
        // Prefer the best-rated venue, fall back to provider order
        pois.sort_by(|a, b| {
            b.rating()
                .unwrap_or(0.0)
                .partial_cmp(&a.rating().unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        pois.into_iter().next()
    }
}

#[async_trait]
impl PlaceLookup for PoiPlaceSearch {
    async fn lookup(&self, query: &str, city: &str) -> Result<Option<Venue>, LookupError> {
        let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            debug!(query, "no place-search key configured, serving sample venues");
            return Ok(sample_venue(query));
        };

        let url = format!("{}/place/text", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", key),
                ("keywords", query),
                ("types", "050000"),
                ("city", city),
                ("offset", "10"),
                ("page", "1"),
                ("extensions", "all"),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LookupError::Rejected(format!(
                "HTTP {} from place search",
                response.status().as_u16()
            )));
        }

        let parsed: SearchResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(query, error = %e, "unparseable place-search response");
                return Ok(None);
            }
        };
        if parsed.status != "1" {
            debug!(query, status = %parsed.status, "place search reported no results");
            return Ok(None);
        }

        Ok(Self::pick_best(parsed.pois).map(Poi::into_venue))
    }
}

/// Built-in venues served when no API key is configured.
fn sample_venue(query: &str) -> Option<Venue> {
    let samples = [
        (
            "Sichuan",
            Venue {
                name: "Shu Garden Sichuan Kitchen".to_string(),
                address: "88 Jianguo Rd, Chaoyang".to_string(),
                category: "Chinese restaurant;Sichuan".to_string(),
                rating: Some(4.5),
                avg_cost: Some(80.0),
                coordinates: Some("116.481488,39.990464".to_string()),
            },
        ),
        (
            "Cantonese",
            Venue {
                name: "Canton Harbour House".to_string(),
                address: "19 Sanlitun Rd, Chaoyang".to_string(),
                category: "Chinese restaurant;Cantonese".to_string(),
                rating: Some(4.6),
                avg_cost: Some(150.0),
                coordinates: Some("116.455393,39.936454".to_string()),
            },
        ),
        (
            "Hot pot",
            Venue {
                name: "Laoma Hot Pot".to_string(),
                address: "110 Xidan North St, Xicheng".to_string(),
                category: "Chinese restaurant;Hot pot".to_string(),
                rating: Some(4.8),
                avg_cost: Some(120.0),
                coordinates: Some("116.375282,39.914305".to_string()),
            },
        ),
        (
            "Japanese",
            Venue {
                name: "Sakura Table".to_string(),
                address: "48 Liangmaqiao Rd, Chaoyang".to_string(),
                category: "Foreign restaurant;Japanese".to_string(),
                rating: Some(4.4),
                avg_cost: Some(200.0),
                coordinates: Some("116.462312,39.949876".to_string()),
            },
        ),
    ];

    let query_lower = query.to_lowercase();
    samples
        .iter()
        .find(|(name, _)| query_lower.contains(&name.to_lowercase()))
        .map(|(_, venue)| venue.clone())
}
