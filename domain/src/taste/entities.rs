//! Taste profile entities
//!
//! A [`TasteProfile`] is produced by the external dish-analysis collaborator
//! when a participant submits their dish list, and is immutable once attached
//! to a participant for the duration of a session.

use serde::{Deserialize, Serialize};

/// Five normalized taste intensity scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TasteVector {
    pub spice: f32,
    pub sweetness: f32,
    pub saltiness: f32,
    pub sourness: f32,
    pub numbing: f32,
}

impl TasteVector {
    /// Build a vector with every field clamped into `[0, 1]`.
    pub fn new(spice: f32, sweetness: f32, saltiness: f32, sourness: f32, numbing: f32) -> Self {
        Self {
            spice: clamp01(spice),
            sweetness: clamp01(sweetness),
            saltiness: clamp01(saltiness),
            sourness: clamp01(sourness),
            numbing: clamp01(numbing),
        }
    }

}

fn clamp01(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// One cuisine a participant likes, with an independent preference strength.
///
/// Weights do not need to sum to 1 across a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuisinePreference {
    pub name: String,
    pub weight: f32,
}

impl CuisinePreference {
    pub fn new(name: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            weight: clamp01(weight),
        }
    }
}

/// Price tier of a venue or a participant's budget, 1 (cheap) to 4 (premium).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PriceTier {
    Budget,
    Moderate,
    Upscale,
    Premium,
}

impl PriceTier {
    /// Numeric tier in `1..=4`.
    pub fn as_index(self) -> u8 {
        match self {
            PriceTier::Budget => 1,
            PriceTier::Moderate => 2,
            PriceTier::Upscale => 3,
            PriceTier::Premium => 4,
        }
    }

    /// Tier from a numeric index, clamping out-of-range values inward.
    pub fn from_index(index: u8) -> Self {
        match index {
            0 | 1 => PriceTier::Budget,
            2 => PriceTier::Moderate,
            3 => PriceTier::Upscale,
            _ => PriceTier::Premium,
        }
    }

    /// Tier from an average per-head cost reported by a venue listing.
    pub fn from_avg_cost(cost: f32) -> Self {
        if cost > 100.0 {
            PriceTier::Upscale
        } else {
            PriceTier::Moderate
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PriceTier::Budget => "budget-friendly",
            PriceTier::Moderate => "mid-range",
            PriceTier::Upscale => "upscale",
            PriceTier::Premium => "premium",
        }
    }
}

impl From<PriceTier> for u8 {
    fn from(tier: PriceTier) -> u8 {
        tier.as_index()
    }
}

impl TryFrom<u8> for PriceTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=4).contains(&value) {
            Ok(PriceTier::from_index(value))
        } else {
            Err(format!("price tier out of range: {}", value))
        }
    }
}

/// A participant's structured taste profile (Value Object)
///
/// Owned by exactly one participant. The optional `supplement` carries
/// free-text enrichment from the participant; when present it takes
/// precedence over dish-derived signals in agent prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasteProfile {
    pub vector: TasteVector,
    pub cuisines: Vec<CuisinePreference>,
    pub ingredients: Vec<String>,
    pub price_tier: PriceTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplement: Option<String>,
}

impl TasteProfile {
    pub fn new(vector: TasteVector, cuisines: Vec<CuisinePreference>, price_tier: PriceTier) -> Self {
        Self {
            vector,
            cuisines,
            ingredients: Vec::new(),
            price_tier,
            supplement: None,
        }
    }

    pub fn with_ingredients(mut self, ingredients: Vec<String>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_supplement(mut self, supplement: impl Into<String>) -> Self {
        self.supplement = Some(supplement.into());
        self
    }

    /// Cuisine names in preference order.
    pub fn cuisine_names(&self) -> impl Iterator<Item = &str> {
        self.cuisines.iter().map(|c| c.name.as_str())
    }
}
