//! Transcript entities: turns and the final recommendation.

use crate::taste::entities::PriceTier;
use serde::{Deserialize, Serialize};

/// Kind of a turn, inferred from its round number.
///
/// Round 0 is the opening; the final round closes; rounds 1-2 propose and
/// the rounds in between seek agreement. `Objection` is part of the
/// vocabulary but round banding never assigns it; deriving kinds from
/// utterance content instead is an open product decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    Opening,
    Proposal,
    Concord,
    Objection,
    Closing,
}

impl TurnKind {
    /// Infer the kind for a turn in `round` of a run with `max_rounds`.
    pub fn for_round(round: u32, max_rounds: u32) -> Self {
        if round == 0 {
            TurnKind::Opening
        } else if round >= max_rounds {
            TurnKind::Closing
        } else if round <= 2 {
            TurnKind::Proposal
        } else {
            TurnKind::Concord
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TurnKind::Opening => "opening",
            TurnKind::Proposal => "proposal",
            TurnKind::Concord => "concord",
            TurnKind::Objection => "objection",
            TurnKind::Closing => "closing",
        }
    }
}

impl std::fmt::Display for TurnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One utterance in a negotiation transcript (Value Object)
///
/// Immutable once produced; `seq` is per-session monotonic and equals the
/// turn's position in production order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub participant_id: String,
    pub display_name: String,
    /// Name the agent speaks under, e.g. "Ming's dining guide"
    pub agent_label: String,
    pub text: String,
    pub seq: u64,
    pub produced_at_ms: u64,
    pub kind: TurnKind,
    /// True when this is a neutral placeholder substituted after the
    /// participant's generation attempts were exhausted.
    #[serde(default)]
    pub degraded: bool,
}

impl Turn {
    pub fn new(
        seq: u64,
        participant_id: impl Into<String>,
        display_name: impl Into<String>,
        agent_label: impl Into<String>,
        text: impl Into<String>,
        kind: TurnKind,
    ) -> Self {
        Self {
            id: format!("turn-{:04}", seq),
            participant_id: participant_id.into(),
            display_name: display_name.into(),
            agent_label: agent_label.into(),
            text: text.into(),
            seq,
            produced_at_ms: crate::util::now_ms(),
            kind,
            degraded: false,
        }
    }

    pub fn degraded(mut self) -> Self {
        self.degraded = true;
        self
    }
}

/// How a recommendation was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// Backed by a real place-lookup result
    Grounded,
    /// Generated by the text collaborator from the transcript
    Synthesized,
    /// Produced by the deterministic fallback table
    RuleBased,
}

impl RecommendationSource {
    pub fn is_fallback(self) -> bool {
        !matches!(self, RecommendationSource::Grounded)
    }
}

/// The single outcome attached to every completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub venue_name: String,
    pub cuisine: String,
    pub rationale: String,
    /// Display names of the participants this suits
    pub suitable_for: Vec<String>,
    pub price_tier: PriceTier,
    pub dish_suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub source: RecommendationSource,
}

impl Recommendation {
    pub fn new(
        venue_name: impl Into<String>,
        cuisine: impl Into<String>,
        rationale: impl Into<String>,
        source: RecommendationSource,
    ) -> Self {
        Self {
            venue_name: venue_name.into(),
            cuisine: cuisine.into(),
            rationale: rationale.into(),
            suitable_for: Vec::new(),
            price_tier: PriceTier::Moderate,
            dish_suggestions: Vec::new(),
            rating: None,
            address: None,
            source,
        }
    }

    pub fn with_suitable_for(mut self, names: Vec<String>) -> Self {
        self.suitable_for = names;
        self
    }

    pub fn with_price_tier(mut self, tier: PriceTier) -> Self {
        self.price_tier = tier;
        self
    }

    pub fn with_dishes(mut self, dishes: Vec<String>) -> Self {
        self.dish_suggestions = dishes;
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}
