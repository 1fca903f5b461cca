//! Offline collaborator stand-ins
//!
//! Deterministic, network-free implementations of the generation and
//! analysis ports. Used by the CLI demo when no API key is configured and
//! convenient in tests; the negotiation engine cannot tell the difference.

use async_trait::async_trait;
use council_application::ports::dish_analyzer::{AnalysisError, DishAnalyzer};
use council_application::ports::text_generator::{GenerationError, Message, TextGenerator};
use council_domain::{CuisinePreference, PriceTier, TasteProfile, TasteVector};
use std::sync::atomic::{AtomicUsize, Ordering};

const OPENING_LINES: [&str; 3] = [
    "I'm in the mood for something bold today; how about we start from my favorites?",
    "Quick intro from me: I care most about flavor over frills. I'd suggest we keep it casual.",
    "My vote goes to a place where everyone finds something; here's my opening thought.",
];

const RESPONSE_LINES: [&str; 4] = [
    "That's fair; I could meet you halfway if we pick somewhere with a varied menu.",
    "I hear you. Let's lean toward the option most of us already like.",
    "Good points all around; I'd compromise on the cuisine if the price stays sensible.",
    "Works for me, as long as there's at least one dish for my taste.",
];

const REFINE_LINES: [&str; 3] = [
    "Thinking about it more, I'd narrow it down to the option I named first.",
    "On reflection, comfort food wins; I'll firm up my earlier suggestion.",
    "Let me sharpen that: same cuisine, but somewhere with good ratings.",
];

/// Canned text generator cycling through a fixed repertoire.
///
/// The reply depends on the prompt kind (opening / respond / refine) and an
/// internal counter, so transcripts read naturally but stay deterministic.
#[derive(Default)]
pub struct OfflineTextGenerator {
    calls: AtomicUsize,
}

impl OfflineTextGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TextGenerator for OfflineTextGenerator {
    async fn generate(&self, messages: &[Message]) -> Result<String, GenerationError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        let prompt = messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let line = if prompt.contains("introduce") {
            OPENING_LINES[n % OPENING_LINES.len()]
        } else if prompt.contains("What the others said") {
            RESPONSE_LINES[n % RESPONSE_LINES.len()]
        } else {
            REFINE_LINES[n % REFINE_LINES.len()]
        };
        Ok(line.to_string())
    }
}

/// Keyword heuristics standing in for the dish-analysis collaborator.
struct CuisineRule {
    cuisine: &'static str,
    keywords: &'static [&'static str],
    vector: TasteVector,
    ingredients: &'static [&'static str],
}

fn rules() -> Vec<CuisineRule> {
    vec![
        CuisineRule {
            cuisine: "Sichuan",
            keywords: &["kung pao", "mapo", "chili", "sichuan", "hot pot", "boiled fish", "dan dan"],
            vector: TasteVector {
                spice: 0.9,
                sweetness: 0.2,
                saltiness: 0.6,
                sourness: 0.2,
                numbing: 0.7,
            },
            ingredients: &["chicken", "tofu", "beef"],
        },
        CuisineRule {
            cuisine: "Cantonese",
            keywords: &["dim sum", "har gow", "roast goose", "char siu", "congee", "cantonese", "steamed"],
            vector: TasteVector {
                spice: 0.1,
                sweetness: 0.4,
                saltiness: 0.5,
                sourness: 0.1,
                numbing: 0.0,
            },
            ingredients: &["shrimp", "pork", "rice"],
        },
        CuisineRule {
            cuisine: "Japanese",
            keywords: &["sushi", "sashimi", "ramen", "tempura", "udon", "tonkatsu", "unagi"],
            vector: TasteVector {
                spice: 0.1,
                sweetness: 0.3,
                saltiness: 0.6,
                sourness: 0.2,
                numbing: 0.0,
            },
            ingredients: &["fish", "rice", "seaweed"],
        },
    ]
}

/// Offline dish analyzer built from keyword matching.
#[derive(Default)]
pub struct HeuristicDishAnalyzer;

impl HeuristicDishAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DishAnalyzer for HeuristicDishAnalyzer {
    async fn analyze(
        &self,
        _participant_id: &str,
        dishes: &[String],
    ) -> Result<TasteProfile, AnalysisError> {
        if dishes.iter().all(|d| d.trim().is_empty()) {
            return Err(AnalysisError::EmptyInput);
        }

        let lower: Vec<String> = dishes.iter().map(|d| d.to_lowercase()).collect();
        let mut cuisines = Vec::new();
        let mut vector = TasteVector::default();
        let mut ingredients: Vec<String> = Vec::new();

        for rule in rules() {
            let hits = lower
                .iter()
                .filter(|d| rule.keywords.iter().any(|k| d.contains(k)))
                .count();
            if hits > 0 {
                let weight = (hits as f32 / dishes.len() as f32).clamp(0.3, 1.0);
                cuisines.push(CuisinePreference::new(rule.cuisine, weight));
                vector = rule.vector;
                for ingredient in rule.ingredients {
                    if !ingredients.iter().any(|i| i == ingredient) {
                        ingredients.push(ingredient.to_string());
                    }
                }
            }
        }

        if cuisines.is_empty() {
            cuisines.push(CuisinePreference::new("Home-style", 0.5));
            vector = TasteVector::new(0.3, 0.3, 0.5, 0.2, 0.1);
        }

        Ok(
            TasteProfile::new(vector, cuisines, PriceTier::Moderate)
                .with_ingredients(ingredients),
        )
    }
}
