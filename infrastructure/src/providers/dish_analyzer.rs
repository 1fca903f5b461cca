//! LLM-backed dish analysis
//!
//! Prompts the text-generation collaborator to turn a free-text dish list
//! into a structured taste profile, parsing its reply permissively (a JSON
//! object embedded in prose is accepted).

use async_trait::async_trait;
use council_application::ports::dish_analyzer::{AnalysisError, DishAnalyzer};
use council_application::ports::text_generator::{Message, TextGenerator};
use council_application::use_cases::recommend::extract_json;
use council_domain::{CuisinePreference, PriceTier, TasteProfile, TasteVector};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

const ANALYSIS_SYSTEM: &str = "You are a culinary analyst extracting taste profiles.";

fn analysis_prompt(dishes: &[String]) -> String {
    let mut prompt = String::from(
        "Analyze the following dishes a diner likes and extract their taste profile.\n\n\
         Dishes:\n",
    );
    for (i, dish) in dishes.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, dish));
    }

    prompt.push_str(
        r#"
Normalize misspellings and aliases, infer the cuisines involved, score the
five taste axes from 0 to 1, list preferred ingredients, and estimate a price
tier from 1 (cheap eats) to 4 (fine dining).

Reply with a JSON object and nothing else:
{
  "cuisines": [{"name": "Sichuan", "weight": 0.7}],
  "taste_vector": {"spice": 0.8, "sweetness": 0.3, "saltiness": 0.6, "sourness": 0.2, "numbing": 0.5},
  "ingredients": ["chicken", "tofu"],
  "price_tier": 2
}"#,
    );
    prompt
}

#[derive(Deserialize)]
struct AnalysisOutcome {
    #[serde(default)]
    cuisines: Vec<CuisineEntry>,
    taste_vector: VectorEntry,
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    price_tier: Option<u8>,
}

#[derive(Deserialize)]
struct CuisineEntry {
    name: String,
    #[serde(default)]
    weight: Option<f32>,
}

#[derive(Deserialize, Default)]
struct VectorEntry {
    #[serde(default)]
    spice: f32,
    #[serde(default)]
    sweetness: f32,
    #[serde(default)]
    saltiness: f32,
    #[serde(default)]
    sourness: f32,
    #[serde(default)]
    numbing: f32,
}

/// Dish analyzer speaking through the text-generation collaborator.
pub struct ChatDishAnalyzer {
    generator: Arc<dyn TextGenerator>,
}

impl ChatDishAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl DishAnalyzer for ChatDishAnalyzer {
    async fn analyze(
        &self,
        participant_id: &str,
        dishes: &[String],
    ) -> Result<TasteProfile, AnalysisError> {
        if dishes.iter().all(|d| d.trim().is_empty()) {
            return Err(AnalysisError::EmptyInput);
        }

        debug!(participant = participant_id, dishes = dishes.len(), "analyzing dish list");

        let messages = [
            Message::system(ANALYSIS_SYSTEM),
            Message::user(analysis_prompt(dishes)),
        ];
        let response = self
            .generator
            .generate(&messages)
            .await
            .map_err(|e| AnalysisError::Upstream(e.to_string()))?;

        let value = extract_json(&response)
            .ok_or_else(|| AnalysisError::Upstream("no JSON in analysis output".to_string()))?;
        let outcome: AnalysisOutcome = serde_json::from_value(value).map_err(|e| {
            warn!(participant = participant_id, error = %e, "analysis output mismatch");
            AnalysisError::Upstream(e.to_string())
        })?;

        let vector = TasteVector::new(
            outcome.taste_vector.spice,
            outcome.taste_vector.sweetness,
            outcome.taste_vector.saltiness,
            outcome.taste_vector.sourness,
            outcome.taste_vector.numbing,
        );
        let cuisines = outcome
            .cuisines
            .into_iter()
            .map(|c| CuisinePreference::new(c.name, c.weight.unwrap_or(0.5)))
            .collect();

        Ok(TasteProfile::new(
            vector,
            cuisines,
            outcome
                .price_tier
                .map(PriceTier::from_index)
                .unwrap_or(PriceTier::Moderate),
        )
        .with_ingredients(outcome.ingredients))
    }
}
