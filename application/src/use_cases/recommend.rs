//! Recommendation synthesis
//!
//! Three tiers attempted left to right, first success wins:
//! grounded (real venue from the place-lookup collaborator), synthesized
//! (structured output from the text collaborator), rule-based (deterministic
//! table). The chain is total: a session always gets an outcome.

use crate::ports::place_lookup::{PlaceLookup, Venue};
use crate::ports::text_generator::{Message, TextGenerator};
use council_domain::{
    MergedSignal, NegotiationPrompt, PriceTier, Recommendation, RecommendationSource, TasteProfile,
    Turn,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Query used for the grounded tier when no common cuisine exists.
const FALLBACK_QUERY: &str = "popular restaurants";

/// Resolves the final recommendation for a finished negotiation.
pub struct RecommendationResolver {
    places: Arc<dyn PlaceLookup>,
    generator: Arc<dyn TextGenerator>,
    city: String,
}

impl RecommendationResolver {
    pub fn new(
        places: Arc<dyn PlaceLookup>,
        generator: Arc<dyn TextGenerator>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            places,
            generator,
            city: city.into(),
        }
    }

    /// Run the tier chain. Never fails; the rule-based tier is total.
    pub async fn resolve(
        &self,
        names: &[String],
        profiles: &[&TasteProfile],
        merged: &MergedSignal,
        transcript: &[Turn],
    ) -> Recommendation {
        if let Some(rec) = self.tier_grounded(names, merged).await {
            info!(venue = %rec.venue_name, "recommendation grounded in place lookup");
            return rec;
        }
        if let Some(rec) = self.tier_synthesized(names, merged, transcript).await {
            info!(venue = %rec.venue_name, "recommendation synthesized from transcript");
            return rec;
        }

        let rec = self.tier_rule_based(names, profiles, merged);
        info!(venue = %rec.venue_name, "recommendation from rule table");
        rec
    }

    /// Tier a: ask the place-lookup collaborator for a real venue.
    ///
    /// Transient lookup failures are treated exactly like not-found.
    async fn tier_grounded(&self, names: &[String], merged: &MergedSignal) -> Option<Recommendation> {
        let query = merged.leading_cuisine().unwrap_or(FALLBACK_QUERY);

        let venue = match self.places.lookup(query, &self.city).await {
            Ok(Some(venue)) => venue,
            Ok(None) => {
                debug!(query, "place lookup found nothing");
                return None;
            }
            Err(e) => {
                warn!(query, error = %e, "place lookup failed, treating as not found");
                return None;
            }
        };

        Some(self.from_venue(venue, query, names))
    }

    fn from_venue(&self, venue: Venue, query: &str, names: &[String]) -> Recommendation {
        // Provider categories look like "Chinese restaurant;Sichuan"; the
        // second segment is the cuisine when present.
        let cuisine = venue
            .category
            .split(';')
            .nth(1)
            .filter(|s| !s.is_empty())
            .unwrap_or(query)
            .to_string();

        let mut rationale = format!(
            "Everyone shares a taste for {}; {} is a well-rated match.",
            query, venue.name
        );
        if !venue.address.is_empty() {
            rationale.push_str(&format!(" You'll find it at {}.", venue.address));
        }

        let mut rec = Recommendation::new(&venue.name, cuisine, rationale, RecommendationSource::Grounded)
            .with_suitable_for(names.to_vec())
            .with_price_tier(PriceTier::from_avg_cost(venue.avg_cost.unwrap_or(60.0)))
            .with_dishes(vec!["House specialty".into(), "Chef's recommendation".into()]);
        if let Some(rating) = venue.rating {
            rec = rec.with_rating(rating);
        }
        if !venue.address.is_empty() {
            rec = rec.with_address(venue.address);
        }
        rec
    }

    /// Tier b: ask the text collaborator for structured output and parse it
    /// permissively (a JSON object embedded in prose is accepted).
    async fn tier_synthesized(
        &self,
        names: &[String],
        merged: &MergedSignal,
        transcript: &[Turn],
    ) -> Option<Recommendation> {
        let lines: Vec<(String, String)> = transcript
            .iter()
            .map(|t| (t.display_name.clone(), t.text.clone()))
            .collect();
        let prompt = NegotiationPrompt::recommendation_prompt(
            &lines,
            &merged.common_cuisines,
            &merged.ingredients,
        );

        let response = match self.generator.generate(&[Message::user(prompt)]).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "synthesis generation failed");
                return None;
            }
        };

        let parsed: SynthesizedOutcome = match extract_json(&response) {
            Some(value) => match serde_json::from_value(value) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, "synthesis output did not match expected shape");
                    return None;
                }
            },
            None => {
                warn!("synthesis output contained no JSON object");
                return None;
            }
        };

        let cuisine = parsed
            .cuisine
            .or_else(|| merged.leading_cuisine().map(str::to_string))
            .unwrap_or_else(|| "Fusion".to_string());

        Some(
            Recommendation::new(
                parsed.venue_name,
                cuisine,
                parsed
                    .rationale
                    .unwrap_or_else(|| "Picked to match the group's shared tastes.".to_string()),
                RecommendationSource::Synthesized,
            )
            .with_suitable_for(names.to_vec())
            .with_price_tier(
                parsed
                    .price_tier
                    .map(PriceTier::from_index)
                    .unwrap_or(PriceTier::Moderate),
            )
            .with_dishes(parsed.dish_suggestions.unwrap_or_else(|| {
                vec![
                    "House specialty".into(),
                    "Seasonal stir-fry".into(),
                    "A staple".into(),
                ]
            }))
            .with_rating(4.5),
        )
    }

    /// Tier c: deterministic table keyed on the leading common cuisine.
    ///
    /// With no common cuisine at all, the explicit policy for irreconcilable
    /// tastes is a communal hot-pot format: everyone picks their own broth
    /// and dishes, so maximal flexibility stands in for consensus.
    fn tier_rule_based(
        &self,
        names: &[String],
        profiles: &[&TasteProfile],
        merged: &MergedSignal,
    ) -> Recommendation {
        let avg_tier = average_price_tier(profiles);

        let rec = match merged.leading_cuisine() {
            Some("Sichuan") => Recommendation::new(
                "Red Lantern Sichuan House",
                "Sichuan",
                "Everyone loves Sichuan food; this kitchen is authentic and lets you pick the heat.",
                RecommendationSource::RuleBased,
            )
            .with_dishes(vec![
                "Kung pao chicken".into(),
                "Boiled fish in chili oil".into(),
                "Mapo tofu".into(),
                "Mouthwatering chicken".into(),
            ]),
            Some("Cantonese") => Recommendation::new(
                "Pearl River Teahouse",
                "Cantonese",
                "Cantonese cooking is light and fresh, a fit for the whole table.",
                RecommendationSource::RuleBased,
            )
            .with_dishes(vec![
                "White cut chicken".into(),
                "Roast goose".into(),
                "Shrimp dumplings".into(),
                "Steamed spare ribs".into(),
            ]),
            Some(cuisine) => Recommendation::new(
                format!("{} Kitchen", cuisine),
                cuisine,
                "Based on the group's tastes, this place offers plenty of choice.",
                RecommendationSource::RuleBased,
            )
            .with_dishes(vec![
                "House specialty".into(),
                "Signature stir-fry".into(),
                "Soup of the day".into(),
                "A staple".into(),
            ]),
            None => Recommendation::new(
                "Harbor Hot Pot",
                "Hot pot",
                "Tastes differ widely, so hot pot is the best call: everyone \
                 picks their own broth and dishes.",
                RecommendationSource::RuleBased,
            )
            .with_dishes(vec![
                "Half-and-half broth".into(),
                "Sliced beef".into(),
                "Shrimp paste".into(),
                "Tripe".into(),
                "Vegetable platter".into(),
            ]),
        };

        rec.with_suitable_for(names.to_vec())
            .with_price_tier(avg_tier)
            .with_rating(4.5)
    }
}

#[derive(Debug, Deserialize)]
struct SynthesizedOutcome {
    venue_name: String,
    #[serde(default)]
    cuisine: Option<String>,
    #[serde(default)]
    rationale: Option<String>,
    #[serde(default)]
    dish_suggestions: Option<Vec<String>>,
    #[serde(default)]
    price_tier: Option<u8>,
}

fn average_price_tier(profiles: &[&TasteProfile]) -> PriceTier {
    if profiles.is_empty() {
        return PriceTier::Moderate;
    }
    let sum: u32 = profiles.iter().map(|p| p.price_tier.as_index() as u32).sum();
    let avg = (sum as f32 / profiles.len() as f32).round() as u8;
    PriceTier::from_index(avg)
}

/// Extract the outermost JSON object embedded in a text response.
///
/// Accepts surrounding prose, markdown fences, or nothing but the object.
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::place_lookup::LookupError;
    use crate::ports::text_generator::GenerationError;
    use async_trait::async_trait;
    use council_domain::{CuisinePreference, TasteVector, merge_profiles};

    struct FixedLookup(Option<Venue>);

    #[async_trait]
    impl PlaceLookup for FixedLookup {
        async fn lookup(&self, _query: &str, _city: &str) -> Result<Option<Venue>, LookupError> {
            Ok(self.0.clone())
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl PlaceLookup for FailingLookup {
        async fn lookup(&self, _query: &str, _city: &str) -> Result<Option<Venue>, LookupError> {
            Err(LookupError::Transport("connection refused".into()))
        }
    }

    struct FixedGenerator(Result<String, GenerationError>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _messages: &[Message]) -> Result<String, GenerationError> {
            self.0.clone()
        }
    }

    fn profile(cuisines: &[&str], tier: PriceTier) -> TasteProfile {
        TasteProfile::new(
            TasteVector::default(),
            cuisines.iter().map(|c| CuisinePreference::new(*c, 0.8)).collect(),
            tier,
        )
    }

    fn names() -> Vec<String> {
        vec!["Ming".to_string(), "Wei".to_string()]
    }

    #[tokio::test]
    async fn grounded_tier_wins_when_venue_found() {
        let venue = Venue {
            name: "Golden Chili".into(),
            address: "5 Spice St".into(),
            category: "Chinese restaurant;Sichuan".into(),
            rating: Some(4.7),
            avg_cost: Some(120.0),
            coordinates: None,
        };
        let resolver = RecommendationResolver::new(
            Arc::new(FixedLookup(Some(venue))),
            Arc::new(FixedGenerator(Err(GenerationError::Timeout))),
            "Beijing",
        );

        let p1 = profile(&["Sichuan"], PriceTier::Moderate);
        let p2 = profile(&["Sichuan"], PriceTier::Moderate);
        let profiles = vec![&p1, &p2];
        let merged = merge_profiles(&[p1.clone(), p2.clone()]);
        let rec = resolver.resolve(&names(), &profiles, &merged, &[]).await;

        assert_eq!(rec.source, RecommendationSource::Grounded);
        assert_eq!(rec.venue_name, "Golden Chili");
        assert_eq!(rec.cuisine, "Sichuan");
        assert_eq!(rec.price_tier, PriceTier::Upscale);
        assert!(rec.rationale.contains("Sichuan"));
        assert_eq!(rec.address.as_deref(), Some("5 Spice St"));
    }

    #[tokio::test]
    async fn synthesized_tier_parses_embedded_json() {
        let response = "Here's my pick:\n{\"venue_name\": \"Bamboo Grove\", \
                        \"cuisine\": \"Cantonese\", \"rationale\": \"light and shared\", \
                        \"dish_suggestions\": [\"har gow\"], \"price_tier\": 3}\nEnjoy!";
        let resolver = RecommendationResolver::new(
            Arc::new(FixedLookup(None)),
            Arc::new(FixedGenerator(Ok(response.to_string()))),
            "Beijing",
        );

        let p1 = profile(&["Cantonese"], PriceTier::Moderate);
        let profiles = vec![&p1];
        let merged = merge_profiles(std::slice::from_ref(&p1));
        let rec = resolver.resolve(&names(), &profiles, &merged, &[]).await;

        assert_eq!(rec.source, RecommendationSource::Synthesized);
        assert_eq!(rec.venue_name, "Bamboo Grove");
        assert_eq!(rec.price_tier, PriceTier::Upscale);
        assert_eq!(rec.dish_suggestions, vec!["har gow"]);
    }

    #[tokio::test]
    async fn unparseable_synthesis_falls_through_to_rules() {
        let resolver = RecommendationResolver::new(
            Arc::new(FixedLookup(None)),
            Arc::new(FixedGenerator(Ok("I'd just pick somewhere nice.".into()))),
            "Beijing",
        );

        let p1 = profile(&["Sichuan"], PriceTier::Moderate);
        let profiles = vec![&p1];
        let merged = merge_profiles(std::slice::from_ref(&p1));
        let rec = resolver.resolve(&names(), &profiles, &merged, &[]).await;

        assert_eq!(rec.source, RecommendationSource::RuleBased);
        assert_eq!(rec.venue_name, "Red Lantern Sichuan House");
    }

    #[tokio::test]
    async fn disjoint_tastes_yield_communal_format() {
        // Lookup errors and generation failures all the way down
        let resolver = RecommendationResolver::new(
            Arc::new(FailingLookup),
            Arc::new(FixedGenerator(Err(GenerationError::Quota("spent".into())))),
            "Beijing",
        );

        let p1 = profile(&["Sichuan"], PriceTier::Budget);
        let p2 = profile(&["Cantonese"], PriceTier::Moderate);
        let p3 = profile(&["Japanese"], PriceTier::Upscale);
        let profiles = vec![&p1, &p2, &p3];
        let merged = merge_profiles(&[p1.clone(), p2.clone(), p3.clone()]);
        assert!(merged.common_cuisines.is_empty());

        let rec = resolver.resolve(&names(), &profiles, &merged, &[]).await;

        assert_eq!(rec.source, RecommendationSource::RuleBased);
        assert_eq!(rec.venue_name, "Harbor Hot Pot");
        assert!(rec.rationale.contains("hot pot"));
        assert_eq!(rec.price_tier, PriceTier::Moderate);
    }

    #[tokio::test]
    async fn unlisted_common_cuisine_gets_generic_venue() {
        let resolver = RecommendationResolver::new(
            Arc::new(FixedLookup(None)),
            Arc::new(FixedGenerator(Err(GenerationError::Timeout))),
            "Beijing",
        );

        let p1 = profile(&["Japanese"], PriceTier::Premium);
        let profiles = vec![&p1];
        let merged = merge_profiles(std::slice::from_ref(&p1));
        let rec = resolver.resolve(&names(), &profiles, &merged, &[]).await;

        assert_eq!(rec.venue_name, "Japanese Kitchen");
        assert_eq!(rec.price_tier, PriceTier::Premium);
    }

    #[test]
    fn extract_json_variants() {
        assert!(extract_json("{\"a\": 1}").is_some());
        assert!(extract_json("prose {\"a\": 1} more prose").is_some());
        assert!(extract_json("```json\n{\"a\": 1}\n```").is_some());
        assert!(extract_json("no object here").is_none());
        assert!(extract_json("} backwards {").is_none());
    }
}
