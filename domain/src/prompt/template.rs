//! Prompt templates for the negotiation flow

use crate::taste::entities::TasteProfile;

/// Templates for generating agent prompts at each stage
pub struct NegotiationPrompt;

impl NegotiationPrompt {
    /// Name an agent speaks under on behalf of a participant.
    pub fn agent_label(display_name: &str) -> String {
        format!("{}'s dining guide", display_name)
    }

    /// Short personality line derived from a profile, used in the system
    /// prompt so each agent argues in character.
    pub fn persona_line(profile: &TasteProfile) -> String {
        let mut traits: Vec<&str> = Vec::new();
        if profile.vector.spice > 0.6 {
            traits.push("hot-food lover");
        }
        if profile.vector.sweetness > 0.6 {
            traits.push("sweet tooth");
        }
        if profile.price_tier.as_index() <= 2 {
            traits.push("value seeker");
        } else {
            traits.push("quality seeker");
        }

        let cuisines: Vec<&str> = profile.cuisine_names().take(2).collect();
        if cuisines.is_empty() {
            traits.join(", ")
        } else {
            format!("{}, partial to {}", traits.join(", "), cuisines.join(" and "))
        }
    }

    /// System prompt establishing the agent's identity and ground rules.
    ///
    /// Free-text supplement on the profile, when present, takes precedence
    /// over the dish-derived signals.
    pub fn system_prompt(display_name: &str, profile: &TasteProfile) -> String {
        let mut prompt = format!(
            "You are {label}, speaking for {name} in a group discussion about \
             where to eat today.\n\n",
            label = Self::agent_label(display_name),
            name = display_name,
        );

        if let Some(supplement) = profile.supplement.as_deref().filter(|s| !s.trim().is_empty()) {
            prompt.push_str("What they told you about their tastes:\n");
            prompt.push_str(supplement.trim());
            prompt.push('\n');
        } else {
            let cuisines: Vec<&str> = profile.cuisine_names().take(3).collect();
            let ingredients: Vec<&str> =
                profile.ingredients.iter().map(String::as_str).take(5).collect();

            prompt.push_str(&format!(
                "Their taste profile (derived from dishes they like):\n\
                 - Favorite cuisines: {}\n\
                 - Character: {}\n\
                 - Budget: {}\n\
                 - Favorite ingredients: {}\n",
                if cuisines.is_empty() {
                    "no strong preference".to_string()
                } else {
                    cuisines.join(", ")
                },
                Self::persona_line(profile),
                profile.price_tier.description(),
                if ingredients.is_empty() {
                    "anything".to_string()
                } else {
                    ingredients.join(", ")
                },
            ));
        }

        prompt.push_str(
            "\nDiscussion rules:\n\
             1. Speak in the first person (\"I think…\", \"I'd suggest…\")\n\
             2. Argue from the tastes above\n\
             3. Respect the others and look for common ground\n\
             4. Keep each contribution to one or two sentences\n\
             5. When opinions differ, offer a compromise\n",
        );

        prompt
    }

    /// Prompt for the single opening turn.
    pub fn opening_prompt() -> &'static str {
        "The discussion about today's meal starts now. Briefly introduce your \
         taste preferences and put one suggestion on the table."
    }

    /// Prompt shown with the other agents' utterances since this agent's
    /// own last turn.
    pub fn respond_prompt(delta: &[(String, String)]) -> String {
        let mut prompt = String::from("What the others said since your last turn:\n");
        for (name, text) in delta {
            prompt.push_str(&format!("{}: {}\n", name, text));
        }
        prompt.push_str(
            "\nRespond to them and state your view in one or two sentences; \
             move toward a shared choice if you can.",
        );
        prompt
    }

    /// Prompt for a solo session refining its own position.
    pub fn refine_prompt() -> &'static str {
        "Building on what you said before, refine your suggestion in one or \
         two sentences."
    }

    /// Prompt asking the text collaborator for a structured recommendation.
    pub fn recommendation_prompt(
        transcript: &[(String, String)],
        common_cuisines: &[String],
        ingredients: &[String],
    ) -> String {
        let mut prompt = String::from(
            "Based on the following discussion, recommend one restaurant.\n\n\
             Discussion:\n",
        );
        for (name, text) in transcript {
            prompt.push_str(&format!("{}: {}\n", name, text));
        }

        prompt.push_str(&format!(
            "\nShared preferences:\n\
             - Cuisines: {}\n\
             - Ingredients: {}\n",
            if common_cuisines.is_empty() {
                "no clear common preference".to_string()
            } else {
                common_cuisines.join(", ")
            },
            ingredients
                .iter()
                .take(5)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ));

        prompt.push_str(
            r#"
Reply with a JSON object and nothing else:
{
  "venue_name": "restaurant name",
  "cuisine": "cuisine",
  "rationale": "one or two sentences",
  "dish_suggestions": ["dish 1", "dish 2", "dish 3"],
  "price_tier": 2
}"#,
        );

        prompt
    }
}
