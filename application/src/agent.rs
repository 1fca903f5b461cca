//! Negotiation agent
//!
//! One stateful agent per participant. An agent wraps its participant's
//! taste profile plus a private memory of (prompt, response) exchanges, and
//! produces exactly one turn per invocation.

use crate::ports::text_generator::{GenerationError, Message, TextGenerator};
use council_domain::{NegotiationPrompt, TasteProfile, Turn, TurnKind, util::truncate_str};
use std::sync::Arc;
use tracing::debug;

/// Where an agent is in its produce cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
    Idle,
    AwaitingGeneration,
    Produced,
}

/// Context handed to an agent for one turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub round: u32,
    pub max_rounds: u32,
    /// Sequence number the produced turn will occupy
    pub seq: u64,
    /// Full transcript so far, production order
    pub transcript: &'a [Turn],
    pub is_opening: bool,
}

/// A participant's negotiation agent.
///
/// Memory grows with every exchange and is capped defensively: the system
/// prompt is always kept, oldest exchanges are evicted past `memory_cap`.
pub struct NegotiationAgent {
    participant_id: String,
    display_name: String,
    agent_label: String,
    profile: TasteProfile,
    generator: Arc<dyn TextGenerator>,
    memory: Vec<Message>,
    memory_cap: usize,
    phase: AgentPhase,
}

impl NegotiationAgent {
    pub fn new(
        participant_id: impl Into<String>,
        display_name: impl Into<String>,
        profile: TasteProfile,
        generator: Arc<dyn TextGenerator>,
        memory_cap: usize,
    ) -> Self {
        let participant_id = participant_id.into();
        let display_name = display_name.into();
        let agent_label = NegotiationPrompt::agent_label(&display_name);
        let memory = vec![Message::system(NegotiationPrompt::system_prompt(
            &display_name,
            &profile,
        ))];

        Self {
            participant_id,
            display_name,
            agent_label,
            profile,
            generator,
            memory,
            memory_cap,
            phase: AgentPhase::Idle,
        }
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn agent_label(&self) -> &str {
        &self.agent_label
    }

    pub fn profile(&self) -> &TasteProfile {
        &self.profile
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    /// Number of messages currently held in memory (system prompt included).
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Produce one turn for the given context.
    ///
    /// Generation failures propagate typed; the caller owns retry and
    /// placeholder policy. On failure the prompt stays in memory so a retry
    /// re-asks the same question without rebuilding context.
    pub async fn produce(&mut self, ctx: TurnContext<'_>) -> Result<Turn, GenerationError> {
        let prompt = self.build_prompt(&ctx);
        debug!(
            participant = %self.participant_id,
            round = ctx.round,
            "agent producing turn"
        );

        // Re-asking after a failed attempt replaces the pending prompt
        // instead of stacking a second copy.
        if self.phase == AgentPhase::AwaitingGeneration {
            self.memory.pop();
        }
        self.memory.push(Message::user(prompt));
        self.phase = AgentPhase::AwaitingGeneration;

        let response = self.generator.generate(&self.memory).await?;
        debug!(
            participant = %self.participant_id,
            preview = truncate_str(&response, 80),
            "turn generated"
        );

        self.memory.push(Message::assistant(response.clone()));
        self.trim_memory();
        self.phase = AgentPhase::Produced;

        Ok(Turn::new(
            ctx.seq,
            &self.participant_id,
            &self.display_name,
            &self.agent_label,
            response,
            TurnKind::for_round(ctx.round, ctx.max_rounds),
        ))
    }

    /// Neutral placeholder used when generation attempts are exhausted.
    pub fn placeholder_turn(&mut self, ctx: &TurnContext<'_>) -> Turn {
        // Abandon the pending prompt; the placeholder is not a response.
        if self.phase == AgentPhase::AwaitingGeneration {
            self.memory.pop();
        }
        self.phase = AgentPhase::Produced;
        Turn::new(
            ctx.seq,
            &self.participant_id,
            &self.display_name,
            &self.agent_label,
            format!(
                "{} is thinking it over and will go along with the group.",
                self.display_name
            ),
            TurnKind::for_round(ctx.round, ctx.max_rounds),
        )
        .degraded()
    }

    fn build_prompt(&self, ctx: &TurnContext<'_>) -> String {
        if ctx.is_opening {
            return NegotiationPrompt::opening_prompt().to_string();
        }

        // Everything other agents said since this agent's own last turn --
        // the full delta, not a bounded window.
        let last_own = ctx
            .transcript
            .iter()
            .rposition(|t| t.participant_id == self.participant_id);
        let delta: Vec<(String, String)> = ctx
            .transcript
            .iter()
            .skip(last_own.map_or(0, |i| i + 1))
            .filter(|t| t.participant_id != self.participant_id)
            .map(|t| (t.display_name.clone(), t.text.clone()))
            .collect();

        if delta.is_empty() {
            NegotiationPrompt::refine_prompt().to_string()
        } else {
            NegotiationPrompt::respond_prompt(&delta)
        }
    }

    fn trim_memory(&mut self) {
        // memory[0] is the system prompt and always survives
        let overflow = self.memory.len().saturating_sub(self.memory_cap + 1);
        if overflow > 0 {
            self.memory.drain(1..1 + overflow);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use council_domain::{PriceTier, TasteVector};
    use std::sync::Mutex;

    struct ScriptedGenerator {
        responses: Mutex<Vec<Result<String, GenerationError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn seen_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, messages: &[Message]) -> Result<String, GenerationError> {
            self.prompts
                .lock()
                .unwrap()
                .push(messages.last().unwrap().content.clone());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok("okay".to_string())
            } else {
                responses.remove(0)
            }
        }
    }

    fn profile() -> TasteProfile {
        TasteProfile::new(TasteVector::default(), vec![], PriceTier::Moderate)
    }

    fn agent_with(generator: Arc<ScriptedGenerator>) -> NegotiationAgent {
        NegotiationAgent::new("p1", "Ming", profile(), generator, 24)
    }

    #[tokio::test]
    async fn opening_turn_uses_opening_prompt() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok("I love spicy food".into())]));
        let mut agent = agent_with(Arc::clone(&generator));

        let turn = agent
            .produce(TurnContext {
                round: 0,
                max_rounds: 5,
                seq: 0,
                transcript: &[],
                is_opening: true,
            })
            .await
            .unwrap();

        assert_eq!(turn.kind, TurnKind::Opening);
        assert_eq!(turn.text, "I love spicy food");
        assert_eq!(agent.phase(), AgentPhase::Produced);
        assert!(generator.seen_prompts()[0].contains("introduce"));
    }

    #[tokio::test]
    async fn respond_prompt_carries_delta_of_others_only() {
        let generator = Arc::new(ScriptedGenerator::new(vec![]));
        let mut agent = agent_with(Arc::clone(&generator));

        let transcript = vec![
            Turn::new(0, "p1", "Ming", "g", "my opener", TurnKind::Opening),
            Turn::new(1, "p2", "Wei", "g", "dim sum for me", TurnKind::Proposal),
            Turn::new(2, "p3", "Jun", "g", "sushi please", TurnKind::Proposal),
        ];
        agent
            .produce(TurnContext {
                round: 1,
                max_rounds: 5,
                seq: 3,
                transcript: &transcript,
                is_opening: false,
            })
            .await
            .unwrap();

        let prompt = &generator.seen_prompts()[0];
        assert!(prompt.contains("Wei: dim sum for me"));
        assert!(prompt.contains("Jun: sushi please"));
        assert!(!prompt.contains("my opener"));
    }

    #[tokio::test]
    async fn solo_transcript_falls_back_to_refine_prompt() {
        let generator = Arc::new(ScriptedGenerator::new(vec![]));
        let mut agent = agent_with(Arc::clone(&generator));

        let transcript = vec![Turn::new(0, "p1", "Ming", "g", "opener", TurnKind::Opening)];
        agent
            .produce(TurnContext {
                round: 1,
                max_rounds: 5,
                seq: 1,
                transcript: &transcript,
                is_opening: false,
            })
            .await
            .unwrap();

        assert!(generator.seen_prompts()[0].contains("refine"));
    }

    #[tokio::test]
    async fn failure_propagates_and_retry_does_not_stack_prompts() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Err(GenerationError::Timeout),
            Ok("second try".into()),
        ]));
        let mut agent = agent_with(Arc::clone(&generator));
        let ctx = TurnContext {
            round: 1,
            max_rounds: 5,
            seq: 1,
            transcript: &[],
            is_opening: false,
        };

        assert!(agent.produce(ctx).await.is_err());
        assert_eq!(agent.phase(), AgentPhase::AwaitingGeneration);

        let turn = agent.produce(ctx).await.unwrap();
        assert_eq!(turn.text, "second try");
        // system + 1 user + 1 assistant: the failed prompt was replaced
        assert_eq!(agent.memory_len(), 3);
    }

    #[tokio::test]
    async fn memory_is_capped() {
        let generator = Arc::new(ScriptedGenerator::new(vec![]));
        let mut agent = NegotiationAgent::new("p1", "Ming", profile(), generator, 4);

        for seq in 0..10u64 {
            agent
                .produce(TurnContext {
                    round: 1,
                    max_rounds: 5,
                    seq,
                    transcript: &[],
                    is_opening: false,
                })
                .await
                .unwrap();
        }

        // system prompt + at most memory_cap messages
        assert!(agent.memory_len() <= 5);
    }

    #[test]
    fn placeholder_is_marked_degraded() {
        let generator = Arc::new(ScriptedGenerator::new(vec![]));
        let mut agent = agent_with(generator);
        let ctx = TurnContext {
            round: 5,
            max_rounds: 5,
            seq: 9,
            transcript: &[],
            is_opening: false,
        };

        let turn = agent.placeholder_turn(&ctx);
        assert!(turn.degraded);
        assert_eq!(turn.kind, TurnKind::Closing);
        assert!(turn.text.contains("Ming"));
    }
}
