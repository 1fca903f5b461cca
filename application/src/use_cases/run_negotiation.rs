//! Run Negotiation use case
//!
//! Drives the fixed-round turn protocol across all agents and synthesizes
//! the final recommendation.
//!
//! Ordering is the contract here: turns are produced strictly sequentially
//! in join order, and every turn is appended to the session log (which
//! notifies push subscribers) before the next `produce` call starts.

use crate::agent::{NegotiationAgent, TurnContext};
use crate::config::NegotiationSettings;
use crate::ports::transcript_log::{LogError, TranscriptLog};
use crate::use_cases::recommend::RecommendationResolver;
use council_domain::{InviteCode, LogEntry, Recommendation, TasteProfile, Turn, merge_profiles};
use std::time::Instant;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

/// Errors that abort a negotiation run before it starts
#[derive(Error, Debug)]
pub enum RunError {
    #[error("no agents to negotiate")]
    NoAgents,

    #[error("transcript log error: {0}")]
    Log(#[from] LogError),
}

/// One negotiation run over the ready agents of a session.
pub struct NegotiationRun {
    agents: Vec<NegotiationAgent>,
    settings: NegotiationSettings,
    transcript: Vec<Turn>,
    next_seq: u64,
}

impl NegotiationRun {
    pub fn new(agents: Vec<NegotiationAgent>, settings: NegotiationSettings) -> Self {
        Self {
            agents,
            settings,
            transcript: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Run the protocol to completion and synthesize the outcome.
    ///
    /// Solo sessions are a monologue: one opening turn plus R refinement
    /// turns. With two or more agents, the first agent (join order) opens,
    /// then every round is a fixed-order round-robin.
    ///
    /// The run never fails past the initial checks: a stubborn generation
    /// failure degrades one turn, and an expired overall deadline skips
    /// straight to synthesis.
    pub async fn run(
        &mut self,
        code: &InviteCode,
        log: &dyn TranscriptLog,
        resolver: &RecommendationResolver,
    ) -> Result<Recommendation, RunError> {
        if self.agents.is_empty() {
            return Err(RunError::NoAgents);
        }

        info!(
            session = %code,
            participants = self.agents.len(),
            rounds = self.settings.max_rounds,
            "starting negotiation"
        );

        let deadline = Instant::now() + self.settings.run_deadline();
        let max_rounds = self.settings.max_rounds;

        'protocol: {
            if Instant::now() >= deadline {
                break 'protocol;
            }
            self.take_turn(code, log, 0, 0, true).await?;

            for round in 1..=max_rounds {
                for idx in 0..self.agents.len() {
                    if Instant::now() >= deadline {
                        warn!(session = %code, round, "run deadline exceeded, forcing completion");
                        break 'protocol;
                    }
                    self.take_turn(code, log, round, idx, false).await?;
                }
            }
        }

        let recommendation = self.synthesize(resolver).await;
        if recommendation.source.is_fallback() {
            log.append(
                code,
                LogEntry::notice("Live venue lookup unavailable; using a fallback recommendation."),
            )
            .await?;
        }
        log.append(code, LogEntry::Recommendation(recommendation.clone()))
            .await?;

        info!(session = %code, turns = self.transcript.len(), "negotiation finished");
        Ok(recommendation)
    }

    /// Produce one turn under the per-turn timeout/retry policy and emit it.
    async fn take_turn(
        &mut self,
        code: &InviteCode,
        log: &dyn TranscriptLog,
        round: u32,
        idx: usize,
        is_opening: bool,
    ) -> Result<(), RunError> {
        let ctx = TurnContext {
            round,
            max_rounds: self.settings.max_rounds,
            seq: self.next_seq,
            transcript: &self.transcript,
            is_opening,
        };
        let agent = &mut self.agents[idx];

        let mut turn = None;
        for attempt in 0..=self.settings.turn_retries {
            match timeout(self.settings.turn_timeout(), agent.produce(ctx)).await {
                Ok(Ok(produced)) => {
                    turn = Some(produced);
                    break;
                }
                Ok(Err(e)) => {
                    warn!(
                        participant = agent.participant_id(),
                        round, attempt, error = %e,
                        "turn generation failed"
                    );
                }
                Err(_) => {
                    warn!(
                        participant = agent.participant_id(),
                        round, attempt, "turn generation timed out"
                    );
                }
            }
        }

        // A stalled agent never blocks the round: substitute a marked
        // placeholder and keep the in-round order intact.
        let turn = turn.unwrap_or_else(|| agent.placeholder_turn(&ctx));

        self.transcript.push(turn.clone());
        self.next_seq += 1;
        log.append(code, LogEntry::Turn(turn)).await?;
        Ok(())
    }

    async fn synthesize(&self, resolver: &RecommendationResolver) -> Recommendation {
        let names: Vec<String> = self
            .agents
            .iter()
            .map(|a| a.display_name().to_string())
            .collect();
        let owned: Vec<TasteProfile> = self.agents.iter().map(|a| a.profile().clone()).collect();
        let profiles: Vec<&TasteProfile> = owned.iter().collect();
        let merged = merge_profiles(&owned);

        resolver
            .resolve(&names, &profiles, &merged, &self.transcript)
            .await
    }
}
