//! Runtime settings for negotiation runs and delivery.
//!
//! Plain value types with defaults; the infrastructure config loader
//! produces these from file/env sources.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for one negotiation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationSettings {
    /// Rounds after the opening turn (R in the protocol)
    pub max_rounds: u32,
    /// Bound on a single `produce` call
    pub turn_timeout_secs: u64,
    /// Retries per turn before substituting a degraded placeholder
    pub turn_retries: u32,
    /// Overall budget for a run; past it, synthesis runs immediately
    pub run_deadline_secs: u64,
    /// Upper bound on participants per room
    pub max_participants: usize,
    /// Messages kept in one agent's memory (system prompt excluded)
    pub memory_cap: usize,
    /// City passed to the place-lookup collaborator
    pub city: String,
}

impl Default for NegotiationSettings {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            turn_timeout_secs: 30,
            turn_retries: 2,
            run_deadline_secs: 300,
            max_participants: 8,
            memory_cap: 24,
            city: "Beijing".to_string(),
        }
    }
}

impl NegotiationSettings {
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }

    pub fn run_deadline(&self) -> Duration {
        Duration::from_secs(self.run_deadline_secs)
    }
}

/// Tunables for transcript delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverySettings {
    /// Idle interval after which the push feed emits a heartbeat frame
    pub heartbeat_secs: u64,
    /// How long finished or stalled sessions stay readable
    pub session_ttl_secs: u64,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            heartbeat_secs: 10,
            session_ttl_secs: 3600,
        }
    }
}

impl DeliverySettings {
    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }

    pub fn session_ttl_ms(&self) -> u64 {
        self.session_ttl_secs * 1000
    }
}
