//! Text generation port
//!
//! Defines the interface for the external text-generation collaborator that
//! agents and the synthesis tier speak through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a message in a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Errors from the text-generation collaborator.
///
/// These are always absorbed by a retry or fallback policy upstream; they
/// never reach an end observer raw.
#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    #[error("generation timed out")]
    Timeout,

    #[error("quota exhausted: {0}")]
    Quota(String),

    #[error("malformed output: {0}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Gateway to the text-generation collaborator
///
/// One call produces one completion for the given conversation. Callers own
/// timeout and retry policy.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, messages: &[Message]) -> Result<String, GenerationError>;
}
