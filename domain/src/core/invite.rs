//! Invite code value object
//!
//! Rooms are keyed by a six-digit invite code that participants type in to
//! join. Codes are reusable identifiers: once a session completes, the same
//! code names a brand-new session.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Number of digits in an invite code
pub const INVITE_CODE_LEN: usize = 6;

/// A validated six-digit invite code (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InviteCode(String);

impl InviteCode {
    /// Parse and validate an invite code.
    ///
    /// Accepts exactly six ASCII digits, rejecting everything else before
    /// any session state is touched.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.len() != INVITE_CODE_LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidInviteCode(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derive a code from a numeric seed (always valid).
    ///
    /// Used by callers that want a fresh code without carrying their own
    /// formatting logic; the seed is folded into the six-digit space.
    pub fn from_seed(seed: u64) -> Self {
        Self(format!("{:06}", 100_000 + seed % 900_000))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InviteCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for InviteCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
