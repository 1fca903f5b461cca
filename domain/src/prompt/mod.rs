//! Prompt construction for negotiation agents.

pub mod template;

pub use template::NegotiationPrompt;
