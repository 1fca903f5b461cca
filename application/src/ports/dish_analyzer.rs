//! Dish analysis port
//!
//! Interface to the profile-extraction collaborator: free-text dish lists
//! in, structured taste profiles out.

use async_trait::async_trait;
use council_domain::TasteProfile;
use thiserror::Error;

/// Errors from profile extraction.
///
/// Both variants mean "profile submission failed" and are surfaced only to
/// the submitting participant; the room is never mutated.
#[derive(Error, Debug, Clone)]
pub enum AnalysisError {
    #[error("dish list is empty")]
    EmptyInput,

    #[error("analysis collaborator failed: {0}")]
    Upstream(String),
}

/// Profile-extraction collaborator
#[async_trait]
pub trait DishAnalyzer: Send + Sync {
    /// Analyze a participant's free-text dish list into a taste profile.
    ///
    /// Implementations must reject an empty list with
    /// [`AnalysisError::EmptyInput`] before any upstream call.
    async fn analyze(
        &self,
        participant_id: &str,
        dishes: &[String],
    ) -> Result<TasteProfile, AnalysisError>;
}
