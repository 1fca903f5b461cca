//! Taste profiles and profile merging.

pub mod entities;
pub mod merge;

pub use entities::{CuisinePreference, PriceTier, TasteProfile, TasteVector};
pub use merge::{MergedSignal, merge_profiles};
