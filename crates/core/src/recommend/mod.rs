//! Outfit recommendation engine
//!
//! Filters the catalog by season and temperature (relaxing the season when
//! nothing fits), scores each surviving row against the request, then ranks,
//! deduplicates and truncates to the requested count.

mod engine;
mod scoring;
mod service;
mod types;

pub use engine::RecommendationEngine;
pub use scoring::{ScoreCalculator, ScoringWeights};
pub use service::RecommendationService;
pub use types::*;

/// Default scoring weights
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    condition_exact: 3.0,
    condition_partial: 1.0,
    gender: 1.0,
    activity: 1.0,
    formality: 1.0,
    temperature_proximity: 0.5,
    proximity_window_c: 3.0,
};

/// Suggestions returned when the caller does not ask for a count
pub const DEFAULT_TOP_K: usize = 3;

/// Sentinel preference value meaning "no constraint"
pub const ANY_PREFERENCE: &str = "any";
