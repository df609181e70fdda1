//! Scoring for outfit candidates

use std::cmp::Ordering;

use super::types::*;
use crate::domain::outfit::{Gender, OutfitRecord};

/// Weights for scoring components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Weather label equals the requested condition (default: 3.0)
    pub condition_exact: f64,
    /// One label contains the other (default: 1.0)
    pub condition_partial: f64,
    pub gender: f64,
    pub activity: f64,
    pub formality: f64,
    /// Bonus when the range midpoint is near the requested temperature (default: 0.5)
    pub temperature_proximity: f64,
    /// Max midpoint distance in °C that still earns the proximity bonus (default: 3.0)
    pub proximity_window_c: f64,
}

impl ScoringWeights {
    /// Highest score a single record can reach.
    pub fn max_score(&self) -> f64 {
        self.condition_exact.max(self.condition_partial)
            + self.gender
            + self.activity
            + self.formality
            + self.temperature_proximity
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

/// Score calculator for outfit candidates
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    weights: ScoringWeights,
}

impl ScoreCalculator {
    /// Create a new score calculator with default weights
    pub fn new() -> Self {
        Self { weights: ScoringWeights::default() }
    }

    /// Create with custom weights
    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Evaluate every criterion for one record.
    pub fn component_scores(
        &self,
        record: &OutfitRecord,
        request: &RecommendationRequest,
    ) -> ComponentScores {
        ComponentScores {
            condition: self.condition_score(record, &request.condition),
            gender: self.gender_score(record, &request.gender),
            activity: label_score(record.activity(), &request.activity, self.weights.activity),
            formality: label_score(record.formality(), &request.formality, self.weights.formality),
            temperature: self.temperature_score(record, request.temperature),
        }
    }

    /// Sum of the criterion contributions; never negative.
    pub fn calculate_total_score(&self, components: &ComponentScores) -> f64 {
        components.iter().map(|(_, score)| score.contribution()).sum::<f64>().max(0.0)
    }

    pub fn condition_score(&self, record: &OutfitRecord, condition: &str) -> CriterionScore {
        let wanted = condition.trim().to_lowercase();
        if wanted.is_empty() {
            return CriterionScore::Malformed("condition is blank");
        }

        let offered = record.weather().to_lowercase();
        if offered.is_empty() {
            return CriterionScore::Malformed("weather is blank");
        }

        if offered == wanted {
            CriterionScore::Hit(self.weights.condition_exact)
        } else if offered.contains(&wanted) || wanted.contains(&offered) {
            CriterionScore::Hit(self.weights.condition_partial)
        } else {
            CriterionScore::Miss
        }
    }

    /// Unisex rows satisfy any gender preference.
    pub fn gender_score(&self, record: &OutfitRecord, preference: &Preference) -> CriterionScore {
        let Some(wanted) = preference.as_constraint() else {
            return CriterionScore::Unconstrained;
        };

        if record.gender() == Gender::Unisex || record.gender().as_str().eq_ignore_ascii_case(wanted)
        {
            CriterionScore::Hit(self.weights.gender)
        } else {
            CriterionScore::Miss
        }
    }

    pub fn temperature_score(&self, record: &OutfitRecord, temperature: f64) -> CriterionScore {
        let distance = temperature_distance(record, temperature);
        if !distance.is_finite() {
            return CriterionScore::Malformed("temperature is not a finite number");
        }

        if distance <= self.weights.proximity_window_c {
            CriterionScore::Hit(self.weights.temperature_proximity)
        } else {
            CriterionScore::Miss
        }
    }

    /// Score and measure one record.
    pub fn score_candidate<'a>(
        &self,
        catalog_index: usize,
        record: &'a OutfitRecord,
        request: &RecommendationRequest,
    ) -> ScoredCandidate<'a> {
        let components = self.component_scores(record, request);
        ScoredCandidate {
            record,
            catalog_index,
            score: self.calculate_total_score(&components),
            components,
            temp_distance: temperature_distance(record, request.temperature),
        }
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn temperature_distance(record: &OutfitRecord, temperature: f64) -> f64 {
    (record.midpoint() - temperature).abs()
}

fn label_score(offered: &str, preference: &Preference, weight: f64) -> CriterionScore {
    let Some(wanted) = preference.as_constraint() else {
        return CriterionScore::Unconstrained;
    };
    if offered.is_empty() {
        return CriterionScore::Malformed("catalog label is blank");
    }

    if offered.to_lowercase() == wanted.to_lowercase() {
        CriterionScore::Hit(weight)
    } else {
        CriterionScore::Miss
    }
}

/// Ranking order: score descending, then temperature distance ascending,
/// then suggestion text, then catalog position.
pub(crate) fn rank_order(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.temp_distance.total_cmp(&b.temp_distance))
        .then_with(|| a.record.suggestion().cmp(b.record.suggestion()))
        .then_with(|| a.catalog_index.cmp(&b.catalog_index))
}
