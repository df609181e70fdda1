//! Types for the recommendation engine

use serde::{Deserialize, Serialize};

use crate::domain::outfit::OutfitRecord;

/// Optional user preference for a categorical field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Preference {
    /// Absent, blank, or the `any` sentinel
    #[default]
    Any,
    Exactly(String),
}

impl Preference {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => Preference::Any,
            Some(value) if value.is_empty() || value.eq_ignore_ascii_case(super::ANY_PREFERENCE) => {
                Preference::Any
            }
            Some(value) => Preference::Exactly(value.to_owned()),
        }
    }

    pub fn as_constraint(&self) -> Option<&str> {
        match self {
            Preference::Any => None,
            Preference::Exactly(value) => Some(value.as_str()),
        }
    }
}

impl From<Option<String>> for Preference {
    fn from(value: Option<String>) -> Self {
        Self::parse(value.as_deref())
    }
}

impl From<&str> for Preference {
    fn from(value: &str) -> Self {
        Self::parse(Some(value))
    }
}

/// Request for outfit recommendations
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    /// Observed temperature in °C
    pub temperature: f64,
    /// Weather category, matched case-insensitively against the catalog
    pub condition: String,
    /// Season label overriding the clock-derived season
    pub season: Option<String>,
    pub gender: Preference,
    pub activity: Preference,
    pub formality: Preference,
    /// Maximum number of suggestions to return
    pub top_k: usize,
}

impl RecommendationRequest {
    pub fn new(temperature: f64, condition: impl Into<String>) -> Self {
        Self {
            temperature,
            condition: condition.into(),
            season: None,
            gender: Preference::Any,
            activity: Preference::Any,
            formality: Preference::Any,
            top_k: super::DEFAULT_TOP_K,
        }
    }

    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        let season = season.into();
        self.season = (!season.trim().is_empty()).then(|| season.trim().to_owned());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<Preference>) -> Self {
        self.gender = gender.into();
        self
    }

    pub fn with_activity(mut self, activity: impl Into<Preference>) -> Self {
        self.activity = activity.into();
        self
    }

    pub fn with_formality(mut self, formality: impl Into<Preference>) -> Self {
        self.formality = formality.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// Outcome of one scoring criterion.
///
/// A malformed input only zeroes its own criterion; the other criteria still count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CriterionScore {
    /// The request does not constrain this criterion
    Unconstrained,
    Hit(f64),
    Miss,
    Malformed(&'static str),
}

impl CriterionScore {
    pub fn contribution(&self) -> f64 {
        match self {
            CriterionScore::Hit(weight) => *weight,
            CriterionScore::Unconstrained | CriterionScore::Miss | CriterionScore::Malformed(_) => {
                0.0
            }
        }
    }
}

/// Individual scoring components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScores {
    pub condition: CriterionScore,
    pub gender: CriterionScore,
    pub activity: CriterionScore,
    pub formality: CriterionScore,
    pub temperature: CriterionScore,
}

impl ComponentScores {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, CriterionScore)> {
        [
            ("condition", self.condition),
            ("gender", self.gender),
            ("activity", self.activity),
            ("formality", self.formality),
            ("temperature", self.temperature),
        ]
        .into_iter()
    }
}

/// A catalog row together with its ranking keys.
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub record: &'a OutfitRecord,
    /// Position in the catalog, used as the last tie-breaker
    pub catalog_index: usize,
    pub components: ComponentScores,
    pub score: f64,
    /// |range midpoint - requested temperature|
    pub temp_distance: f64,
}

impl<'a> ScoredCandidate<'a> {
    pub fn dedup_key(&self) -> (&'a str, &'a str, &'a str) {
        (self.record.suggestion(), self.record.formality(), self.record.activity())
    }
}

/// A ranked outfit suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub weather: String,
    /// Display range, e.g. `15–25°C`
    pub temp_range: String,
    pub gender: String,
    pub activity: String,
    pub season: String,
    pub formality: String,
    pub suggestion: String,
    pub score: f64,
}

impl From<&ScoredCandidate<'_>> for Recommendation {
    fn from(candidate: &ScoredCandidate<'_>) -> Self {
        let record = candidate.record;
        Self {
            weather: record.weather().to_owned(),
            temp_range: record.temp_range(),
            gender: record.gender().to_string(),
            activity: record.activity().to_owned(),
            season: record.season().to_string(),
            formality: record.formality().to_owned(),
            suggestion: record.suggestion().to_owned(),
            score: candidate.score,
        }
    }
}

/// Recommendations plus how they were derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationOutcome {
    /// Season label the primary filter used
    pub season: String,
    /// True when no row matched season and temperature together
    pub season_relaxed: bool,
    /// Rows that passed filtering, before deduplication
    pub candidates: usize,
    pub recommendations: Vec<Recommendation>,
}

impl RecommendationOutcome {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}
