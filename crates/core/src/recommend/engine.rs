//! Recommendation pipeline implementation

use std::collections::HashSet;

use tracing::debug;

use super::scoring::{rank_order, ScoreCalculator, ScoringWeights};
use super::types::*;
use crate::catalog::Catalog;
use crate::domain::outfit::OutfitRecord;
use crate::domain::season::SeasonClock;

/// The recommendation pipeline. Stateless apart from its scoring weights.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    calculator: ScoreCalculator,
}

impl RecommendationEngine {
    /// Create a new engine with default weights
    pub fn new() -> Self {
        Self { calculator: ScoreCalculator::new() }
    }

    /// Create with custom weights
    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { calculator: ScoreCalculator::with_weights(weights) }
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    /// Rank the catalog for `request`.
    ///
    /// The request's season override wins; `clock` is consulted only when
    /// there is none.
    pub fn recommend<C: SeasonClock + ?Sized>(
        &self,
        catalog: &Catalog,
        request: &RecommendationRequest,
        clock: &C,
    ) -> RecommendationOutcome {
        let season = match request.season.as_deref() {
            Some(season) => season.trim().to_owned(),
            None => clock.current_season().as_str().to_owned(),
        };
        let (candidates, season_relaxed) = self.filter_candidates(catalog, request, &season);

        let mut scored = candidates
            .into_iter()
            .map(|(index, record)| self.calculator.score_candidate(index, record, request))
            .collect::<Vec<_>>();
        let candidate_count = scored.len();
        scored.sort_by(rank_order);

        let recommendations = select_unique(&scored, request.top_k.max(1))
            .into_iter()
            .map(Recommendation::from)
            .collect::<Vec<_>>();

        debug!(
            event_name = "recommend.ranked",
            season = %season,
            season_relaxed,
            candidates = candidate_count,
            returned = recommendations.len(),
            "recommendations ranked"
        );

        RecommendationOutcome {
            season,
            season_relaxed,
            candidates: candidate_count,
            recommendations,
        }
    }

    /// Season and temperature filter, falling back to temperature alone over
    /// the whole catalog when the strict filter leaves nothing.
    fn filter_candidates<'a>(
        &self,
        catalog: &'a Catalog,
        request: &RecommendationRequest,
        season: &str,
    ) -> (Vec<(usize, &'a OutfitRecord)>, bool) {
        let in_range = |record: &OutfitRecord| record.contains_temperature(request.temperature);

        let primary = catalog
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| record.season().matches_label(season) && in_range(*record))
            .collect::<Vec<_>>();
        if !primary.is_empty() {
            return (primary, false);
        }

        let relaxed = catalog
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| in_range(*record))
            .collect::<Vec<_>>();

        debug!(
            event_name = "recommend.season_relaxed",
            season = %season,
            temperature = request.temperature,
            matches = relaxed.len(),
            "no row matched season and temperature; dropped the season filter"
        );

        (relaxed, true)
    }
}

/// Walk ranked candidates, keeping the first of each
/// (suggestion, formality, activity) key until `limit` are collected.
fn select_unique<'s, 'a>(
    ranked: &'s [ScoredCandidate<'a>],
    limit: usize,
) -> Vec<&'s ScoredCandidate<'a>> {
    let mut seen = HashSet::new();
    ranked.iter().filter(|candidate| seen.insert(candidate.dedup_key())).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outfit::OutfitFields;
    use crate::domain::season::{FixedSeasonClock, Season};

    struct Row {
        weather: &'static str,
        min: f64,
        max: f64,
        gender: &'static str,
        activity: &'static str,
        season: &'static str,
        formality: &'static str,
        suggestion: &'static str,
    }

    fn catalog(rows: &[Row]) -> Catalog {
        Catalog::new(
            rows.iter()
                .map(|row| {
                    OutfitRecord::new(OutfitFields {
                        weather: row.weather.to_owned(),
                        min_temp: row.min,
                        max_temp: row.max,
                        gender: row.gender.to_owned(),
                        activity: row.activity.to_owned(),
                        season: row.season.to_owned(),
                        formality: row.formality.to_owned(),
                        suggestion: row.suggestion.to_owned(),
                    })
                    .expect("valid test row")
                })
                .collect(),
        )
    }

    fn row(weather: &'static str, min: f64, max: f64, suggestion: &'static str) -> Row {
        Row {
            weather,
            min,
            max,
            gender: "unisex",
            activity: "casual",
            season: "summer",
            formality: "casual",
            suggestion,
        }
    }

    #[test]
    fn sample_catalog_end_to_end() {
        let engine = RecommendationEngine::new();
        let request = RecommendationRequest::new(22.0, "Clear")
            .with_season("summer")
            .with_gender("any")
            .with_activity("any")
            .with_formality("any");

        let catalog = Catalog::sample().expect("sample seeds are valid");
        let outcome = engine.recommend(&catalog, &request, &FixedSeasonClock(Season::Winter));

        assert_eq!(outcome.season, "summer");
        assert!(!outcome.season_relaxed);
        assert!(outcome.recommendations.iter().all(|item| item.temp_range != "30–45°C"));

        let clouds = outcome
            .recommendations
            .iter()
            .find(|item| item.weather == "Clouds")
            .expect("clouds row should be recommended");
        assert_eq!(clouds.temp_range, "15–25°C");
        assert_eq!(clouds.gender, "male");
        assert_eq!(clouds.score, 0.5);

        // Thunderstorm 20–30 (center 25, distance 3) also earns the bonus but
        // is farther from 22 than Clouds (distance 2).
        assert_eq!(outcome.recommendations[0].weather, "Clouds");
        assert_eq!(outcome.recommendations[1].weather, "Thunderstorm");
        assert_eq!(outcome.recommendations.len(), 2);
    }

    #[test]
    fn season_relaxation_fires_when_only_other_seasons_fit() {
        let engine = RecommendationEngine::new();
        let request = RecommendationRequest::new(-10.0, "Snow").with_season("summer");

        let catalog = Catalog::sample().expect("sample seeds are valid");
        let outcome = engine.recommend(&catalog, &request, &FixedSeasonClock(Season::Summer));

        assert!(outcome.season_relaxed);
        assert_eq!(outcome.recommendations.len(), 1);
        assert_eq!(outcome.recommendations[0].season, "winter");
        assert_eq!(outcome.recommendations[0].score, 3.0);
    }

    #[test]
    fn relaxation_rescans_whole_catalog() {
        let engine = RecommendationEngine::new();
        let rows = catalog(&[
            Row { season: "winter", ..row("Snow", -20.0, -5.0, "Parka") },
            Row { season: "summer", ..row("Clear", 25.0, 35.0, "Shorts") },
            Row { season: "autumn", ..row("Rain", -8.0, 2.0, "Waterproof boots") },
        ]);
        let request = RecommendationRequest::new(-6.0, "Snow").with_season("summer");

        let outcome = engine.recommend(&rows, &request, &FixedSeasonClock(Season::Summer));

        let suggestions =
            outcome.recommendations.iter().map(|item| item.suggestion.as_str()).collect::<Vec<_>>();
        assert_eq!(suggestions, vec!["Parka", "Waterproof boots"]);
    }

    #[test]
    fn no_range_match_returns_empty() {
        let engine = RecommendationEngine::new();
        let request = RecommendationRequest::new(1000.0, "Clear");

        let catalog = Catalog::sample().expect("sample seeds are valid");
        let outcome = engine.recommend(&catalog, &request, &FixedSeasonClock(Season::Summer));

        assert!(outcome.is_empty());
        assert!(outcome.season_relaxed);
        assert_eq!(outcome.candidates, 0);
    }

    #[test]
    fn results_are_deduplicated_by_suggestion_formality_activity() {
        let engine = RecommendationEngine::new();
        let rows = catalog(&[
            row("Clear", 10.0, 30.0, "Light layers"),
            row("Clouds", 10.0, 30.0, "Light layers"),
            Row { formality: "formal", ..row("Clouds", 10.0, 30.0, "Light layers") },
            row("Rain", 10.0, 30.0, "Umbrella"),
        ]);
        let request = RecommendationRequest::new(20.0, "Clear").with_top_k(10);

        let outcome = engine.recommend(&rows, &request, &FixedSeasonClock(Season::Summer));

        assert_eq!(outcome.candidates, 4);
        assert_eq!(outcome.recommendations.len(), 3);
        // The Clear row scores highest, so it is the surviving "Light layers/casual".
        assert_eq!(outcome.recommendations[0].weather, "Clear");
        let keys = outcome
            .recommendations
            .iter()
            .map(|item| (&item.suggestion, &item.formality, &item.activity))
            .collect::<HashSet<_>>();
        assert_eq!(keys.len(), outcome.recommendations.len());
    }

    #[test]
    fn top_k_bounds_result_and_zero_is_clamped_to_one() {
        let engine = RecommendationEngine::new();
        let rows = catalog(&[
            row("Clear", 0.0, 40.0, "A"),
            row("Clear", 0.0, 40.0, "B"),
            row("Clear", 0.0, 40.0, "C"),
            row("Clear", 0.0, 40.0, "D"),
        ]);

        let summer = FixedSeasonClock(Season::Summer);

        let default_k = engine.recommend(&rows, &RecommendationRequest::new(20.0, "Clear"), &summer);
        let zero_k =
            engine.recommend(&rows, &RecommendationRequest::new(20.0, "Clear").with_top_k(0), &summer);

        assert_eq!(default_k.recommendations.len(), 3);
        assert_eq!(zero_k.recommendations.len(), 1);
    }

    #[test]
    fn ties_break_on_distance_then_suggestion_text() {
        let engine = RecommendationEngine::new();
        let rows = catalog(&[
            row("Clear", 20.0, 34.0, "Zip hoodie"),
            row("Clear", 20.0, 34.0, "Anorak"),
            row("Clear", 22.0, 30.0, "Windbreaker"),
        ]);
        let request = RecommendationRequest::new(26.0, "Clear").with_top_k(3);

        let outcome = engine.recommend(&rows, &request, &FixedSeasonClock(Season::Summer));

        let suggestions =
            outcome.recommendations.iter().map(|item| item.suggestion.as_str()).collect::<Vec<_>>();
        assert_eq!(suggestions, vec!["Windbreaker", "Anorak", "Zip hoodie"]);
    }

    #[test]
    fn ordering_and_containment_hold_for_ranked_candidates() {
        let engine = RecommendationEngine::new();
        let rows = catalog(&[
            row("Rain", 0.0, 12.0, "Raincoat"),
            Row { gender: "female", ..row("Light Rain", 5.0, 9.0, "Trench coat") },
            Row { activity: "travel", ..row("Clouds", 4.0, 20.0, "Fleece") },
            Row { season: "winter", ..row("Rain", 6.0, 8.0, "Wool coat") },
            row("Clear", 8.0, 30.0, "Sweater"),
        ]);
        let request = RecommendationRequest::new(8.0, "rain")
            .with_gender("female")
            .with_activity("travel")
            .with_top_k(5);

        let outcome = engine.recommend(&rows, &request, &FixedSeasonClock(Season::Summer));

        assert!(!outcome.season_relaxed);
        assert!(outcome.recommendations.iter().all(|item| item.season == "summer"));
        assert!(outcome.recommendations.windows(2).all(|pair| pair[0].score >= pair[1].score));
        assert_eq!(outcome.recommendations[0].suggestion, "Raincoat");
        assert_eq!(outcome.recommendations[0].score, 4.5);
        assert_eq!(outcome.recommendations.len(), 4);
    }

    #[test]
    fn recommend_is_deterministic() {
        let engine = RecommendationEngine::new();
        let request = RecommendationRequest::new(18.0, "Clear").with_top_k(5);
        let catalog = Catalog::sample().expect("sample seeds are valid");

        let first = engine.recommend(&catalog, &request, &FixedSeasonClock(Season::Spring));
        let second = engine.recommend(&catalog, &request, &FixedSeasonClock(Season::Spring));

        assert_eq!(first, second);
    }

    #[test]
    fn season_override_beats_clock_season() {
        let engine = RecommendationEngine::new();
        let request = RecommendationRequest::new(12.0, "Clear").with_season("Spring");

        let catalog = Catalog::sample().expect("sample seeds are valid");
        let outcome = engine.recommend(&catalog, &request, &FixedSeasonClock(Season::Autumn));

        assert_eq!(outcome.season, "Spring");
        assert!(!outcome.season_relaxed);
        assert_eq!(outcome.recommendations[0].weather, "Clear");
        assert_eq!(outcome.recommendations.len(), 1);
    }

    struct UnsetClock;

    impl SeasonClock for UnsetClock {
        fn current_season(&self) -> Season {
            panic!("clock consulted although the request overrides the season")
        }
    }

    #[test]
    fn clock_is_consulted_only_without_override() {
        let engine = RecommendationEngine::new();
        let catalog = Catalog::sample().expect("sample seeds are valid");
        let plain = RecommendationRequest::new(12.0, "Clear");
        let winter = plain.clone().with_season(" winter ");

        let from_clock = engine.recommend(&catalog, &plain, &FixedSeasonClock(Season::Spring));
        let overridden = engine.recommend(&catalog, &winter, &UnsetClock);

        assert_eq!(from_clock.season, "spring");
        assert_eq!(from_clock.recommendations[0].weather, "Clear");
        assert_eq!(overridden.season, "winter");
        assert!(overridden.season_relaxed);
    }
}
