use clap::Args;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use wearcast_core::config::{AppConfig, LoadOptions, WeatherConfig};
use wearcast_core::{
    ApplicationError, CatalogCache, CsvFileSource, DomainError, LocalSeasonClock, Preference,
    RecommendationEngine, RecommendationOutcome, RecommendationRequest, RecommendationService,
    WeatherObservation,
};
use wearcast_weather::{CachedWeatherProvider, OpenWeatherProvider, WeatherError, WeatherProvider};

use crate::commands::{current_thread_runtime, CommandResult};

pub const EMPTY_RESULT_MESSAGE: &str = "no suggestions matched; try relaxing your filters";

#[derive(Debug, Clone, Default, Args)]
pub struct RecommendArgs {
    #[arg(long, help = "Look up current weather for this city")]
    pub city: Option<String>,
    #[arg(
        long = "temp",
        allow_negative_numbers = true,
        help = "Temperature in °C; wins over the city lookup"
    )]
    pub temperature: Option<f64>,
    #[arg(long, help = "Weather condition such as Clear, Rain, Snow; wins over the city lookup")]
    pub condition: Option<String>,
    #[arg(long, help = "Season label overriding the current season")]
    pub season: Option<String>,
    #[arg(long, help = "male, female, unisex, or any")]
    pub gender: Option<String>,
    #[arg(long, help = "Activity label from the catalog, or any")]
    pub activity: Option<String>,
    #[arg(long, help = "Formality label from the catalog, or any")]
    pub formality: Option<String>,
    #[arg(long = "top-k", help = "Number of suggestions to return")]
    pub top_k: Option<usize>,
    #[arg(long, help = "Emit machine-readable JSON output")]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RecommendReport {
    command: &'static str,
    status: &'static str,
    correlation_id: String,
    weather: WeatherObservation,
    weather_source: String,
    #[serde(flatten)]
    outcome: RecommendationOutcome,
}

pub fn run(args: RecommendArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "recommend",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let correlation_id = Uuid::new_v4().to_string();
    match execute(&config, &args, &correlation_id) {
        Ok(report) => {
            info!(
                event_name = "recommend.completed",
                correlation_id = %report.correlation_id,
                season = %report.outcome.season,
                season_relaxed = report.outcome.season_relaxed,
                returned = report.outcome.recommendations.len(),
                "recommendations produced"
            );
            let output = if args.json { render_json(&report) } else { render_human(&report) };
            CommandResult { exit_code: 0, output }
        }
        Err(error) => {
            warn!(
                event_name = "recommend.failed",
                correlation_id = %correlation_id,
                error = %error,
                "recommendation request failed"
            );
            CommandResult::interface_failure("recommend", &error.into_interface(correlation_id))
        }
    }
}

fn execute(
    config: &AppConfig,
    args: &RecommendArgs,
    correlation_id: &str,
) -> Result<RecommendReport, ApplicationError> {
    let (weather, weather_source) = resolve_weather(&config.weather, args)?;
    if !weather.temperature_c.is_finite() {
        return Err(DomainError::NonFiniteTemperature { field: "temperature" }.into());
    }

    let mut request = RecommendationRequest::new(weather.temperature_c, weather.condition.clone())
        .with_gender(Preference::from(args.gender.clone()))
        .with_activity(Preference::from(args.activity.clone()))
        .with_formality(Preference::from(args.formality.clone()))
        .with_top_k(args.top_k.unwrap_or(config.recommend.default_top_k));
    if let Some(season) = &args.season {
        request = request.with_season(season.clone());
    }

    let cache = CatalogCache::new(
        CsvFileSource::new(config.catalog.path.clone()),
        config.catalog.refresh_ttl(),
    );
    let mut service =
        RecommendationService::new(cache, RecommendationEngine::new(), LocalSeasonClock);
    let outcome = service.recommend(&request)?;

    Ok(RecommendReport {
        command: "recommend",
        status: "ok",
        correlation_id: correlation_id.to_string(),
        weather,
        weather_source,
        outcome,
    })
}

/// Manual values win; the city lookup only fills what was not given.
fn resolve_weather(
    weather: &WeatherConfig,
    args: &RecommendArgs,
) -> Result<(WeatherObservation, String), ApplicationError> {
    if let (Some(temperature), Some(condition)) = (args.temperature, args.condition.as_deref()) {
        return Ok((WeatherObservation::new(temperature, condition.trim()), "manual".to_string()));
    }

    let Some(city) = args.city.as_deref().map(str::trim).filter(|city| !city.is_empty()) else {
        return Err(DomainError::MissingWeatherInput(
            "pass --city, or both --temp and --condition".to_string(),
        )
        .into());
    };

    let observed = lookup_city(weather, city).map_err(|error| {
        ApplicationError::Integration(format!(
            "weather lookup for `{city}` failed ({}): {error}; pass --temp and --condition instead",
            error.class()
        ))
    })?;

    let observation = WeatherObservation::new(
        args.temperature.unwrap_or(observed.temperature_c),
        args.condition.as_deref().map(str::trim).unwrap_or(&observed.condition),
    );
    Ok((observation, format!("openweather ({city})")))
}

fn lookup_city(weather: &WeatherConfig, city: &str) -> Result<WeatherObservation, WeatherError> {
    if !weather.has_api_key() {
        return Err(WeatherError::MissingApiKey);
    }

    let provider =
        CachedWeatherProvider::new(OpenWeatherProvider::from_config(weather)?, weather.cache_ttl());
    let runtime =
        current_thread_runtime().map_err(|error| WeatherError::Runtime(format!("{error:#}")))?;
    runtime.block_on(provider.current(city))
}

fn render_json(report: &RecommendReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|error| {
        CommandResult::failure("recommend", "serialization", error.to_string(), 1).output
    })
}

fn render_human(report: &RecommendReport) -> String {
    let mut lines = vec![format!(
        "weather: {:.1}°C {} (source: {})",
        report.weather.temperature_c, report.weather.condition, report.weather_source
    )];

    let season_note = if report.outcome.season_relaxed {
        " (no outfit matched this season; showing all seasons)"
    } else {
        ""
    };
    lines.push(format!("season: {}{season_note}", report.outcome.season));

    if report.outcome.is_empty() {
        lines.push(EMPTY_RESULT_MESSAGE.to_string());
        return lines.join("\n");
    }

    for (position, item) in report.outcome.recommendations.iter().enumerate() {
        lines.push(format!(
            "{}. {} [score {}]\n   {} | {} | {} | {} | {} | {}",
            position + 1,
            item.suggestion,
            item.score,
            item.weather,
            item.temp_range,
            item.gender,
            item.activity,
            item.season,
            item.formality
        ));
    }

    lines.join("\n")
}
