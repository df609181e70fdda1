//! Weather acquisition for the recommender.
//!
//! Providers answer "what is it like in this city right now" with a
//! [`WeatherObservation`]. Callers treat any [`WeatherError`] as "no
//! observation" and fall back to manual input.

pub mod cache;
pub mod openweather;

use async_trait::async_trait;
use thiserror::Error;
pub use wearcast_core::WeatherObservation;

pub use cache::CachedWeatherProvider;
pub use openweather::OpenWeatherProvider;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("no weather api key is configured")]
    MissingApiKey,
    #[error("city name is empty")]
    EmptyCity,
    #[error("could not build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("weather request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("weather provider answered with status {status}")]
    Status { status: u16 },
    #[error("could not decode weather payload: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("weather payload has no condition entry")]
    MissingCondition,
    #[error("could not run weather lookup: {0}")]
    Runtime(String),
}

impl WeatherError {
    /// Short machine-readable class for command envelopes.
    pub fn class(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "weather_not_configured",
            Self::EmptyCity => "invalid_city",
            Self::Client(_) | Self::Transport(_) | Self::Status { .. } | Self::Runtime(_) => {
                "weather_unavailable"
            }
            Self::Decode(_) | Self::MissingCondition => "weather_payload",
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str) -> Result<WeatherObservation, WeatherError>;
}
