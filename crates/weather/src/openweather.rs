use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use wearcast_core::config::WeatherConfig;

use crate::{WeatherError, WeatherObservation, WeatherProvider};

/// Catalog ranges are in °C, so readings are always requested in metric.
const UNITS: &str = "metric";

/// OpenWeather "current weather" client.
#[derive(Clone)]
pub struct OpenWeatherProvider {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherPayload {
    weather: Vec<ConditionEntry>,
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    main: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

impl OpenWeatherProvider {
    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client =
            Client::builder().timeout(config.timeout()).build().map_err(WeatherError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.as_ref().map(|key| !key.expose_secret().trim().is_empty()).unwrap_or(false)
    }

    fn query<'a>(city: &'a str, api_key: &'a str) -> [(&'static str, &'a str); 4] {
        [("q", city), ("appid", api_key), ("units", UNITS), ("lang", "en")]
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<WeatherObservation, WeatherError> {
        let api_key = self
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().trim())
            .filter(|key| !key.is_empty())
            .ok_or(WeatherError::MissingApiKey)?;
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyCity);
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&Self::query(city, api_key))
            .send()
            .await
            .map_err(WeatherError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status { status: status.as_u16() });
        }

        let body = response.text().await.map_err(WeatherError::Transport)?;
        let observation = parse_current_weather(&body)?;
        debug!(
            event_name = "weather.fetch.ok",
            city = %city,
            temperature_c = observation.temperature_c,
            condition = %observation.condition,
            "weather observation fetched"
        );
        Ok(observation)
    }
}

/// Reads `main.temp` and the first `weather[].main` label from a
/// current-weather payload.
pub fn parse_current_weather(body: &str) -> Result<WeatherObservation, WeatherError> {
    let payload: CurrentWeatherPayload = serde_json::from_str(body).map_err(WeatherError::Decode)?;
    let condition = payload
        .weather
        .into_iter()
        .map(|entry| entry.main.trim().to_string())
        .find(|label| !label.is_empty())
        .ok_or(WeatherError::MissingCondition)?;

    Ok(WeatherObservation::new(payload.main.temp, condition))
}
