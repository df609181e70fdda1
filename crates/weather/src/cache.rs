use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{WeatherError, WeatherObservation, WeatherProvider};

#[derive(Clone, Debug)]
struct CachedObservation {
    observation: WeatherObservation,
    fetched_at: Instant,
}

/// Wraps a provider with a per-city TTL cache.
///
/// Only successful observations are cached; failures always go back to the
/// inner provider on the next call. City keys are trimmed and lowercased.
pub struct CachedWeatherProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedObservation>>,
}

impl<P: WeatherProvider> CachedWeatherProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self { inner, ttl, entries: Mutex::new(HashMap::new()) }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub async fn invalidate(&self, city: &str) {
        self.entries.lock().await.remove(&cache_key(city));
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    async fn cached(&self, key: &str) -> Option<WeatherObservation> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.fetched_at.elapsed() < self.ttl => Some(entry.observation.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl<P: WeatherProvider> WeatherProvider for CachedWeatherProvider<P> {
    async fn current(&self, city: &str) -> Result<WeatherObservation, WeatherError> {
        let key = cache_key(city);
        if let Some(observation) = self.cached(&key).await {
            debug!(event_name = "weather.cache.hit", city = %key);
            return Ok(observation);
        }

        match self.inner.current(city).await {
            Ok(observation) => {
                self.entries.lock().await.insert(
                    key,
                    CachedObservation { observation: observation.clone(), fetched_at: Instant::now() },
                );
                Ok(observation)
            }
            Err(error) => {
                warn!(
                    event_name = "weather.fetch.failed",
                    city = %key,
                    error_class = error.class(),
                    error = %error,
                    "weather lookup failed"
                );
                Err(error)
            }
        }
    }
}

fn cache_key(city: &str) -> String {
    city.trim().to_lowercase()
}
