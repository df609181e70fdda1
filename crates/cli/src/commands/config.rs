use std::env;
use std::fs;
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use toml::Value;
use wearcast_core::config::{resolve_config_path, AppConfig, LoadOptions};

pub const CACHE_SCOPE_NOTE: &str = "note: catalog.refresh_secs and weather.cache_ttl_secs only \
     apply to long-lived callers; each wearcast run reads the catalog and weather afresh";

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let entries = [
        (
            "catalog.path",
            config.catalog.path.display().to_string(),
            source("catalog.path", &["WEARCAST_CATALOG_PATH"]),
        ),
        (
            "catalog.refresh_secs",
            config.catalog.refresh_secs.to_string(),
            source("catalog.refresh_secs", &["WEARCAST_CATALOG_REFRESH_SECS"]),
        ),
        (
            "weather.api_key",
            redact_secret(config.weather.api_key.as_ref()),
            source("weather.api_key", &["WEARCAST_WEATHER_API_KEY", "OPENWEATHER_API_KEY"]),
        ),
        (
            "weather.base_url",
            config.weather.base_url.clone(),
            source("weather.base_url", &["WEARCAST_WEATHER_BASE_URL"]),
        ),
        (
            "weather.units",
            config.weather.units.clone(),
            source("weather.units", &["WEARCAST_WEATHER_UNITS"]),
        ),
        (
            "weather.timeout_secs",
            config.weather.timeout_secs.to_string(),
            source("weather.timeout_secs", &["WEARCAST_WEATHER_TIMEOUT_SECS"]),
        ),
        (
            "weather.cache_ttl_secs",
            config.weather.cache_ttl_secs.to_string(),
            source("weather.cache_ttl_secs", &["WEARCAST_WEATHER_CACHE_TTL_SECS"]),
        ),
        (
            "recommend.default_top_k",
            config.recommend.default_top_k.to_string(),
            source("recommend.default_top_k", &["WEARCAST_RECOMMEND_DEFAULT_TOP_K"]),
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            source("logging.level", &["WEARCAST_LOGGING_LEVEL", "WEARCAST_LOG_LEVEL"]),
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            source("logging.format", &["WEARCAST_LOGGING_FORMAT", "WEARCAST_LOG_FORMAT"]),
        ),
    ];

    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];
    lines.extend(entries.into_iter().map(|(key, value, source)| render_line(key, &value, source)));
    lines.push(CACHE_SCOPE_NOTE.to_string());
    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let set_env = env_keys.iter().find(|key| {
        env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
    });
    if let Some(env_key) = set_env {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Shows at most the last four characters of a key.
fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };

    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let chars = trimmed.chars().collect::<Vec<_>>();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }

    let tail = chars[chars.len() - 4..].iter().collect::<String>();
    format!("***{tail}")
}
