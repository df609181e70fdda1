use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "wearcast.toml";
pub const NESTED_CONFIG_FILE: &str = "config/wearcast.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub weather: WeatherConfig,
    pub recommend: RecommendConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub path: PathBuf,
    /// Seconds before a loaded catalog is re-read; 0 keeps it for the process lifetime.
    /// Only a long-lived `CatalogCache` sees this. A one-shot CLI run always reads the file.
    pub refresh_secs: u64,
}

#[derive(Clone, Debug)]
pub struct WeatherConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    /// Only `metric` is accepted.
    pub units: String,
    pub timeout_secs: u64,
    /// Per-city reuse window of a `CachedWeatherProvider`. Like `catalog.refresh_secs`,
    /// it has no effect across separate CLI runs.
    pub cache_ttl_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RecommendConfig {
    pub default_top_k: usize,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub weather_api_key: Option<String>,
    pub default_top_k: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig { path: PathBuf::from("data/outfits.csv"), refresh_secs: 0 },
            weather: WeatherConfig {
                api_key: None,
                base_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
                units: "metric".to_string(),
                timeout_secs: 8,
                cache_ttl_secs: 300,
            },
            recommend: RecommendConfig { default_top_k: 3 },
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

impl CatalogConfig {
    pub fn refresh_ttl(&self) -> Option<Duration> {
        (self.refresh_secs > 0).then(|| Duration::from_secs(self.refresh_secs))
    }
}

impl WeatherConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().map(|key| !key.expose_secret().trim().is_empty()).unwrap_or(false)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(path) = catalog.path {
                self.catalog.path = path;
            }
            if let Some(refresh_secs) = catalog.refresh_secs {
                self.catalog.refresh_secs = refresh_secs;
            }
        }

        if let Some(weather) = patch.weather {
            if let Some(api_key) = weather.api_key {
                self.weather.api_key = Some(secret_value(api_key));
            }
            if let Some(base_url) = weather.base_url {
                self.weather.base_url = base_url;
            }
            if let Some(units) = weather.units {
                self.weather.units = units;
            }
            if let Some(timeout_secs) = weather.timeout_secs {
                self.weather.timeout_secs = timeout_secs;
            }
            if let Some(cache_ttl_secs) = weather.cache_ttl_secs {
                self.weather.cache_ttl_secs = cache_ttl_secs;
            }
        }

        if let Some(recommend) = patch.recommend {
            if let Some(default_top_k) = recommend.default_top_k {
                self.recommend.default_top_k = default_top_k;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("WEARCAST_CATALOG_PATH") {
            self.catalog.path = PathBuf::from(value);
        }
        if let Some(value) = read_env("WEARCAST_CATALOG_REFRESH_SECS") {
            self.catalog.refresh_secs = parse_u64("WEARCAST_CATALOG_REFRESH_SECS", &value)?;
        }

        let api_key =
            read_env("WEARCAST_WEATHER_API_KEY").or_else(|| read_env("OPENWEATHER_API_KEY"));
        if let Some(value) = api_key {
            self.weather.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("WEARCAST_WEATHER_BASE_URL") {
            self.weather.base_url = value;
        }
        if let Some(value) = read_env("WEARCAST_WEATHER_UNITS") {
            self.weather.units = value;
        }
        if let Some(value) = read_env("WEARCAST_WEATHER_TIMEOUT_SECS") {
            self.weather.timeout_secs = parse_u64("WEARCAST_WEATHER_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("WEARCAST_WEATHER_CACHE_TTL_SECS") {
            self.weather.cache_ttl_secs = parse_u64("WEARCAST_WEATHER_CACHE_TTL_SECS", &value)?;
        }

        if let Some(value) = read_env("WEARCAST_RECOMMEND_DEFAULT_TOP_K") {
            self.recommend.default_top_k =
                parse_usize("WEARCAST_RECOMMEND_DEFAULT_TOP_K", &value)?;
        }

        let log_level =
            read_env("WEARCAST_LOGGING_LEVEL").or_else(|| read_env("WEARCAST_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("WEARCAST_LOGGING_FORMAT").or_else(|| read_env("WEARCAST_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog.path = catalog_path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(api_key) = overrides.weather_api_key {
            self.weather.api_key = Some(secret_value(api_key));
        }
        if let Some(default_top_k) = overrides.default_top_k {
            self.recommend.default_top_k = default_top_k;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_weather(&self.weather)?;
        validate_recommend(&self.recommend)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Config file that `load` would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "catalog.path must point to the outfit CSV file".to_string(),
        ));
    }

    Ok(())
}

fn validate_weather(weather: &WeatherConfig) -> Result<(), ConfigError> {
    let base_url = weather.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "weather.base_url must start with http:// or https://".to_string(),
        ));
    }

    if weather.timeout_secs == 0 || weather.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "weather.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if !weather.units.trim().eq_ignore_ascii_case("metric") {
        return Err(ConfigError::Validation(
            "weather.units must be metric; catalog temperature ranges are in °C".to_string(),
        ));
    }

    Ok(())
}

fn validate_recommend(recommend: &RecommendConfig) -> Result<(), ConfigError> {
    if recommend.default_top_k == 0 || recommend.default_top_k > 50 {
        return Err(ConfigError::Validation(
            "recommend.default_top_k must be in range 1..=50".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    weather: Option<WeatherPatch>,
    recommend: Option<RecommendPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    path: Option<PathBuf>,
    refresh_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct WeatherPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    units: Option<String>,
    timeout_secs: Option<u64>,
    cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendPatch {
    default_top_k: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid_and_keep_catalog_forever() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.catalog.refresh_ttl().is_none(), "refresh_secs = 0 should disable expiry")?;
        ensure(config.recommend.default_top_k == 3, "default top_k should be 3")?;
        ensure(
            config.weather.cache_ttl() == Duration::from_secs(300),
            "weather cache ttl should default to five minutes",
        )?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_WEARCAST_WEATHER_KEY", "key-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("wearcast.toml");
            fs::write(
                &path,
                r#"
[weather]
api_key = "${TEST_WEARCAST_WEATHER_KEY}"

[catalog]
path = "fixtures/outfits.csv"
refresh_secs = 60
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.weather.api_key.as_ref().map(|key| key.expose_secret().to_string())
                    == Some("key-from-env".to_string()),
                "api key should be interpolated from environment",
            )?;
            ensure(
                config.catalog.path == PathBuf::from("fixtures/outfits.csv"),
                "catalog path should come from file",
            )?;
            ensure(
                config.catalog.refresh_ttl() == Some(Duration::from_secs(60)),
                "refresh ttl should come from file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_WEARCAST_WEATHER_KEY"]);
        result
    }

    #[test]
    fn openweather_key_alias_is_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("OPENWEATHER_API_KEY", "legacy-key");
        env::set_var("WEARCAST_LOG_LEVEL", "warn");
        env::set_var("WEARCAST_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.weather.has_api_key(), "legacy api key variable should be honoured")?;
            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["OPENWEATHER_API_KEY", "WEARCAST_LOG_LEVEL", "WEARCAST_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("WEARCAST_CATALOG_PATH", "from-env.csv");
        env::set_var("WEARCAST_RECOMMEND_DEFAULT_TOP_K", "7");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("wearcast.toml");
            fs::write(
                &path,
                r#"
[catalog]
path = "from-file.csv"

[recommend]
default_top_k = 5

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    catalog_path: Some(PathBuf::from("from-override.csv")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.catalog.path == PathBuf::from("from-override.csv"),
                "override catalog path should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.recommend.default_top_k == 7, "env top_k should win over file")?;
            Ok(())
        })();

        clear_vars(&["WEARCAST_CATALOG_PATH", "WEARCAST_RECOMMEND_DEFAULT_TOP_K"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("WEARCAST_WEATHER_TIMEOUT_SECS", "0");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("weather.timeout_secs")
            );
            ensure(has_message, "validation failure should mention weather.timeout_secs")
        })();

        clear_vars(&["WEARCAST_WEATHER_TIMEOUT_SECS"]);
        result
    }

    #[test]
    fn non_metric_units_are_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let result = (|| -> Result<(), String> {
            for units in ["imperial", "standard"] {
                env::set_var("WEARCAST_WEATHER_UNITS", units);
                let error = AppConfig::load(LoadOptions::default()).err();
                ensure(
                    matches!(
                        error,
                        Some(ConfigError::Validation(ref message)) if message.contains("weather.units")
                    ),
                    "fahrenheit and kelvin readings should be rejected",
                )?;
            }

            env::set_var("WEARCAST_WEATHER_UNITS", "metric");
            ensure(AppConfig::load(LoadOptions::default()).is_ok(), "metric units should load")
        })();

        clear_vars(&["WEARCAST_WEATHER_UNITS"]);
        result
    }

    #[test]
    fn invalid_numeric_env_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("WEARCAST_CATALOG_REFRESH_SECS", "soon");

        let result = (|| -> Result<(), String> {
            let error = AppConfig::load(LoadOptions::default()).err();
            ensure(
                matches!(
                    error,
                    Some(ConfigError::InvalidEnvOverride { ref key, .. })
                        if key == "WEARCAST_CATALOG_REFRESH_SECS"
                ),
                "non-numeric refresh secs should be rejected",
            )
        })();

        clear_vars(&["WEARCAST_CATALOG_REFRESH_SECS"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("WEARCAST_WEATHER_API_KEY", "owm-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("owm-secret-value"), "debug output should not contain api key")
        })();

        clear_vars(&["WEARCAST_WEATHER_API_KEY"]);
        result
    }
}
