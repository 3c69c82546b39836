//! Service Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `TURNOVER_*` environment variables. Nested keys use a
//! double underscore, e.g. `TURNOVER_RATE_LIMIT__ENABLED=true`.

use crate::rate_limit::RateLimitConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "TURNOVER";

/// Config file read when no path is given; missing is not an error
pub const DEFAULT_CONFIG_PATH: &str = "config/turnover.toml";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Prometheus exporter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Serve `/metrics`
    pub enabled: bool,
    /// Seconds between exporter upkeep runs (histogram buckets are drained)
    pub upkeep_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            upkeep_interval_secs: 5,
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listen address
    pub bind_addr: String,
    /// Classifier artifact (`.onnx` or `.json`)
    pub model_path: PathBuf,
    /// Fitted scaler artifact
    pub scaler_path: PathBuf,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub rate_limit: RateLimitConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            model_path: PathBuf::from("artifacts/hr_turnover_model.onnx"),
            scaler_path: PathBuf::from("artifacts/scaler.json"),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from defaults, a file and the environment.
    ///
    /// An explicit `path` must exist; otherwise [`DEFAULT_CONFIG_PATH`] is
    /// read if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };
        Self::defaults()?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse TOML text layered over the defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("bind_addr", defaults.bind_addr)?
            .set_default("model_path", defaults.model_path.to_string_lossy().into_owned())?
            .set_default("scaler_path", defaults.scaler_path.to_string_lossy().into_owned())?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.json", defaults.logging.json)?
            .set_default("metrics.enabled", defaults.metrics.enabled)?
            .set_default(
                "metrics.upkeep_interval_secs",
                defaults.metrics.upkeep_interval_secs as i64,
            )?
            .set_default("rate_limit.enabled", defaults.rate_limit.enabled)?
            .set_default("rate_limit.per_second", defaults.rate_limit.per_second as i64)?
            .set_default("rate_limit.burst_size", i64::from(defaults.rate_limit.burst_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert!(!config.rate_limit.enabled);
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.upkeep_interval_secs, 5);
    }

    #[test]
    fn test_metrics_section() {
        let config =
            ServiceConfig::from_toml_str("[metrics]\nenabled = true\nupkeep_interval_secs = 30")
                .unwrap();
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.upkeep_interval_secs, 30);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = ServiceConfig::from_toml_str(
            r#"
            bind_addr = "127.0.0.1:8080"
            model_path = "models/turnover.json"

            [logging]
            level = "debug"
            json = true

            [rate_limit]
            enabled = true
            burst_size = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.model_path, PathBuf::from("models/turnover.json"));
        assert_eq!(config.scaler_path, PathBuf::from("artifacts/scaler.json"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.burst_size, 20);
        assert_eq!(config.rate_limit.per_second, RateLimitConfig::default().per_second);
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        assert!(ServiceConfig::from_toml_str("[rate_limit]\nburst_size = \"many\"").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        assert!(ServiceConfig::load(Some(Path::new("does/not/exist.toml"))).is_err());
    }
}
