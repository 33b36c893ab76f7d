//! Configuration management for the forecast proxy
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, and validates the result before the server starts.

use crate::ForecastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "FORECAST_PROXY_CONFIG";

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "forecast-proxy.toml";

const ENV_PREFIX: &str = "FORECAST_PROXY";

/// Root configuration structure for the forecast proxy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Upstream provider settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream weather provider settings
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the forecast API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key sent as the `apikey` query parameter
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP endpoint spans are exported to, if any
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_base_url() -> String {
    "https://dataservice.accuweather.com".to_string()
}

fn default_timeout() -> u64 {
    5
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

// The API key is a credential and must not end up in logs.
impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl UpstreamConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ServerConfig {
    /// Socket address the listener binds to
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ProxyConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let config_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_from(config_path, None)
    }

    /// Load configuration from `config_path` (or the default file) layered
    /// with environment overrides.
    ///
    /// `env` replaces the process environment as the override source when given.
    pub fn load_from(
        config_path: Option<PathBuf>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        builder = builder.add_source(
            File::from(config_file.clone())
                .required(false)
                .format(FileFormat::Toml),
        );

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(env),
        );

        let settings = builder
            .build()
            .with_context(|| format!("Failed to build configuration from {}", config_file.display()))?;

        let mut config: ProxyConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Apply default values to fields that were set but left empty
    pub fn apply_defaults(&mut self) {
        if self.upstream.base_url.is_empty() {
            self.upstream.base_url = default_base_url();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_upstream()?;
        self.validate_logging()?;
        Ok(())
    }

    fn validate_upstream(&self) -> Result<()> {
        if self.upstream.api_key.trim().is_empty() {
            return Err(ForecastError::config(format!(
                "Upstream API key is missing. Set {ENV_PREFIX}_UPSTREAM__API_KEY or upstream.api_key in the config file."
            ))
            .into());
        }

        if self.upstream.timeout_seconds == 0 || self.upstream.timeout_seconds > 300 {
            return Err(ForecastError::config(
                "Upstream timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            return Err(ForecastError::config(
                "Upstream base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    fn validate_logging(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn missing_file() -> Option<PathBuf> {
        Some(PathBuf::from("does-not-exist/forecast-proxy.toml"))
    }

    #[test]
    fn test_default_config() {
        let config = ProxyConfig::default();
        assert_eq!(
            config.upstream.base_url,
            "https://dataservice.accuweather.com"
        );
        assert_eq!(config.upstream.timeout_seconds, 5);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.logging.level, "info");
        assert!(config.upstream.api_key.is_empty());
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let result = ProxyConfig::load_from(missing_file(), env(&[]));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("API key is missing"));
    }

    #[test]
    fn test_environment_overrides() {
        let config = ProxyConfig::load_from(
            missing_file(),
            env(&[
                ("FORECAST_PROXY_UPSTREAM__API_KEY", "test_key_from_env"),
                ("FORECAST_PROXY_SERVER__PORT", "9090"),
                ("FORECAST_PROXY_LOGGING__FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.upstream.api_key, "test_key_from_env");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.upstream.timeout_seconds, 5);
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = ProxyConfig::default();
        config.upstream.api_key = "valid_api_key_123".to_string();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = ProxyConfig::default();
        config.upstream.api_key = "valid_api_key_123".to_string();
        config.upstream.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config.upstream.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[test]
    fn test_numeric_looking_api_key_is_kept_verbatim() {
        for api_key in ["0123456789", "12345678901234567890123", "1e3"] {
            let config = ProxyConfig::load_from(
                missing_file(),
                env(&[("FORECAST_PROXY_UPSTREAM__API_KEY", api_key)]),
            )
            .unwrap();
            assert_eq!(config.upstream.api_key, api_key);
        }
    }

    #[test]
    fn test_config_validation_invalid_log_format() {
        let mut config = ProxyConfig::default();
        config.upstream.api_key = "valid_api_key_123".to_string();
        config.logging.format = "xml".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid log format"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = ProxyConfig::default();
        config.upstream.api_key = "valid_api_key_123".to_string();
        config.upstream.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut config = ProxyConfig::default();
        config.upstream.api_key = "super-secret".to_string();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
