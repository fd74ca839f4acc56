//! Exporter configuration.
//!
//! A small two-key-plus-timeout YAML file next to the CLI flags. The file
//! is created with the built-in defaults when absent, so a bare install
//! has something to edit. Precedence is explicit: CLI flag > config file
//! > built-in default. A flag that was actually passed is never
//! overridden by the file.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default path of the bootstrap config file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/logstash_exporter/conf.yaml";

/// Default base endpoint of the monitored node's status API.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9600";

/// Default exporter listen address.
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:9198";

/// Default per-poll deadline.
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or create the configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Protocol, host and port on which the monitored node's status API
    /// listens.
    pub endpoint: String,

    /// Address the exporter binds its own HTTP server to.
    #[serde(rename = "bindaddress")]
    pub listen_address: String,

    /// Per-poll deadline applied to every collector task.
    #[serde(with = "humantime_serde")]
    pub scrape_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            scrape_timeout: DEFAULT_SCRAPE_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, creating the file with defaults if absent.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let defaults = serde_yaml::to_string(&Self::default())?;
            std::fs::write(path, defaults)?;
            tracing::info!(path = %path.display(), "created default config file");
        }
        Self::load(path)
    }

    /// Apply CLI overrides. Only flags the operator actually passed take
    /// effect; absent flags keep the file (or default) value.
    pub fn apply_overrides(
        &mut self,
        endpoint: Option<String>,
        listen_address: Option<String>,
    ) {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        if let Some(listen_address) = listen_address {
            self.listen_address = listen_address;
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = url::Url::parse(&self.endpoint).map_err(|e| {
            ConfigError::Validation(format!("invalid endpoint '{}': {}", self.endpoint, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "endpoint scheme must be http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        self.listen_address.parse::<SocketAddr>().map_err(|_| {
            ConfigError::Validation(format!(
                "invalid listen address: '{}'",
                self.listen_address
            ))
        })?;

        if self.scrape_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "scrape_timeout must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed listen address. Call only after `validate`.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_address.parse::<SocketAddr>().map_err(|_| {
            ConfigError::Validation(format!(
                "invalid listen address: '{}'",
                self.listen_address
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint, "http://localhost:9600");
        assert_eq!(config.listen_address, "0.0.0.0:9198");
        assert_eq!(config.scrape_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_load_or_create_bootstraps_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exporter").join("conf.yaml");

        let config = AppConfig::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("endpoint"));
        assert!(content.contains("bindaddress"));
    }

    #[test]
    fn test_load_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf.yaml");
        std::fs::write(
            &path,
            "endpoint: http://logstash.internal:9600\nbindaddress: 127.0.0.1:9300\n",
        )
        .unwrap();

        let config = AppConfig::load_or_create(&path).unwrap();
        assert_eq!(config.endpoint, "http://logstash.internal:9600");
        assert_eq!(config.listen_address, "127.0.0.1:9300");
        // Absent key falls back to the built-in default.
        assert_eq!(config.scrape_timeout, DEFAULT_SCRAPE_TIMEOUT);
    }

    #[test]
    fn test_flag_overrides_file_value() {
        let mut config = AppConfig {
            endpoint: "http://from-file:9600".to_string(),
            ..AppConfig::default()
        };

        config.apply_overrides(Some("http://from-flag:9600".to_string()), None);
        assert_eq!(config.endpoint, "http://from-flag:9600");
        // The absent flag kept the file value.
        assert_eq!(config.listen_address, DEFAULT_LISTEN_ADDRESS);
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = AppConfig {
            endpoint: "not a url".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let config = AppConfig {
            endpoint: "ftp://h:9600".to_string(),
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scheme"));
    }

    #[test]
    fn test_invalid_listen_address_rejected() {
        let config = AppConfig {
            listen_address: "not-an-addr".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = AppConfig {
            scrape_timeout: Duration::ZERO,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
