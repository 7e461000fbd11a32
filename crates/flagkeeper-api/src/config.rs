//! Server configuration
//!
//! Values come from an optional TOML or YAML file and can be overridden on
//! the command line or through environment variables.

use flagkeeper_core::DEFAULT_REFRESH_INTERVAL;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(format!("TOML error: {}", err))
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse(format!("YAML error: {}", err))
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::Invalid(format!("unknown log format '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
    /// YAML or JSON file with projects, types and toggles to load at startup
    pub seed_file: Option<PathBuf>,
    /// How long the feature type lifetime snapshot stays fresh
    pub lifetime_refresh_secs: u64,
    /// Interval of the background health recalculation; 0 disables it
    pub health_refresh_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4242,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            seed_file: None,
            lifetime_refresh_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            health_refresh_secs: 3600,
        }
    }
}

impl ServerConfig {
    /// Load from a `.toml`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
            Some("toml") => Ok(toml::from_str(&content)?),
            _ => Err(ConfigError::Invalid(format!(
                "unsupported config file extension: {}",
                path.display()
            ))),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".to_string()));
        }
        if self.lifetime_refresh_secs == 0 {
            return Err(ConfigError::Invalid(
                "lifetime_refresh_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("bad listen address: {}", e)))
    }

    pub fn lifetime_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.lifetime_refresh_secs)
    }

    /// `None` when background refresh is disabled
    pub fn health_refresh_interval(&self) -> Option<Duration> {
        (self.health_refresh_secs > 0).then(|| Duration::from_secs(self.health_refresh_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr().unwrap().port(), 4242);
        assert_eq!(config.health_refresh_interval(), Some(Duration::from_secs(3600)));
        assert_eq!(config.lifetime_refresh_interval(), DEFAULT_REFRESH_INTERVAL);
    }

    #[test]
    fn test_load_toml_with_partial_fields() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "port = 8080\nlog_format = \"pretty\"\nhealth_refresh_secs = 0").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.health_refresh_interval().is_none());
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "host: 127.0.0.1\nseed_file: seed.yaml").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.seed_file, Some(PathBuf::from("seed.yaml")));
    }

    #[test]
    fn test_invalid_values() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!(ServerConfig::from_file("flagkeeper.ini").is_err());
    }
}
