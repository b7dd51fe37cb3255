//! Configuration for the ClickHouse connection
//!
//! Loads configuration from:
//! 1. config.yaml - connection and logging settings
//! 2. .env file - secrets (password)
//!
//! Environment variables always override config.yaml values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidEnvVar { name: String, value: String },
}

/// ClickHouse connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Connection name used in logs
    pub name: String,
    pub host: String,
    /// Native protocol port
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            name: "clickhouse".to_string(),
            host: "localhost".to_string(),
            port: 9000,
            username: "default".to_string(),
            password: String::new(),
            database: "default".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or module-specific
    pub level: String,

    /// Output format: pretty, json, compact
    pub format: String,

    /// Output destination: stdout, file, both
    pub output: String,

    /// Directory for log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            output: "stdout".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from YAML file with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Like [`Config::load`], reading `.env` into the environment first.
    pub fn load_with_dotenv<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }
        Self::load(path)
    }

    /// Defaults plus environment overrides, for setups without a YAML file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("CLICKHOUSE_HOST") {
            self.connection.host = host;
        }
        if let Ok(port) = std::env::var("CLICKHOUSE_PORT") {
            self.connection.port = port.parse().map_err(|_| ConfigError::InvalidEnvVar {
                name: "CLICKHOUSE_PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Ok(username) = std::env::var("CLICKHOUSE_USERNAME") {
            self.connection.username = username;
        }
        if let Ok(password) = std::env::var("CLICKHOUSE_PASSWORD") {
            self.connection.password = password;
        }
        if let Ok(database) = std::env::var("CLICKHOUSE_DATABASE") {
            self.connection.database = database;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            self.logging.directory = dir;
        }

        Ok(())
    }

    /// Set logging environment variables for the logging module
    pub fn apply_logging_env(&self) {
        std::env::set_var("RUST_LOG", &self.logging.level);
        std::env::set_var("LOG_FORMAT", &self.logging.format);
        std::env::set_var("LOG_OUTPUT", &self.logging.output);
        std::env::set_var("LOG_DIR", &self.logging.directory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.connection.name, "clickhouse");
        assert_eq!(config.connection.host, "localhost");
        assert_eq!(config.connection.port, 9000);
        assert_eq!(config.connection.username, "default");
        assert_eq!(config.connection.password, "");
        assert_eq!(config.connection.database, "default");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "stdout");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("connection:\n  host: \"ch.internal\"\n").unwrap();

        assert_eq!(config.connection.host, "ch.internal");
        assert_eq!(config.connection.port, 9000);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    // Only test in this crate that touches CLICKHOUSE_* variables.
    #[test]
    fn test_env_var_override() {
        let config_yaml = r#"
connection:
  name: "analytics"
  host: "127.0.0.1"
  port: 9000
  username: "default"
  password: ""
  database: "default"
"#;
        let temp_file = std::env::temp_dir().join("clickql_test_config.yaml");
        std::fs::write(&temp_file, config_yaml).unwrap();

        std::env::set_var("CLICKHOUSE_PORT", "9440");
        std::env::set_var("CLICKHOUSE_DATABASE", "events");
        let config = Config::load(&temp_file).unwrap();
        assert_eq!(config.connection.name, "analytics");
        assert_eq!(config.connection.port, 9440); // Overridden
        assert_eq!(config.connection.database, "events"); // Overridden

        std::env::set_var("CLICKHOUSE_PORT", "native");
        let err = Config::load(&temp_file).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { .. }));

        std::env::remove_var("CLICKHOUSE_PORT");
        std::env::remove_var("CLICKHOUSE_DATABASE");
        std::fs::remove_file(temp_file).ok();
    }
}
