//! Logtide configuration
//!
//! TOML-based configuration loading with sensible defaults. A missing or
//! empty file yields a working local setup - only specify what you need to
//! change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use logtide_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[store]\nurl = \"http://localhost:8123\"").unwrap();
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [store]
//! url = "http://localhost:8123"
//! database = "default"
//! table = "logs"
//!
//! [export]
//! # row_limit_threshold = 500000
//!
//! [ingest]
//! poll_interval = "500ms"
//! poll_timeout = "30s"
//! ```

mod error;
mod export;
mod ingest;
mod logging;
mod server;
mod store;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use export::ExportConfig;
pub use ingest::IngestConfig;
pub use logging::{LogConfig, LogLevel};
pub use server::ServerConfig;
pub use store::StoreConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server bind settings
    pub server: ServerConfig,

    /// ClickHouse connection settings
    pub store: StoreConfig,

    /// Export pipeline settings (buffering threshold, temp dir)
    pub export: ExportConfig,

    /// Ingest pipeline settings (visibility polling)
    pub ingest: IngestConfig,

    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks for:
    /// - Non-zero ports, batch sizes and poll intervals
    /// - Store identifiers that are safe to interpolate into SQL
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::time::Duration;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.url, "http://localhost:8123");
        assert_eq!(config.store.table, "logs");
        assert!(config.export.row_limit_threshold.is_none());
        assert_eq!(config.ingest.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_minimal_config() {
        let toml = r#"
[store]
url = "http://clickhouse:8123"
database = "weblogs"
"#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.store.url, "http://clickhouse:8123");
        assert_eq!(config.store.database, "weblogs");
        // unspecified sections keep defaults
        assert_eq!(config.store.table, "logs");
        assert_eq!(config.export.batch_rows, 1000);
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9090

[store]
url = "http://clickhouse:8123"
database = "weblogs"
user = "ingest"
password = "secret"
table = "access_logs"

[export]
row_limit_threshold = 250000
temp_dir = "/var/tmp/logtide"
batch_rows = 500

[ingest]
poll_interval = "250ms"
poll_timeout = "10s"

[log]
level = "debug"
"#;
        let config = Config::from_str(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.store.user, "ingest");
        assert_eq!(config.store.table, "access_logs");
        assert_eq!(config.export.row_limit_threshold, Some(250000));
        assert_eq!(
            config.export.temp_dir.as_deref(),
            Some(std::path::Path::new("/var/tmp/logtide"))
        );
        assert_eq!(config.export.batch_rows, 500);
        assert_eq!(config.ingest.poll_interval, Duration::from_millis(250));
        assert_eq!(config.ingest.poll_timeout, Duration::from_secs(10));
        assert_eq!(config.log.level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_str("invalid { toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let result = Config::from_str("[server]\nport = 0");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_batch_rows_rejected() {
        let result = Config::from_str("[export]\nbatch_rows = 0");
        assert!(result.is_err());
    }

    #[test]
    fn test_unsafe_table_name_rejected() {
        let result = Config::from_str("[store]\ntable = \"logs; DROP TABLE logs\"");
        assert!(result.is_err());
    }
}
