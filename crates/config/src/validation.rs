//! Configuration validation
//!
//! Cross-field checks run after deserialization. Catches values that
//! would only fail much later (a zero port at bind time, an unsafe
//! table name at query time).

use crate::error::{ConfigError, Result};
use crate::Config;

/// Validate a fully deserialized configuration
pub(crate) fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        return Err(ConfigError::invalid_value(
            "server",
            "port",
            "must be non-zero",
        ));
    }

    if config.store.url.is_empty() {
        return Err(ConfigError::invalid_value(
            "store",
            "url",
            "must not be empty",
        ));
    }

    if !is_valid_identifier(&config.store.database) {
        return Err(ConfigError::invalid_value(
            "store",
            "database",
            "use only letters, numbers, and underscores",
        ));
    }

    if !is_valid_identifier(&config.store.table) {
        return Err(ConfigError::invalid_value(
            "store",
            "table",
            "use only letters, numbers, and underscores",
        ));
    }

    if config.export.batch_rows == 0 {
        return Err(ConfigError::invalid_value(
            "export",
            "batch_rows",
            "must be at least 1",
        ));
    }

    if config.ingest.poll_interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "ingest",
            "poll_interval",
            "must be non-zero",
        ));
    }

    Ok(())
}

/// Identifier safe to interpolate into SQL (table and database names
/// cannot be bound as query parameters)
fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.chars().next().map_or(true, |c| c.is_ascii_digit())
}
