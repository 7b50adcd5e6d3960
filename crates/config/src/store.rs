//! ClickHouse connection configuration

use serde::Deserialize;

/// Store connection settings
///
/// # Example
///
/// ```toml
/// [store]
/// url = "http://localhost:8123"
/// database = "default"
/// user = "default"
/// password = ""
/// table = "logs"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// ClickHouse HTTP URL
    pub url: String,

    /// Database name
    pub database: String,

    /// User name
    pub user: String,

    /// Password
    pub password: String,

    /// Table holding parsed log rows
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".to_string(),
            database: "default".to_string(),
            user: "default".to_string(),
            password: String::new(),
            table: "logs".to_string(),
        }
    }
}
