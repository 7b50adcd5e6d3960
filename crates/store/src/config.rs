//! ClickHouse connection configuration
//!
//! Configuration for connecting to ClickHouse and naming the log table.

use clickhouse::Client;

// =============================================================================
// Constants
// =============================================================================

/// Default ClickHouse HTTP URL
pub const DEFAULT_URL: &str = "http://localhost:8123";

/// Default database name
pub const DEFAULT_DATABASE: &str = "default";

/// Default access-log table name
pub const DEFAULT_TABLE: &str = "logs";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the log store
#[derive(Debug, Clone)]
pub struct ClickHouseConfig {
    /// ClickHouse HTTP URL (e.g., "http://localhost:8123")
    pub url: String,

    /// Database name
    pub database: String,

    /// Username for authentication (optional)
    pub username: Option<String>,

    /// Password for authentication (optional)
    pub password: Option<String>,

    /// Access-log table name
    pub table: String,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.into(),
            database: DEFAULT_DATABASE.into(),
            username: None,
            password: None,
            table: DEFAULT_TABLE.into(),
        }
    }
}

impl ClickHouseConfig {
    /// Set the ClickHouse URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the database name
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set authentication credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the access-log table name
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Build the ClickHouse client from this config
    pub fn build_client(&self) -> Client {
        let mut client = Client::default()
            .with_url(&self.url)
            .with_database(&self.database);

        if let Some(ref username) = self.username {
            client = client.with_user(username);
        }

        if let Some(ref password) = self.password {
            client = client.with_password(password);
        }

        client
    }

    /// Build a client bound to no particular database
    ///
    /// Used for `CREATE DATABASE` before the configured database exists.
    pub(crate) fn build_admin_client(&self) -> Client {
        let mut client = Client::default().with_url(&self.url);

        if let Some(ref username) = self.username {
            client = client.with_user(username);
        }

        if let Some(ref password) = self.password {
            client = client.with_password(password);
        }

        client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClickHouseConfig::default();
        assert_eq!(config.url, "http://localhost:8123");
        assert_eq!(config.database, "default");
        assert_eq!(config.table, "logs");
        assert!(config.username.is_none());
        assert!(config.password.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = ClickHouseConfig::default()
            .with_url("http://clickhouse:8123")
            .with_database("weblogs")
            .with_credentials("ingest", "secret")
            .with_table("access_logs");

        assert_eq!(config.url, "http://clickhouse:8123");
        assert_eq!(config.database, "weblogs");
        assert_eq!(config.username.as_deref(), Some("ingest"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.table, "access_logs");
    }
}
