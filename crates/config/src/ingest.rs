//! Ingest pipeline configuration

use std::time::Duration;

use serde::Deserialize;

/// Ingest settings
///
/// After a streaming insert is acknowledged, the coordinator polls the
/// store's row count until the new rows become visible. The poll has a
/// timeout so a quiet store cannot stall an import response forever.
///
/// # Example
///
/// ```toml
/// [ingest]
/// poll_interval = "500ms"
/// poll_timeout = "30s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Delay between row-count polls
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Give up waiting for visibility after this long
    #[serde(with = "humantime_serde")]
    pub poll_timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            poll_timeout: Duration::from_secs(30),
        }
    }
}
