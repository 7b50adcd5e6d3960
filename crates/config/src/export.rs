//! Export pipeline configuration

use std::path::PathBuf;

use serde::Deserialize;

/// Export settings
///
/// The row-limit threshold decides whether an export is buffered to a temp
/// file before serving or streamed directly. When unset, a default is
/// derived from available space in the temp directory at request time.
///
/// # Example
///
/// ```toml
/// [export]
/// row_limit_threshold = 500000
/// temp_dir = "/var/tmp/logtide"
/// batch_rows = 1000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Explicit buffered-vs-direct threshold in rows; overrides the
    /// disk-derived default when set
    pub row_limit_threshold: Option<u64>,

    /// Directory for buffered export files; system temp dir when unset
    pub temp_dir: Option<PathBuf>,

    /// Rows per columnar batch
    pub batch_rows: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            row_limit_threshold: None,
            temp_dir: None,
            batch_rows: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert!(config.row_limit_threshold.is_none());
        assert!(config.temp_dir.is_none());
        assert_eq!(config.batch_rows, 1000);
    }

    #[test]
    fn test_deserialize_threshold() {
        let config: ExportConfig = toml::from_str("row_limit_threshold = 42").unwrap();
        assert_eq!(config.row_limit_threshold, Some(42));
    }
}
