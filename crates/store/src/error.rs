//! Store errors

/// Errors from the log store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transport or server failure reported by the ClickHouse client
    #[error("clickhouse error: {0}")]
    ClickHouse(#[from] clickhouse::error::Error),

    /// Database or table name rejected before SQL interpolation
    #[error("unsafe identifier {0:?}: use letters, numbers, and underscores")]
    UnsafeIdentifier(String),
}
