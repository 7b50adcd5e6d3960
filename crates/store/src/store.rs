//! Log store operations
//!
//! Streaming insert and cursor-based read paths over the access-log
//! table. The table name is checked against the identifier grammar at
//! construction, so interpolating it into SQL here is safe; everything
//! user-supplied goes through `bind`.

use chrono::{DateTime, NaiveDateTime};
use clickhouse::insert::Insert;
use clickhouse::query::RowCursor;
use clickhouse::{Client, Row};
use logtide_parser::LogRow;
use serde::Deserialize;

use crate::config::ClickHouseConfig;
use crate::error::StoreError;
use crate::row::LogEntryRow;

// =============================================================================
// Log Store
// =============================================================================

/// Handle to the access-log table
#[derive(Clone)]
pub struct LogStore {
    client: Client,
    table: String,
}

impl LogStore {
    /// Create a store from connection config
    ///
    /// Fails if the table name is not safe to interpolate into SQL.
    pub fn new(config: &ClickHouseConfig) -> Result<Self, StoreError> {
        crate::schema::validate_identifier(&config.table)?;

        Ok(Self {
            client: config.build_client(),
            table: config.table.clone(),
        })
    }

    /// Table name this store reads and writes
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Check that the server is reachable
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.client.query("SELECT 1").execute().await?;
        Ok(())
    }

    /// Open a streaming insert
    ///
    /// Rows are uploaded as they are written but only become permanent
    /// once [`RowInserter::commit`] runs.
    pub async fn inserter(&self) -> Result<RowInserter, StoreError> {
        let insert: Insert<LogEntryRow> = self.client.insert(&self.table).await?;
        Ok(RowInserter { insert, rows: 0 })
    }

    /// Fetch rows as a cursor, optionally capped at `limit` rows
    ///
    /// `None` streams the entire table.
    pub fn fetch_logs(&self, limit: Option<u64>) -> Result<LogCursor, StoreError> {
        let cursor = match limit {
            Some(n) => self
                .client
                .query(&format!("SELECT ?fields FROM {} LIMIT ?", self.table))
                .bind(n)
                .fetch::<LogEntryRow>()?,
            None => self
                .client
                .query(&format!("SELECT ?fields FROM {}", self.table))
                .fetch::<LogEntryRow>()?,
        };

        Ok(LogCursor { inner: cursor })
    }

    /// Total number of rows in the table
    pub async fn count(&self) -> Result<u64, StoreError> {
        let count = self
            .client
            .query(&format!("SELECT count() FROM {}", self.table))
            .fetch_one::<u64>()
            .await?;
        Ok(count)
    }

    /// Bytes the table occupies on disk, summed over active parts
    pub async fn bytes_on_disk(&self) -> Result<u64, StoreError> {
        let bytes = self
            .client
            .query(
                "SELECT sum(bytes_on_disk) FROM system.parts \
                 WHERE database = currentDatabase() AND table = ? AND active",
            )
            .bind(&self.table)
            .fetch_one::<u64>()
            .await?;
        Ok(bytes)
    }

    /// Oldest and newest timestamps in the table
    ///
    /// An empty table reports the epoch for both ends.
    pub async fn date_range(&self) -> Result<TimeRange, StoreError> {
        let row = self
            .client
            .query(&format!(
                "SELECT toUnixTimestamp(min(timestamp)) AS min_time, \
                 toUnixTimestamp(max(timestamp)) AS max_time FROM {}",
                self.table
            ))
            .fetch_one::<TimeRangeRow>()
            .await?;

        Ok(TimeRange {
            min_time: epoch_to_naive(row.min_time),
            max_time: epoch_to_naive(row.max_time),
        })
    }

    /// Most recent rows for one client IP, newest first
    pub async fn recent_for_ip(&self, ip: &str, limit: u64) -> Result<Vec<LogRow>, StoreError> {
        let rows = self
            .client
            .query(&format!(
                "SELECT ?fields FROM {} WHERE ip = ? ORDER BY timestamp DESC LIMIT ?",
                self.table
            ))
            .bind(ip)
            .bind(limit)
            .fetch_all::<LogEntryRow>()
            .await?;

        Ok(rows.into_iter().map(LogEntryRow::into_log_row).collect())
    }
}

// `clickhouse::Client` is not `Debug`, so derive is unavailable
impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

fn epoch_to_naive(secs: u32) -> NaiveDateTime {
    DateTime::from_timestamp(i64::from(secs), 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}

/// Result of [`LogStore::date_range`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub min_time: NaiveDateTime,
    pub max_time: NaiveDateTime,
}

#[derive(Row, Deserialize)]
struct TimeRangeRow {
    min_time: u32,
    max_time: u32,
}

// =============================================================================
// Streaming Insert
// =============================================================================

/// Open streaming insert into the access-log table
///
/// Dropping the inserter without calling [`commit`](Self::commit)
/// abandons the upload and no rows land.
pub struct RowInserter {
    insert: Insert<LogEntryRow>,
    rows: u64,
}

impl RowInserter {
    /// Append one row to the insert
    pub async fn write(&mut self, row: &LogRow) -> Result<(), StoreError> {
        self.insert.write(&LogEntryRow::from(row)).await?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Finalize the insert
    pub async fn commit(self) -> Result<u64, StoreError> {
        self.insert.end().await?;
        Ok(self.rows)
    }
}

// =============================================================================
// Read Cursor
// =============================================================================

/// Incremental reader over fetched rows
pub struct LogCursor {
    inner: RowCursor<LogEntryRow>,
}

impl LogCursor {
    /// Next row, or `None` when the result set is exhausted
    pub async fn next(&mut self) -> Result<Option<LogRow>, StoreError> {
        Ok(self.inner.next().await?.map(LogEntryRow::into_log_row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_keeps_configured_table() {
        let config = ClickHouseConfig::default().with_table("access_logs");
        let store = LogStore::new(&config).unwrap();
        assert_eq!(store.table(), "access_logs");
    }

    #[test]
    fn test_unsafe_table_name_rejected_at_construction() {
        let config = ClickHouseConfig::default().with_table("logs; DROP TABLE logs");
        let err = LogStore::new(&config).unwrap_err();
        assert!(matches!(err, StoreError::UnsafeIdentifier(_)));
    }

    #[test]
    fn test_epoch_to_naive() {
        let dt = epoch_to_naive(0);
        assert_eq!(dt, NaiveDateTime::default());

        let dt = epoch_to_naive(1_705_314_645);
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-01-15 10:30:45");
    }
}
