//! ClickHouse storage for Logtide
//!
//! Owns the connection to ClickHouse and everything that touches the
//! access-log table: streaming inserts, cursor-based reads, and the
//! aggregate queries behind the stats endpoints.
//!
//! # Inserts
//!
//! [`LogStore::inserter`] opens a single streaming INSERT. Rows are
//! written one at a time and nothing is committed until
//! [`RowInserter::commit`] is called - dropping the inserter abandons
//! the upload, so a half-ingested request leaves no rows behind.
//!
//! # Reads
//!
//! [`LogStore::fetch_logs`] returns a [`LogCursor`] that pulls rows
//! incrementally instead of buffering the whole result set, which keeps
//! exports of large tables flat in memory.

mod config;
mod error;
mod row;
mod schema;
mod store;

pub use config::{ClickHouseConfig, DEFAULT_DATABASE, DEFAULT_TABLE, DEFAULT_URL};
pub use error::StoreError;
pub use row::LogEntryRow;
pub use schema::{create_database_sql, create_table_sql, ensure_schema};
pub use store::{LogCursor, LogStore, RowInserter, TimeRange};
