//! Export pipeline for Logtide
//!
//! Streams access-log rows out of ClickHouse as CSV or Parquet without
//! ever holding the full result set in memory. A cursor pump on the
//! async side feeds a blocking encode stage through bounded channels;
//! the encode stage batches rows, appends each batch to a format
//! encoder, and re-chunks the encoded bytes for transport.
//!
//! # Buffered vs. direct
//!
//! Each job decides once, up front, how to deliver the result:
//!
//! - **Buffered**: the encoded output is drained to a temp file first
//!   and served from disk with a known Content-Length. Chosen for
//!   bounded exports small enough to fit the storage budget.
//! - **Direct**: encoded chunks are streamed straight to the client.
//!   Chosen for unbounded exports and anything over the budget.
//!
//! Temp files are tracked in a [`TempRegistry`] and removed exactly
//! once when the response finishes, whether it completed, failed, or
//! the client disconnected.

mod budget;
mod coordinator;
mod encoder;
mod error;
mod schema;
mod temp;

pub use budget::{
    FLOOR_ROW_LIMIT, ROW_COST_BYTES, SAFETY_MARGIN_BYTES, default_row_limit, row_limit_for_space,
};
pub use coordinator::{
    ExportCoordinator, ExportFormat, ExportMode, ExportOptions, ExportOutput, choose_mode,
};
pub use encoder::{BatchEncoder, DelimitedEncoder, ParquetEncoder};
pub use error::ExportError;
pub use schema::{log_schema, rows_to_record_batch};
pub use temp::{GuardedStream, TempFileGuard, TempRegistry, sweep_orphans};
