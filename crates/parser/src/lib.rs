//! Access-log line parsing
//!
//! [`AccessLogParser`] turns one raw access-log line into a [`LogRow`] or
//! rejects it. Rejection is a filtering decision, not an error: malformed
//! lines are dropped and the pipeline continues. A row is either fully
//! populated or never emitted.

mod parser;
mod row;

pub use parser::AccessLogParser;
pub use row::LogRow;
