//! Parsed log row

use chrono::NaiveDateTime;

/// One parsed access-log entry.
///
/// Fields mirror the storage schema one-to-one. Integer fields are `i32`
/// because the columnar export schema carries them as 32-bit integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    /// Client address, first token of the line
    pub ip: String,
    /// Request instant, with the fixed UTC-offset suffix already stripped
    pub timestamp: NaiveDateTime,
    /// HTTP method from the quoted request line
    pub method: String,
    /// Request path
    pub path: String,
    /// Protocol version, e.g. `HTTP/1.1`
    pub protocol: String,
    /// Three-digit response status
    pub status: i32,
    /// Response body size; `0` when the log records `-`
    pub bytes_sent: i32,
    /// Referrer header value as logged, may be `-` or empty
    pub referrer: String,
    /// User-Agent header value as logged
    pub user_agent: String,
    /// Upstream response time, the trailing numeric field
    pub response_time: i32,
}
