//! Line grammar and field extraction

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::LogRow;

#[cfg(test)]
#[path = "parser_test.rs"]
mod parser_test;

/// Timestamp layout inside the brackets, after the offset suffix is removed.
const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S";

/// Combined-format access line with a trailing response-time field.
///
/// The quoted request must split into exactly three tokens, the status must
/// be three digits and the UTC offset must be present and fixed-width;
/// anything else fails the whole match.
static LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<ip>\S+) - - \[(?P<timestamp>[^ \]]+) (?P<offset>[+-]\d{4})\] "(?P<method>\S+) (?P<path>\S+) (?P<protocol>\S+)" (?P<status>\d{3}) (?P<bytes>\S+) "(?P<referrer>[^"]*)" "(?P<user_agent>[^"]*)" (?P<response_time>\d+)$"#,
    )
    .unwrap()
});

/// Parser for the fixed access-log grammar.
///
/// `parse` is pure and deterministic. Construction is free, the grammar is
/// compiled once per process.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLogParser;

impl AccessLogParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one line.
    ///
    /// `None` means the line does not belong in the store; callers drop it
    /// and continue. The offset group is validated by the grammar and then
    /// discarded: the logs carry one fixed offset, so the naive instant is
    /// stored as-is.
    pub fn parse(&self, line: &str) -> Option<LogRow> {
        let caps = LINE.captures(line.trim())?;

        let timestamp =
            NaiveDateTime::parse_from_str(&caps["timestamp"], TIMESTAMP_FORMAT).ok()?;
        let status = caps["status"].parse().ok()?;
        let response_time = caps["response_time"].parse().ok()?;
        // non-numeric size tokens ("-") are recorded as zero bytes
        let bytes_sent = caps["bytes"].parse().unwrap_or(0);

        Some(LogRow {
            ip: caps["ip"].to_string(),
            timestamp,
            method: caps["method"].to_string(),
            path: caps["path"].to_string(),
            protocol: caps["protocol"].to_string(),
            status,
            bytes_sent,
            referrer: caps["referrer"].to_string(),
            user_agent: caps["user_agent"].to_string(),
            response_time,
        })
    }
}
