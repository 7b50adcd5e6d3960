//! Wire representation of an access-log row
//!
//! [`LogEntryRow`] mirrors the ClickHouse table column-for-column and is
//! what travels in RowBinary. The parser-facing [`LogRow`] keeps a
//! `NaiveDateTime`; on the wire a `DateTime` column is epoch seconds.

use chrono::DateTime;
use clickhouse::Row;
use logtide_parser::LogRow;
use serde::{Deserialize, Serialize};

/// One row of the access-log table
#[derive(Debug, Clone, PartialEq, Eq, Row, Serialize, Deserialize)]
pub struct LogEntryRow {
    pub ip: String,
    /// Epoch seconds (ClickHouse `DateTime`)
    pub timestamp: u32,
    pub method: String,
    pub path: String,
    pub protocol: String,
    pub status: i32,
    pub bytes_sent: i32,
    pub referrer: String,
    pub user_agent: String,
    pub response_time: i32,
}

impl LogEntryRow {
    /// Convert back into the parser-level row
    pub fn into_log_row(self) -> LogRow {
        let timestamp = DateTime::from_timestamp(i64::from(self.timestamp), 0)
            .map(|dt| dt.naive_utc())
            .unwrap_or_default();

        LogRow {
            ip: self.ip,
            timestamp,
            method: self.method,
            path: self.path,
            protocol: self.protocol,
            status: self.status,
            bytes_sent: self.bytes_sent,
            referrer: self.referrer,
            user_agent: self.user_agent,
            response_time: self.response_time,
        }
    }
}

impl From<&LogRow> for LogEntryRow {
    fn from(row: &LogRow) -> Self {
        // DateTime columns cannot represent pre-epoch values
        let timestamp = u32::try_from(row.timestamp.and_utc().timestamp()).unwrap_or(0);

        Self {
            ip: row.ip.clone(),
            timestamp,
            method: row.method.clone(),
            path: row.path.clone(),
            protocol: row.protocol.clone(),
            status: row.status,
            bytes_sent: row.bytes_sent,
            referrer: row.referrer.clone(),
            user_agent: row.user_agent.clone(),
            response_time: row.response_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_row() -> LogRow {
        LogRow {
            ip: "192.168.1.1".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 45)
                .unwrap(),
            method: "GET".into(),
            path: "/index.html".into(),
            protocol: "HTTP/1.1".into(),
            status: 200,
            bytes_sent: 1234,
            referrer: "-".into(),
            user_agent: "Mozilla/5.0".into(),
            response_time: 150,
        }
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let row = sample_row();
        let entry = LogEntryRow::from(&row);
        assert_eq!(entry.into_log_row(), row);
    }

    #[test]
    fn test_timestamp_is_epoch_seconds() {
        let row = sample_row();
        let entry = LogEntryRow::from(&row);
        assert_eq!(i64::from(entry.timestamp), row.timestamp.and_utc().timestamp());
    }

    #[test]
    fn test_pre_epoch_timestamp_clamps_to_zero() {
        let mut row = sample_row();
        row.timestamp = NaiveDate::from_ymd_opt(1960, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let entry = LogEntryRow::from(&row);
        assert_eq!(entry.timestamp, 0);
    }
}
