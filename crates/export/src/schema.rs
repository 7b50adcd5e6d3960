//! Arrow schema for the access-log export
//!
//! Fixed schema shared by every Parquet export job. Column order matches
//! the store table; `timestamp` is narrowed to a 32-bit date for
//! day-granularity analytics downstream.

use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Int32Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use chrono::NaiveDate;
use logtide_parser::LogRow;

/// Create the Arrow schema for access-log rows
pub fn log_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("ip", DataType::Utf8, false),
        Field::new("timestamp", DataType::Date32, false),
        Field::new("method", DataType::Utf8, false),
        Field::new("path", DataType::Utf8, false),
        Field::new("protocol", DataType::Utf8, false),
        Field::new("status", DataType::Int32, false),
        Field::new("bytes_sent", DataType::Int32, false),
        Field::new("referrer", DataType::Utf8, false),
        Field::new("user_agent", DataType::Utf8, false),
        Field::new("response_time", DataType::Int32, false),
    ]))
}

/// Convert access-log rows to an Arrow RecordBatch
///
/// Column arrays are built in schema field order.
pub fn rows_to_record_batch(
    rows: &[LogRow],
    schema: Arc<Schema>,
) -> Result<RecordBatch, arrow::error::ArrowError> {
    let len = rows.len();

    let mut ips = Vec::with_capacity(len);
    let mut timestamps = Vec::with_capacity(len);
    let mut methods = Vec::with_capacity(len);
    let mut paths = Vec::with_capacity(len);
    let mut protocols = Vec::with_capacity(len);
    let mut statuses = Vec::with_capacity(len);
    let mut bytes_sent = Vec::with_capacity(len);
    let mut referrers = Vec::with_capacity(len);
    let mut user_agents = Vec::with_capacity(len);
    let mut response_times = Vec::with_capacity(len);

    for row in rows {
        ips.push(row.ip.as_str());
        timestamps.push(days_since_epoch(row.timestamp.date()));
        methods.push(row.method.as_str());
        paths.push(row.path.as_str());
        protocols.push(row.protocol.as_str());
        statuses.push(row.status);
        bytes_sent.push(row.bytes_sent);
        referrers.push(row.referrer.as_str());
        user_agents.push(row.user_agent.as_str());
        response_times.push(row.response_time);
    }

    // Create Arrow arrays (must match schema field order)
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(ips)),           // 0: ip
        Arc::new(Date32Array::from(timestamps)),    // 1: timestamp
        Arc::new(StringArray::from(methods)),       // 2: method
        Arc::new(StringArray::from(paths)),         // 3: path
        Arc::new(StringArray::from(protocols)),     // 4: protocol
        Arc::new(Int32Array::from(statuses)),       // 5: status
        Arc::new(Int32Array::from(bytes_sent)),     // 6: bytes_sent
        Arc::new(StringArray::from(referrers)),     // 7: referrer
        Arc::new(StringArray::from(user_agents)),   // 8: user_agent
        Arc::new(Int32Array::from(response_times)), // 9: response_time
    ];

    RecordBatch::try_new(schema, columns)
}

/// Date32 value: whole days since 1970-01-01
fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use chrono::NaiveDate;

    fn sample_row() -> LogRow {
        LogRow {
            ip: "10.0.0.1".into(),
            timestamp: NaiveDate::from_ymd_opt(2023, 10, 10)
                .unwrap()
                .and_hms_opt(13, 55, 36)
                .unwrap(),
            method: "GET".into(),
            path: "/x".into(),
            protocol: "HTTP/1.1".into(),
            status: 200,
            bytes_sent: 1024,
            referrer: "-".into(),
            user_agent: "UA".into(),
            response_time: 42,
        }
    }

    #[test]
    fn test_schema_fields() {
        let schema = log_schema();
        assert_eq!(schema.fields().len(), 10);

        assert_eq!(schema.field(0).name(), "ip");
        assert_eq!(schema.field(1).name(), "timestamp");
        assert_eq!(schema.field(2).name(), "method");
        assert_eq!(schema.field(3).name(), "path");
        assert_eq!(schema.field(4).name(), "protocol");
        assert_eq!(schema.field(5).name(), "status");
        assert_eq!(schema.field(6).name(), "bytes_sent");
        assert_eq!(schema.field(7).name(), "referrer");
        assert_eq!(schema.field(8).name(), "user_agent");
        assert_eq!(schema.field(9).name(), "response_time");

        assert_eq!(schema.field(1).data_type(), &DataType::Date32);
        assert_eq!(schema.field(5).data_type(), &DataType::Int32);
    }

    #[test]
    fn test_rows_to_record_batch() {
        let rows = vec![sample_row(), sample_row()];
        let batch = rows_to_record_batch(&rows, log_schema()).unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 10);

        let ips = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(ips.value(0), "10.0.0.1");

        let statuses = batch
            .column(5)
            .as_any()
            .downcast_ref::<Int32Array>()
            .unwrap();
        assert_eq!(statuses.value(0), 200);
    }

    #[test]
    fn test_timestamp_becomes_days_since_epoch() {
        let batch = rows_to_record_batch(&[sample_row()], log_schema()).unwrap();

        let dates = batch
            .column(1)
            .as_any()
            .downcast_ref::<Date32Array>()
            .unwrap();

        let expected = (NaiveDate::from_ymd_opt(2023, 10, 10).unwrap() - NaiveDate::default())
            .num_days() as i32;
        assert_eq!(dates.value(0), expected);
    }

    #[test]
    fn test_empty_batch() {
        let batch = rows_to_record_batch(&[], log_schema()).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 10);
    }
}
