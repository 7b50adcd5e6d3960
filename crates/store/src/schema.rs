//! ClickHouse schema definitions
//!
//! Embedded SQL templates for the access-log table, plus the identifier
//! check that gates every name substituted into them. Identifiers cannot
//! be bound as query parameters, so anything interpolated into SQL text
//! must pass [`validate_identifier`] first.

use crate::config::ClickHouseConfig;
use crate::error::StoreError;

/// Reject names that are not plain `[A-Za-z_][A-Za-z0-9_]*` identifiers
/// of at most 64 characters.
pub(crate) fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let plain = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.chars().next().map_or(true, |c| c.is_ascii_digit());

    if plain {
        Ok(())
    } else {
        Err(StoreError::UnsafeIdentifier(name.to_string()))
    }
}

/// Generate CREATE DATABASE statement
pub fn create_database_sql(database: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS {database}")
}

/// Generate CREATE TABLE statement for the access-log table
pub fn create_table_sql(database: &str, table: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {database}.{table} (
    ip String,
    timestamp DateTime,
    method String,
    path String,
    protocol String,
    status Int32,
    bytes_sent Int32,
    referrer String,
    user_agent String,
    response_time Int32
) ENGINE = MergeTree()
ORDER BY timestamp
COMMENT 'Apache access log rows'"#
    )
}

/// Create the database and access-log table if they do not exist
///
/// Safe to call repeatedly; both statements are `IF NOT EXISTS`.
pub async fn ensure_schema(config: &ClickHouseConfig) -> Result<(), StoreError> {
    validate_identifier(&config.database)?;
    validate_identifier(&config.table)?;

    let client = config.build_admin_client();

    client
        .query(&create_database_sql(&config.database))
        .execute()
        .await?;

    client
        .query(&create_table_sql(&config.database, &config.table))
        .execute()
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier("logs").is_ok());
        assert!(validate_identifier("access_logs_2024").is_ok());
        assert!(validate_identifier("_staging").is_ok());

        for bad in ["", "logs; DROP TABLE logs", "logs-v2", "1logs", "system.parts"] {
            let err = validate_identifier(bad).unwrap_err();
            assert!(matches!(err, StoreError::UnsafeIdentifier(ref n) if n == bad));
        }
        assert!(validate_identifier(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_create_database_is_idempotent() {
        let sql = create_database_sql("weblogs");
        assert_eq!(sql, "CREATE DATABASE IF NOT EXISTS weblogs");
    }

    #[test]
    fn test_create_table_columns() {
        let sql = create_table_sql("weblogs", "logs");

        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS weblogs.logs"));
        for column in [
            "ip String",
            "timestamp DateTime",
            "method String",
            "path String",
            "protocol String",
            "status Int32",
            "bytes_sent Int32",
            "referrer String",
            "user_agent String",
            "response_time Int32",
        ] {
            assert!(sql.contains(column), "missing column: {column}");
        }
        assert!(sql.contains("ENGINE = MergeTree()"));
        assert!(sql.contains("ORDER BY timestamp"));
    }
}
