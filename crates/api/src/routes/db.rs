//! Store status and drill-down routes
//!
//! # Routes
//!
//! - `GET /api/db/db_size` - Row count and on-disk size
//! - `GET /api/db/get_date_range` - Oldest and newest timestamps
//! - `GET /api/details/ip/{ip}` - Recent rows for one client IP

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Most rows one IP drill-down returns
const IP_DETAILS_LIMIT: u64 = 100;

/// Timestamp rendering for drill-down rows
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Response Types
// =============================================================================

/// Table size summary
#[derive(Debug, Serialize)]
pub struct DbSizeResponse {
    /// Always "success"
    pub status: &'static str,
    /// Rows in the log table
    pub count: u64,
    /// Bytes on disk, summed over active parts
    pub size: u64,
    /// `size` rendered for humans
    pub size_human: String,
}

/// Oldest and newest timestamps, as epoch seconds
#[derive(Debug, Serialize)]
pub struct DateRangeResponse {
    /// Always "success"
    pub status: &'static str,
    pub min_time: i64,
    pub max_time: i64,
}

/// One row of the per-IP drill-down
#[derive(Debug, Serialize)]
pub struct IpDetailRow {
    pub timestamp: String,
    pub method: String,
    pub path: String,
    pub status: i32,
    pub bytes_sent: i32,
    pub response_time: i32,
}

// =============================================================================
// Routes
// =============================================================================

/// Store status routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/db/db_size", get(db_size_handler))
        .route("/db/get_date_range", get(date_range_handler))
        .route("/details/ip/{ip}", get(ip_details_handler))
}

// =============================================================================
// Handlers
// =============================================================================

/// Table size endpoint
///
/// GET /api/db/db_size
async fn db_size_handler(State(state): State<AppState>) -> Result<Json<DbSizeResponse>, ApiError> {
    let count = state.store.count().await?;
    let size = state.store.bytes_on_disk().await?;

    Ok(Json(DbSizeResponse {
        status: "success",
        count,
        size,
        size_human: human_bytes(size),
    }))
}

/// Date range endpoint
///
/// GET /api/db/get_date_range
async fn date_range_handler(
    State(state): State<AppState>,
) -> Result<Json<DateRangeResponse>, ApiError> {
    let range = state.store.date_range().await?;

    Ok(Json(DateRangeResponse {
        status: "success",
        min_time: range.min_time.and_utc().timestamp(),
        max_time: range.max_time.and_utc().timestamp(),
    }))
}

/// Per-IP drill-down endpoint
///
/// GET /api/details/ip/{ip}
///
/// Returns the newest rows for one client IP as a bare array, ready
/// for direct table rendering.
async fn ip_details_handler(
    State(state): State<AppState>,
    Path(ip): Path<String>,
) -> Result<Json<Vec<IpDetailRow>>, ApiError> {
    let rows = state.store.recent_for_ip(&ip, IP_DETAILS_LIMIT).await?;

    let details = rows
        .into_iter()
        .map(|row| IpDetailRow {
            timestamp: row.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            method: row.method,
            path: row.path,
            status: row.status,
            bytes_sent: row.bytes_sent,
            response_time: row.response_time,
        })
        .collect();

    Ok(Json(details))
}

/// Render a byte count with binary units, two decimals
fn human_bytes(size: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

    if size < 1024 {
        return format!("{size} B");
    }

    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}
