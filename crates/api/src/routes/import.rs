//! Log import routes
//!
//! # Routes
//!
//! - `POST /api/import/apache_log` - Ingest a raw access log body

use std::io;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::routing::post;
use axum::{Json, Router};
use futures::TryStreamExt;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Import summary returned on success
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Always "success"
    pub status: &'static str,
    /// Lines taken off the upload
    pub lines_read: u64,
    /// Rows committed to the store
    pub rows_inserted: u64,
    /// Lines the grammar rejected
    pub rows_skipped: u64,
}

/// Import routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/import/apache_log", post(import_apache_log))
}

/// Ingest an Apache access log
///
/// POST /api/import/apache_log
///
/// The raw log file is the request body. Content-Length is required:
/// without it a truncated upload is indistinguishable from a complete
/// one, so such requests are rejected before any row is written.
async fn import_apache_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<ImportResponse>, ApiError> {
    if !headers.contains_key(header::CONTENT_LENGTH) {
        return Err(ApiError::BadRequest(
            "Content-Length header is required".to_string(),
        ));
    }

    let stream = body.into_data_stream().map_err(io::Error::other);
    let report = state.ingest.ingest_stream(stream).await?;

    Ok(Json(ImportResponse {
        status: "success",
        lines_read: report.lines_read,
        rows_inserted: report.rows_inserted,
        rows_skipped: report.rows_skipped,
    }))
}
