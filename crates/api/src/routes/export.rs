//! Export download routes
//!
//! # Routes
//!
//! - `GET /api/export/csv/{limit}` - Download rows as CSV
//! - `GET /api/export/parquet/{limit}` - Download rows as Parquet
//!
//! A `limit` of 0 exports the whole table. Small bounded exports are
//! served from a temp file with a known Content-Length; everything
//! else streams chunked as the pipeline encodes it.

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use logtide_export::{ExportFormat, ExportOutput, GuardedStream};
use logtide_stream::CHUNK_SIZE;
use tokio_util::io::ReaderStream;

use crate::error::ApiError;
use crate::state::AppState;

/// Export routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/export/csv/{limit}", get(export_csv))
        .route("/export/parquet/{limit}", get(export_parquet))
}

/// CSV download endpoint
///
/// GET /api/export/csv/{limit}
async fn export_csv(
    State(state): State<AppState>,
    Path(limit): Path<String>,
) -> Result<Response, ApiError> {
    run_export(&state, ExportFormat::Csv, &limit).await
}

/// Parquet download endpoint
///
/// GET /api/export/parquet/{limit}
async fn export_parquet(
    State(state): State<AppState>,
    Path(limit): Path<String>,
) -> Result<Response, ApiError> {
    run_export(&state, ExportFormat::Parquet, &limit).await
}

/// Run one export job and shape its output into a download response.
///
/// The limit arrives as a raw path segment so a bad value gets the
/// same `{status, message}` envelope as every other rejection.
async fn run_export(
    state: &AppState,
    format: ExportFormat,
    raw_limit: &str,
) -> Result<Response, ApiError> {
    let limit: u64 = raw_limit
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid row limit '{raw_limit}'")))?;

    let output = state.exports.run(format, limit).await?;

    let mut response = match output {
        ExportOutput::Buffered { file, guard, size } => {
            // the guard rides inside the body and deletes the temp
            // file when the response is done, delivered or not
            let reader = ReaderStream::with_capacity(file, CHUNK_SIZE);
            let mut response =
                Body::from_stream(GuardedStream::new(reader, guard)).into_response();
            response
                .headers_mut()
                .insert(header::CONTENT_LENGTH, HeaderValue::from(size));
            response
        }
        ExportOutput::Direct { chunks } => {
            let stream = futures::stream::unfold(chunks, |mut rx| async move {
                let chunk = rx.recv().await?;
                Some((chunk, rx))
            });
            Body::from_stream(stream).into_response()
        }
    };

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(format.content_type()),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static(format.content_disposition()),
    );

    Ok(response)
}
