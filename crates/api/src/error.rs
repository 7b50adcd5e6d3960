//! API error responses
//!
//! Every failure leaves the API as a `{status, message}` JSON envelope
//! with a matching HTTP status. Handlers bubble domain errors up with
//! `?`; conversion and logging happen once, here.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use logtide_export::ExportError;
use logtide_ingest::IngestError;
use logtide_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request parameters
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The store cannot be reached
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Store query failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Ingest job failed
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Export job failed
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ApiError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            // a body that stops short is the client's failure, not ours
            Self::Ingest(IngestError::Read(_)) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Ingest(_) | Self::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always "error"
    pub status: &'static str,
    /// Human-readable failure description
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            status: "error",
            message: self.to_string(),
        };

        tracing::warn!(
            status = %status,
            message = %body.message,
            "API error"
        );

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type Result<T> = std::result::Result<T, ApiError>;
