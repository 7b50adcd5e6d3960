//! Operations routes
//!
//! Liveness endpoint for monitoring. Does not require the /api prefix.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server status
    pub status: &'static str,
}

/// Operations routes (health)
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

/// Health check endpoint
///
/// GET /health
///
/// Returns 200 when the store answers a trivial query, 503 when it
/// does not.
async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state
        .store
        .ping()
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;

    Ok(Json(HealthResponse { status: "ok" }))
}
