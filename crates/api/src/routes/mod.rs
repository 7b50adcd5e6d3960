//! API routes
//!
//! Domain-grouped HTTP route handlers.

pub mod db;
pub mod export;
pub mod import;
pub mod ops;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router
pub fn build_router(state: AppState) -> Router {
    let api_routes = import::routes().merge(export::routes()).merge(db::routes());

    Router::new()
        // Operations routes (health - outside the /api prefix)
        .merge(ops::routes())
        // Ingest, export and status surface
        .nest("/api", api_routes)
        .with_state(state)
}
