//! Logtide HTTP API
//!
//! REST surface over the ingest, export and store crates, built on
//! Axum. One [`AppState`] is shared across all handlers.
//!
//! # Usage
//!
//! ```ignore
//! use logtide_api::{AppState, build_router};
//!
//! let state = AppState::new(store, ingest, exports);
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! # Endpoints
//!
//! ## Import
//! - `POST /api/import/apache_log` - Ingest a raw access log body
//!
//! ## Export
//! - `GET /api/export/csv/{limit}` - Download rows as CSV (0 = all)
//! - `GET /api/export/parquet/{limit}` - Download rows as Parquet (0 = all)
//!
//! ## Store status
//! - `GET /api/db/db_size` - Row count and on-disk size
//! - `GET /api/db/get_date_range` - Oldest and newest timestamps
//! - `GET /api/details/ip/{ip}` - Recent rows for one client IP
//!
//! ## Operations
//! - `GET /health` - Liveness and store reachability

pub mod error;
pub mod routes;
pub mod state;

// Re-exports
pub use error::{ApiError, Result};
pub use routes::build_router;
pub use state::AppState;
