//! Application state
//!
//! Shared state for API handlers: the store plus the ingest and export
//! coordinators running against it.

use std::sync::Arc;

use logtide_export::ExportCoordinator;
use logtide_ingest::IngestCoordinator;
use logtide_store::LogStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Direct store handle for status queries
    pub store: LogStore,
    /// Ingest pipeline
    pub ingest: Arc<IngestCoordinator>,
    /// Export pipeline
    pub exports: Arc<ExportCoordinator>,
}

impl AppState {
    pub fn new(store: LogStore, ingest: IngestCoordinator, exports: ExportCoordinator) -> Self {
        Self {
            store,
            ingest: Arc::new(ingest),
            exports: Arc::new(exports),
        }
    }
}
