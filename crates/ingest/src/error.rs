//! Ingest failure modes

use std::io;

use logtide_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The store rejected the streaming insert or a count query failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The request body could not be read
    #[error("failed to read ingest body: {0}")]
    Read(#[from] io::Error),

    /// A pipeline stage panicked or was cancelled
    #[error("ingest stage failed: {0}")]
    Stage(#[from] tokio::task::JoinError),
}
