//! Export pipeline errors

use std::io;

use logtide_store::StoreError;
use logtide_stream::BatchSizeError;

/// Errors from the export pipeline
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Rows do not fit the fixed columnar schema
    #[error("columnar schema mismatch: {0}")]
    SchemaMismatch(#[from] arrow::error::ArrowError),

    /// Parquet serialization error
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Reading rows from the store failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Temp file or transport I/O error
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Rejected batch size
    #[error(transparent)]
    InvalidBatchSize(#[from] BatchSizeError),

    /// Append after the writer was finalized
    #[error("encoder already closed")]
    EncoderClosed,
}

impl ExportError {
    /// Wrap into an `io::Error` for transport through `Read` adapters.
    ///
    /// [`from_io`](Self::from_io) recovers the original variant on the
    /// other side.
    pub(crate) fn into_io(self) -> io::Error {
        match self {
            ExportError::Io(e) => e,
            other => io::Error::other(other),
        }
    }

    /// Recover an `ExportError` smuggled through [`into_io`](Self::into_io).
    pub(crate) fn from_io(err: io::Error) -> Self {
        match err.downcast::<ExportError>() {
            Ok(inner) => inner,
            Err(err) => ExportError::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_round_trip_preserves_variant() {
        let err = ExportError::EncoderClosed;
        let recovered = ExportError::from_io(err.into_io());
        assert!(matches!(recovered, ExportError::EncoderClosed));
    }

    #[test]
    fn test_plain_io_error_survives() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe");
        let recovered = ExportError::from_io(io_err);
        match recovered {
            ExportError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
