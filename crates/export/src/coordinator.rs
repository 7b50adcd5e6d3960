//! Export job coordination
//!
//! One job = one cursor pump, one blocking encode stage, one delivery
//! mode. The pump pulls rows off the store cursor and feeds a bounded
//! channel; the encode stage batches them, runs the format encoder,
//! and re-chunks the output; delivery either drains the chunks to a
//! temp file (buffered) or hands the chunk channel to the response
//! (direct). Bounded channels put backpressure on the cursor: a slow
//! client slows the whole pipeline instead of ballooning memory.
//!
//! The buffering decision is made exactly once per job, from the row
//! limit and the configured or storage-derived threshold, and never
//! revisited.

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use logtide_parser::LogRow;
use logtide_store::{LogStore, StoreError};
use logtide_stream::{CHUNK_SIZE, ChannelIter, ChunkReader, batched};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::budget::default_row_limit;
use crate::encoder::{BatchEncoder, DelimitedEncoder, EncodedChunks, ParquetEncoder};
use crate::error::ExportError;
use crate::temp::{TEMP_PREFIX, TempFileGuard, TempRegistry};

/// Rows in flight between the cursor pump and the encode stage
const ROW_CHANNEL_DEPTH: usize = 1024;

/// Encoded chunks in flight between the encode stage and delivery
const CHUNK_CHANNEL_DEPTH: usize = 8;

/// Default rows per encoded batch
pub const DEFAULT_BATCH_ROWS: usize = 1000;

// =============================================================================
// Job Parameters
// =============================================================================

/// Output format of an export job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Parquet,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }

    /// Download file name for the Content-Disposition header
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Csv => "logs_data.csv",
            Self::Parquet => "logs_data.parquet",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Parquet => "application/octet-stream",
        }
    }

    /// Content-Disposition value for the download
    pub fn content_disposition(&self) -> &'static str {
        match self {
            Self::Csv => "attachment; filename=\"logs_data.csv\"",
            Self::Parquet => "attachment; filename=\"logs_data.parquet\"",
        }
    }

    fn build_encoder(&self) -> Result<Box<dyn BatchEncoder + Send>, ExportError> {
        match self {
            Self::Csv => Ok(Box::new(DelimitedEncoder::new())),
            Self::Parquet => Ok(Box::new(ParquetEncoder::new()?)),
        }
    }
}

/// Delivery mode, decided once at job start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Drain to a temp file, then serve from disk
    Buffered,
    /// Stream encoded chunks straight to the client
    Direct,
}

/// Pick the delivery mode for a job.
///
/// Bounded jobs within the threshold buffer; everything else streams.
/// `limit` of 0 means unbounded and always streams.
pub fn choose_mode(limit: u64, threshold: u64) -> ExportMode {
    if limit != 0 && limit <= threshold {
        ExportMode::Buffered
    } else {
        ExportMode::Direct
    }
}

/// Export tuning knobs
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Overrides the storage-derived buffering threshold when set
    pub row_limit_threshold: Option<u64>,

    /// Directory for buffered export temp files
    pub temp_dir: PathBuf,

    /// Rows per encoded batch
    pub batch_rows: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            row_limit_threshold: None,
            temp_dir: std::env::temp_dir(),
            batch_rows: DEFAULT_BATCH_ROWS,
        }
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Result of a finished (buffered) or started (direct) export job
#[derive(Debug)]
pub enum ExportOutput {
    /// Fully drained to a temp file; serve from disk with a known size.
    ///
    /// The guard deletes the file when the response body is dropped.
    Buffered {
        file: tokio::fs::File,
        guard: TempFileGuard,
        size: u64,
    },

    /// Encoded chunks arriving as the pipeline produces them
    Direct {
        chunks: mpsc::Receiver<io::Result<Bytes>>,
    },
}

/// Runs export jobs against one store
pub struct ExportCoordinator {
    store: LogStore,
    registry: Arc<TempRegistry>,
    options: ExportOptions,
}

impl ExportCoordinator {
    pub fn new(store: LogStore, registry: Arc<TempRegistry>, options: ExportOptions) -> Self {
        Self {
            store,
            registry,
            options,
        }
    }

    /// Buffering threshold for one job.
    ///
    /// A configured threshold wins; otherwise the temp directory's free
    /// space is probed, once per job.
    fn effective_threshold(&self) -> u64 {
        match self.options.row_limit_threshold {
            Some(threshold) => threshold,
            None => default_row_limit(&self.options.temp_dir),
        }
    }

    /// Run one export job. `limit` of 0 exports the whole table.
    pub async fn run(&self, format: ExportFormat, limit: u64) -> Result<ExportOutput, ExportError> {
        let threshold = self.effective_threshold();
        let mode = choose_mode(limit, threshold);

        tracing::debug!(
            format = format.as_str(),
            limit,
            threshold,
            mode = ?mode,
            "export job starting"
        );

        let chunks = self.spawn_pipeline(format, limit)?;

        match mode {
            ExportMode::Direct => Ok(ExportOutput::Direct { chunks }),
            ExportMode::Buffered => self.buffer_to_temp(format, chunks).await,
        }
    }

    /// Start the cursor pump and the blocking encode stage.
    fn spawn_pipeline(
        &self,
        format: ExportFormat,
        limit: u64,
    ) -> Result<mpsc::Receiver<io::Result<Bytes>>, ExportError> {
        let encoder = format.build_encoder()?;
        let limit = (limit != 0).then_some(limit);
        let batch_rows = self.options.batch_rows;

        let (row_tx, row_rx) = mpsc::channel(ROW_CHANNEL_DEPTH);
        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_CHANNEL_DEPTH);

        tokio::spawn(pump_rows(self.store.clone(), limit, row_tx));

        tokio::task::spawn_blocking(move || {
            if let Err(e) = encode_stage(row_rx, encoder, batch_rows, &chunk_tx) {
                // delivery recovers the typed error from the final chunk
                let _ = chunk_tx.blocking_send(Err(e.into_io()));
            }
        });

        Ok(chunk_rx)
    }

    /// Drain the chunk channel into a fresh temp file.
    ///
    /// Any failure drops the guard before returning, which removes the
    /// partial file.
    async fn buffer_to_temp(
        &self,
        format: ExportFormat,
        mut chunks: mpsc::Receiver<io::Result<Bytes>>,
    ) -> Result<ExportOutput, ExportError> {
        tokio::fs::create_dir_all(&self.options.temp_dir).await?;

        let path = self.options.temp_dir.join(format!(
            "{TEMP_PREFIX}{}.{}",
            Uuid::new_v4(),
            format.as_str()
        ));
        let guard = TempFileGuard::new(path.clone(), Arc::clone(&self.registry));

        let mut file = tokio::fs::File::create(&path).await?;
        let mut size = 0u64;

        while let Some(chunk) = chunks.recv().await {
            let bytes = chunk.map_err(ExportError::from_io)?;
            file.write_all(&bytes).await?;
            size += bytes.len() as u64;
        }
        file.flush().await?;
        drop(file);

        let file = tokio::fs::File::open(&path).await?;
        tracing::debug!(path = %path.display(), size, "export buffered to temp file");

        Ok(ExportOutput::Buffered { file, guard, size })
    }
}

// =============================================================================
// Pipeline Stages
// =============================================================================

/// Async stage: pull rows off the store cursor into the row channel.
async fn pump_rows(
    store: LogStore,
    limit: Option<u64>,
    tx: mpsc::Sender<Result<LogRow, StoreError>>,
) {
    let mut cursor = match store.fetch_logs(limit) {
        Ok(cursor) => cursor,
        Err(e) => {
            let _ = tx.send(Err(e)).await;
            return;
        }
    };

    loop {
        match cursor.next().await {
            Ok(Some(row)) => {
                if tx.send(Ok(row)).await.is_err() {
                    // encode stage is gone, job was aborted downstream
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                break;
            }
        }
    }
}

/// Blocking stage: batch rows, encode them, re-chunk for transport.
///
/// A dropped chunk receiver means the client went away; the stage
/// stops quietly and the abandoned cursor unwinds from there.
fn encode_stage(
    rows: mpsc::Receiver<Result<LogRow, StoreError>>,
    encoder: Box<dyn BatchEncoder + Send>,
    batch_rows: usize,
    chunks: &mpsc::Sender<io::Result<Bytes>>,
) -> Result<(), ExportError> {
    let mut stream_failure: Option<StoreError> = None;
    let rows = ChannelIter::new(rows).map_while(|res| match res {
        Ok(row) => Some(row),
        Err(e) => {
            stream_failure = Some(e);
            None
        }
    });

    let batches = batched(rows, batch_rows)?;
    let mut reader = ChunkReader::new(EncodedChunks::new(batches, encoder));

    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).map_err(ExportError::from_io)?;
        if n == 0 {
            break;
        }
        if chunks
            .blocking_send(Ok(Bytes::copy_from_slice(&buf[..n])))
            .is_err()
        {
            return Ok(());
        }
    }
    drop(reader);

    match stream_failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
