//! Ingest job coordination
//!
//! One upload = one body pump, one blocking parse stage, one streaming
//! insert. The pump moves body chunks into a bounded channel; the parse
//! stage reassembles lines across chunk boundaries, runs the grammar
//! and forwards surviving rows; this task writes them to the store and
//! commits once the whole body has been consumed. An aborted upload
//! never commits: the insert is dropped with everything it buffered.

use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use logtide_parser::{AccessLogParser, LogRow};
use logtide_store::LogStore;
use logtide_stream::{CHUNK_SIZE, ChannelIter, ChunkReader};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::io::ReaderStream;

use crate::error::IngestError;

/// Body chunks in flight between the pump and the parse stage
const CHUNK_CHANNEL_DEPTH: usize = 8;

/// Parsed rows in flight between the parse stage and the insert
const ROW_CHANNEL_DEPTH: usize = 1024;

/// Log a progress line every this many input lines
const PROGRESS_INTERVAL: u64 = 100_000;

// =============================================================================
// Job Parameters
// =============================================================================

/// Ingest tuning knobs
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// How often to re-check the row count after a commit
    pub poll_interval: Duration,

    /// Stop confirming visibility after this long
    pub poll_timeout: Duration,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            poll_timeout: Duration::from_secs(30),
        }
    }
}

/// Outcome of one finished ingest job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Lines taken off the body, parsed or not
    pub lines_read: u64,

    /// Rows the store accepted and committed
    pub rows_inserted: u64,

    /// Lines the grammar rejected
    pub rows_skipped: u64,
}

/// Per-stage counters, folded into the report after the commit
#[derive(Debug, Default)]
struct ParseStats {
    lines_read: u64,
    rows_skipped: u64,
}

// =============================================================================
// Coordinator
// =============================================================================

/// Runs ingest jobs against one store
pub struct IngestCoordinator {
    store: LogStore,
    options: IngestOptions,
}

impl IngestCoordinator {
    pub fn new(store: LogStore, options: IngestOptions) -> Self {
        Self { store, options }
    }

    /// Ingest an access log from a local file.
    pub async fn ingest_file(&self, path: &Path) -> Result<IngestReport, IngestError> {
        let file = tokio::fs::File::open(path).await?;
        self.ingest_stream(ReaderStream::with_capacity(file, CHUNK_SIZE))
            .await
    }

    /// Ingest an access log from a chunked byte stream.
    ///
    /// The insert commits only after the stream ends cleanly; any read
    /// or parse-stage failure drops it uncommitted.
    pub async fn ingest_stream<S>(&self, body: S) -> Result<IngestReport, IngestError>
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        let count_before = self.store.count().await?;

        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_CHANNEL_DEPTH);
        let (row_tx, mut row_rx) = mpsc::channel(ROW_CHANNEL_DEPTH);

        let pump = tokio::spawn(async move {
            let mut body = std::pin::pin!(body);
            while let Some(chunk) = body.next().await {
                if chunk_tx.send(chunk).await.is_err() {
                    // parse stage is gone, job was aborted downstream
                    break;
                }
            }
        });
        let parse = tokio::task::spawn_blocking(move || parse_stage(chunk_rx, row_tx));

        let mut inserter = self.store.inserter().await?;
        while let Some(row) = row_rx.recv().await {
            if let Err(e) = inserter.write(&row).await {
                tracing::error!(error = %e, "log store rejected a row write");
                return Err(e.into());
            }
        }

        // surface read errors before committing anything
        let stats = parse.await??;
        pump.await?;

        let rows_inserted = match inserter.commit().await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = %e, "log store rejected the insert commit");
                return Err(e.into());
            }
        };

        if rows_inserted > 0 {
            self.wait_for_visibility(count_before).await;
        }

        let report = IngestReport {
            lines_read: stats.lines_read,
            rows_inserted,
            rows_skipped: stats.rows_skipped,
        };
        tracing::info!(
            lines = report.lines_read,
            inserted = report.rows_inserted,
            skipped = report.rows_skipped,
            "ingest finished"
        );
        Ok(report)
    }

    /// Poll the row count until the committed insert shows up.
    ///
    /// Confirmation is best-effort. The commit already succeeded, so a
    /// poll failure or timeout is logged and the job still reports
    /// success.
    async fn wait_for_visibility(&self, count_before: u64) {
        let deadline = Instant::now() + self.options.poll_timeout;
        loop {
            match self.store.count().await {
                Ok(count) if count != count_before => {
                    tracing::debug!(count, "inserted rows are visible");
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "count poll failed while confirming insert");
                    return;
                }
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    timeout = ?self.options.poll_timeout,
                    "inserted rows not visible before timeout"
                );
                return;
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }
}

// =============================================================================
// Parse Stage
// =============================================================================

/// Blocking stage: reassemble lines from body chunks and parse them.
///
/// Lines the grammar rejects are counted and dropped. A dropped row
/// receiver means the insert side bailed out; the stage stops quietly.
fn parse_stage(
    chunks: mpsc::Receiver<io::Result<Bytes>>,
    rows: mpsc::Sender<LogRow>,
) -> Result<ParseStats, io::Error> {
    let parser = AccessLogParser::new();
    let reader = BufReader::with_capacity(CHUNK_SIZE, ChunkReader::new(ChannelIter::new(chunks)));

    let mut stats = ParseStats::default();
    for line in reader.lines() {
        let line = line?;
        stats.lines_read += 1;
        if stats.lines_read % PROGRESS_INTERVAL == 0 {
            tracing::info!(lines = stats.lines_read, "ingest progress");
        }
        match parser.parse(&line) {
            Some(row) => {
                if rows.blocking_send(row).is_err() {
                    break;
                }
            }
            None => stats.rows_skipped += 1,
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtide_store::ClickHouseConfig;

    const GOOD_LINE: &str = r#"203.0.113.9 - - [10/Oct/2023:13:55:36 +0000] "GET /index.html HTTP/1.1" 200 2326 "-" "curl/8.0" 120"#;

    fn send_chunks(tx: mpsc::Sender<io::Result<Bytes>>, chunks: Vec<io::Result<Bytes>>) {
        for chunk in chunks {
            tx.blocking_send(chunk).unwrap();
        }
    }

    #[test]
    fn test_parse_stage_counts_and_forwards() {
        let (chunk_tx, chunk_rx) = mpsc::channel(8);
        let (row_tx, mut row_rx) = mpsc::channel(8);

        // one good line split across two chunks, one garbage line, one good line
        let input = format!("{GOOD_LINE}\nnot a log line\n{GOOD_LINE}\n");
        let (head, tail) = input.split_at(20);
        let head = Bytes::copy_from_slice(head.as_bytes());
        let tail = Bytes::copy_from_slice(tail.as_bytes());
        std::thread::spawn(move || send_chunks(chunk_tx, vec![Ok(head), Ok(tail)]));

        let stats = parse_stage(chunk_rx, row_tx).unwrap();
        assert_eq!(stats.lines_read, 3);
        assert_eq!(stats.rows_skipped, 1);

        let first = row_rx.blocking_recv().unwrap();
        assert_eq!(first.ip, "203.0.113.9");
        assert_eq!(first.status, 200);
        let second = row_rx.blocking_recv().unwrap();
        assert_eq!(second.path, "/index.html");
        assert!(row_rx.blocking_recv().is_none());
    }

    #[test]
    fn test_parse_stage_handles_missing_trailing_newline() {
        let (chunk_tx, chunk_rx) = mpsc::channel(8);
        let (row_tx, mut row_rx) = mpsc::channel(8);

        let line = Bytes::copy_from_slice(GOOD_LINE.as_bytes());
        std::thread::spawn(move || send_chunks(chunk_tx, vec![Ok(line)]));

        let stats = parse_stage(chunk_rx, row_tx).unwrap();
        assert_eq!(stats.lines_read, 1);
        assert_eq!(stats.rows_skipped, 0);
        assert!(row_rx.blocking_recv().is_some());
    }

    #[test]
    fn test_parse_stage_surfaces_read_error() {
        let (chunk_tx, chunk_rx) = mpsc::channel(8);
        let (row_tx, mut row_rx) = mpsc::channel(8);

        let line = Bytes::copy_from_slice(format!("{GOOD_LINE}\n").as_bytes());
        std::thread::spawn(move || {
            send_chunks(
                chunk_tx,
                vec![
                    Ok(line),
                    Err(io::Error::new(io::ErrorKind::ConnectionReset, "body gone")),
                ],
            );
        });

        let err = parse_stage(chunk_rx, row_tx).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);

        // the line before the failure still came through
        assert!(row_rx.blocking_recv().is_some());
    }

    #[test]
    fn test_default_options() {
        let options = IngestOptions::default();
        assert_eq!(options.poll_interval, Duration::from_millis(500));
        assert_eq!(options.poll_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_ingest_fails_fast_when_store_is_down() {
        let store = LogStore::new(&ClickHouseConfig::default().with_url("http://127.0.0.1:1"))
            .unwrap();
        let coordinator = IngestCoordinator::new(store, IngestOptions::default());

        let body = futures::stream::iter(vec![Ok(Bytes::from_static(b"line\n"))]);
        let err = coordinator.ingest_stream(body).await.unwrap_err();
        assert!(matches!(err, IngestError::Store(_)));
    }
}
