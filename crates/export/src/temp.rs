//! Temp file lifecycle for buffered exports
//!
//! A buffered export writes to a temp file, serves it, then deletes it.
//! The file must go away exactly once in every ending: response
//! completed, client disconnected mid-download, or the job failed
//! before a byte was sent.
//!
//! [`TempRegistry`] tracks every live temp file; [`TempFileGuard`]
//! owns one registration and deletes the file on drop. Ownership of
//! the registration moves with the guard, so whichever side drops it
//! last (the response stream, usually) does the cleanup, and a
//! shutdown [`sweep`](TempRegistry::sweep) cannot race it into a
//! double delete.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;

/// File name prefix for export temp files
pub(crate) const TEMP_PREFIX: &str = "logtide-export-";

// =============================================================================
// Registry
// =============================================================================

/// Tracks temp files owned by in-flight export jobs
#[derive(Debug, Default)]
pub struct TempRegistry {
    files: Mutex<HashSet<PathBuf>>,
}

impl TempRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, path: &Path) {
        self.files.lock().insert(path.to_path_buf());
    }

    /// Returns whether the path was still registered
    fn unregister(&self, path: &Path) -> bool {
        self.files.lock().remove(path)
    }

    /// Number of temp files currently registered
    pub fn live_count(&self) -> usize {
        self.files.lock().len()
    }

    /// Delete every file still registered, returning how many went away.
    ///
    /// Run at shutdown. Guards whose registration was swept become
    /// no-ops when they later drop.
    pub fn sweep(&self) -> usize {
        let files: Vec<PathBuf> = self.files.lock().drain().collect();
        let mut removed = 0;

        for path in files {
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to remove export temp file"
                    );
                }
            }
        }

        removed
    }
}

/// Delete leftover export temp files in `temp_dir` from earlier runs.
///
/// Matches on the file name prefix only; other files are untouched.
pub fn sweep_orphans(temp_dir: &Path) -> io::Result<usize> {
    let mut removed = 0;

    for entry in std::fs::read_dir(temp_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(TEMP_PREFIX) {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %entry.path().display(),
                    error = %e,
                    "failed to remove orphaned export temp file"
                );
            }
        }
    }

    Ok(removed)
}

// =============================================================================
// Guard
// =============================================================================

/// Owns one registered temp file and deletes it on drop.
///
/// Cleanup failures are logged, never propagated; a leaked temp file
/// must not turn a served export into an error.
#[derive(Debug)]
pub struct TempFileGuard {
    path: PathBuf,
    registry: Arc<TempRegistry>,
}

impl TempFileGuard {
    pub fn new(path: PathBuf, registry: Arc<TempRegistry>) -> Self {
        registry.register(&path);
        Self { path, registry }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        // the registration is the deletion ticket; if it is gone,
        // someone else already cleaned up
        if !self.registry.unregister(&self.path) {
            return;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "removed export temp file");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove export temp file"
                );
            }
        }
    }
}

// =============================================================================
// Guarded Stream
// =============================================================================

/// Response stream that keeps a temp file alive while it is served.
///
/// Pass-through wrapper; the guard drops (and deletes the file) when
/// the body is dropped, on completion or disconnect alike.
pub struct GuardedStream<S> {
    inner: S,
    _guard: TempFileGuard,
}

impl<S> GuardedStream<S> {
    pub fn new(inner: S, guard: TempFileGuard) -> Self {
        Self {
            inner,
            _guard: guard,
        }
    }
}

impl<S: Stream + Unpin> Stream for GuardedStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        std::fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_guard_removes_file_on_drop() {
        let dir = tempdir().unwrap();
        let registry = Arc::new(TempRegistry::new());
        let path = dir.path().join("logtide-export-one.csv");
        touch(&path);

        let guard = TempFileGuard::new(path.clone(), Arc::clone(&registry));
        assert_eq!(registry.live_count(), 1);
        assert!(path.exists());

        drop(guard);
        assert!(!path.exists());
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_guard_tolerates_missing_file() {
        let dir = tempdir().unwrap();
        let registry = Arc::new(TempRegistry::new());
        let path = dir.path().join("logtide-export-gone.csv");

        // never created on disk
        let guard = TempFileGuard::new(path, Arc::clone(&registry));
        drop(guard);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_sweep_then_drop_deletes_once() {
        let dir = tempdir().unwrap();
        let registry = Arc::new(TempRegistry::new());
        let path = dir.path().join("logtide-export-two.parquet");
        touch(&path);

        let guard = TempFileGuard::new(path.clone(), Arc::clone(&registry));

        assert_eq!(registry.sweep(), 1);
        assert!(!path.exists());
        assert_eq!(registry.live_count(), 0);

        // guard's registration was swept; dropping it is a no-op
        touch(&path);
        drop(guard);
        assert!(path.exists(), "swept guard must not delete again");
    }

    #[test]
    fn test_sweep_orphans_matches_prefix_only() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("logtide-export-stale.csv"));
        touch(&dir.path().join("logtide-export-stale.parquet"));
        touch(&dir.path().join("unrelated.txt"));

        let removed = sweep_orphans(dir.path()).unwrap();
        assert_eq!(removed, 2);
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[tokio::test]
    async fn test_guarded_stream_passes_items_and_cleans_up() {
        let dir = tempdir().unwrap();
        let registry = Arc::new(TempRegistry::new());
        let path = dir.path().join("logtide-export-three.csv");
        touch(&path);

        let guard = TempFileGuard::new(path.clone(), Arc::clone(&registry));
        let stream = GuardedStream::new(futures::stream::iter(vec![1, 2, 3]), guard);

        let items: Vec<i32> = stream.collect().await;
        assert_eq!(items, vec![1, 2, 3]);

        // stream consumed and dropped: file is gone
        assert!(!path.exists());
        assert_eq!(registry.live_count(), 0);
    }
}
