//! Storage-derived export budget
//!
//! When no explicit row-limit threshold is configured, the buffering
//! decision falls back to how much disk the temp directory has to
//! spare: keep a safety margin free, assume a rough per-row cost on
//! disk, and size the budget from the rest.

use std::path::Path;

/// Disk headroom never given to exports, in bytes (1 MiB)
pub const SAFETY_MARGIN_BYTES: u64 = 1024 * 1024;

/// Assumed on-disk cost of one buffered row, in bytes
pub const ROW_COST_BYTES: u64 = 20;

/// Budget used when free space is unknown or already below the margin
pub const FLOOR_ROW_LIMIT: u64 = 1000;

/// Row budget for a given amount of free space.
///
/// Space at or under the safety margin falls back to
/// [`FLOOR_ROW_LIMIT`]; any space beyond it grants at least one row.
pub fn row_limit_for_space(available: u64) -> u64 {
    let remaining = available.saturating_sub(SAFETY_MARGIN_BYTES);
    if remaining == 0 {
        return FLOOR_ROW_LIMIT;
    }
    (remaining / ROW_COST_BYTES).max(1)
}

/// Row budget for buffering into `temp_dir`, probed from the filesystem.
pub fn default_row_limit(temp_dir: &Path) -> u64 {
    match fs2::available_space(temp_dir) {
        Ok(available) => row_limit_for_space(available),
        Err(e) => {
            tracing::warn!(
                path = %temp_dir.display(),
                error = %e,
                "could not probe free space, using floor row limit"
            );
            FLOOR_ROW_LIMIT
        }
    }
}
