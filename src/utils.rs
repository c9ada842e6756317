//! Utility functions for map-image-sync
//!
//! - `utils::levenshtein` for edit distance
//! - URL sanitization and string helpers used by the sources and resolver
//! - `run_blocking` for CPU-bound image work

use crate::errors::{SyncError, SyncResult};

pub mod levenshtein;

/// Run `f` on the blocking pool.
///
/// A panic inside `f` surfaces as `SyncError::Worker` for the one map that
/// triggered it, instead of unwinding through the batch.
pub async fn run_blocking<F, T>(f: F) -> SyncResult<T>
where
    F: FnOnce() -> SyncResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SyncError::worker(e.to_string()))?
}

/// Sanitize a base URL by removing trailing slashes and ensuring proper format
pub fn sanitize_base_url(base_url: &str) -> String {
    let mut url = base_url.trim().to_string();

    // Remove trailing slashes
    while url.ends_with('/') {
        url.pop();
    }

    // Ensure we have a scheme
    if !url.starts_with("http://") && !url.starts_with("https://") {
        url = format!("http://{}", url);
    }

    url
}

/// Return the first `max_chars` characters of `value`.
///
/// Counts `char`s rather than bytes so multi-byte names are never split in
/// the middle of a code point.
pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}
