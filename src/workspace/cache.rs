//! Per-run file content cache.
//!
//! The cache is write-once per key: the first reader of a path populates it
//! and later readers share the same `Arc<str>`. Two readers racing on a cold
//! key may both hit the disk; the contents are identical for the duration of
//! a run, so whichever insert lands last is fine.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use dashmap::DashMap;
use serde::Serialize;

/// Size and modification time of a file.
///
/// Failures to stat a file yield the zeroed default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileStat {
    /// Size in bytes
    pub size: u64,
    /// Last modification time, milliseconds since the Unix epoch
    pub modified_ms: u64,
}

impl FileStat {
    /// Stats `path`, returning zeros on any failure.
    pub fn of(path: &Path) -> Self {
        let Ok(meta) = fs::metadata(path) else {
            return Self::default();
        };
        let modified_ms = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            size: meta.len(),
            modified_ms,
        }
    }
}

/// Memoized file text keyed by path.
///
/// `None` entries record files that could not be read so they are not
/// retried within the same run.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: DashMap<PathBuf, Option<Arc<str>>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text of `path`, reading it on first access.
    ///
    /// Unreadable or non-UTF-8 files yield `None`.
    pub fn read(&self, path: &Path) -> Option<Arc<str>> {
        if let Some(entry) = self.entries.get(path) {
            return entry.value().clone();
        }

        let content = match fs::read_to_string(path) {
            Ok(text) => Some(Arc::<str>::from(text)),
            Err(e) => {
                tracing::debug!("Could not read {}: {}", path.display(), e);
                None
            }
        };
        self.entries.insert(path.to_path_buf(), content.clone());
        content
    }

    /// Seeds the cache with known content, e.g. from an editor buffer.
    pub fn preload(&self, path: impl Into<PathBuf>, content: impl Into<Arc<str>>) {
        self.entries.insert(path.into(), Some(content.into()));
    }

    /// Returns true if `path` has been read (successfully or not).
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry. Called at the start of each run.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
