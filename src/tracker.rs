//! Pending-change tracking: path -> time of last observed modification.
//!
//! The tracker is the sole source of truth for which files are pending. The
//! watcher records into it from its delivery thread while the scheduler scans
//! it on every tick, so the map lives behind a mutex. Entries are never
//! removed: a successful commit refreshes the timestamp, which restarts that
//! file's quiescence window.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

/// In-memory map of pending files, keyed by path relative to the repo root.
///
/// At most one entry exists per path; later records overwrite the timestamp.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    entries: Mutex<HashMap<PathBuf, Instant>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change notification for `path` at the current time.
    pub fn record(&self, path: &Path) {
        self.record_at(path, Instant::now());
    }

    /// Record a change notification for `path` at an explicit time.
    pub fn record_at(&self, path: &Path, at: Instant) {
        let mut entries = self.entries.lock().expect("tracker mutex poisoned");
        entries.insert(path.to_path_buf(), at);
    }

    /// Refresh `path`'s timestamp after a successful commit, so a re-modified
    /// file restarts its own quiescence window from the commit time.
    pub fn mark_committed(&self, path: &Path, at: Instant) {
        let mut entries = self.entries.lock().expect("tracker mutex poisoned");
        entries.insert(path.to_path_buf(), at);
    }

    /// A point-in-time copy of all entries for the scheduler's scan.
    pub fn snapshot(&self) -> Vec<(PathBuf, Instant)> {
        let entries = self.entries.lock().expect("tracker mutex poisoned");
        entries.iter().map(|(p, t)| (p.clone(), *t)).collect()
    }

    /// The recorded timestamp for `path`, if it is pending.
    pub fn last_modified(&self, path: &Path) -> Option<Instant> {
        let entries = self.entries.lock().expect("tracker mutex poisoned");
        entries.get(path).copied()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.last_modified(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("tracker mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
