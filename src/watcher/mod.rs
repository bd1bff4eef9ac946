//! File watching: debounced change notifications feeding the tracker.
//!
//! The notify debouncer collapses rapid successive writes to one file into a
//! single notification once writes stop for the stability window. Ignored
//! paths are filtered here, before they ever reach the tracker.

pub mod ignore;

pub use ignore::IgnoreRules;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{DebouncedEvent, Debouncer, new_debouncer};
use tracing::{debug, warn};

use crate::error::WatchError;
use crate::tracker::ChangeTracker;

/// Write stability window for the debouncer. Independent of the
/// application-level commit interval.
pub const STABILITY_WINDOW: Duration = Duration::from_secs(2);

/// Handle to a running watch. Watching stops when this is dropped.
pub struct FileWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
}

impl FileWatcher {
    /// Watch `root` recursively, recording change notifications for
    /// non-ignored files into `tracker`.
    ///
    /// The debouncer delivers events on its own thread; recording is a
    /// mutex-guarded map insert, so commits in flight never block it.
    pub fn spawn(
        root: &Path,
        rules: IgnoreRules,
        tracker: Arc<ChangeTracker>,
    ) -> Result<Self, WatchError> {
        // Platform watchers may report canonicalized paths; both the watch
        // target and the prefix stripped from event paths must be the
        // canonicalized root, or events under a symlinked root never match.
        let watch_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

        let handler_root = watch_root.clone();
        let mut debouncer = new_debouncer(
            STABILITY_WINDOW,
            move |res: Result<Vec<DebouncedEvent>, notify::Error>| match res {
                Ok(events) => {
                    for event in events {
                        handle_event(&handler_root, &rules, &tracker, &event.path);
                    }
                }
                // Watcher errors are non-fatal: log and keep watching
                Err(e) => warn!("Watcher error: {e}"),
            },
        )
        .map_err(WatchError::InitFailed)?;

        debouncer
            .watcher()
            .watch(&watch_root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::WatchFailed {
                path: watch_root.clone(),
                source: e,
            })?;

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

/// Record one change notification, dropping ignored and non-file paths.
fn handle_event(root: &Path, rules: &IgnoreRules, tracker: &ChangeTracker, path: &Path) {
    let Ok(rel) = path.strip_prefix(root) else {
        // Notification outside the watch root
        return;
    };
    if rel.as_os_str().is_empty() || rules.is_ignored(rel) {
        return;
    }
    // Only paths that are currently regular files become pending; directory
    // events and deletions are dropped.
    if !path.is_file() {
        return;
    }

    debug!("File changed: {}", rel.display());
    tracker.record(rel);
}
