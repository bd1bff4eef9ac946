//! The commit scheduler: a fixed tick that scans pending files and commits
//! every file whose quiescence window has elapsed.
//!
//! Files are committed individually, one commit per file with a fixed
//! `Updated <path>` message. A failed attempt is logged and the entry keeps
//! its old timestamp, so the next tick re-attempts it; there is no backoff.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::GitError;
use crate::git::GitClient;
use crate::tracker::ChangeTracker;

pub struct CommitScheduler<G: GitClient> {
    tracker: Arc<ChangeTracker>,
    git: G,
    interval: Duration,
}

impl<G: GitClient> CommitScheduler<G> {
    /// `interval` is the commit quiescence window, not the tick period.
    pub fn new(tracker: Arc<ChangeTracker>, git: G, interval: Duration) -> Self {
        Self {
            tracker,
            git,
            interval,
        }
    }

    /// Run forever, processing the tracker every `tick_period`.
    ///
    /// Commit attempts within a tick run sequentially; new change
    /// notifications keep landing in the tracker from the watcher thread
    /// while commits are in flight.
    pub async fn run(&self, tick_period: Duration) {
        let mut ticker = tokio::time::interval(tick_period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first interval tick fires immediately; consume it so the first
        // scan happens one full period after startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.process(Instant::now());
        }
    }

    /// One scheduler tick over a snapshot of the tracker.
    ///
    /// Returns the number of files committed.
    pub fn process(&self, now: Instant) -> usize {
        let mut committed = 0;

        for (path, last_modified) in self.tracker.snapshot() {
            if now.saturating_duration_since(last_modified) < self.interval {
                continue;
            }

            match self.commit_file(&path) {
                Ok(()) => {
                    info!("Committed: {}", path.display());
                    self.tracker.mark_committed(&path, now);
                    committed += 1;
                }
                Err(e) => {
                    // The entry keeps its old timestamp; the elapsed-time
                    // condition still holds next tick, so it is re-attempted.
                    warn!("Error committing {}: {e}", path.display());
                }
            }
        }

        committed
    }

    fn commit_file(&self, path: &Path) -> Result<(), GitError> {
        let state = self.git.status(path)?;
        if !state.has_changes() {
            return Err(GitError::NoChanges(path.display().to_string()));
        }

        self.git.stage(path)?;
        self.git.commit(&format!("Updated {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::FileState;
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::path::PathBuf;

    /// In-memory git client for driving the scheduler deterministically.
    #[derive(Default)]
    struct FakeGit {
        commits: RefCell<Vec<String>>,
        staged: RefCell<Vec<PathBuf>>,
        clean_paths: RefCell<HashSet<PathBuf>>,
        fail_commits: Cell<bool>,
    }

    impl FakeGit {
        fn commit_messages(&self) -> Vec<String> {
            self.commits.borrow().clone()
        }
    }

    impl GitClient for FakeGit {
        fn is_repository(&self) -> bool {
            true
        }

        fn stage(&self, path: &Path) -> Result<(), GitError> {
            self.staged.borrow_mut().push(path.to_path_buf());
            Ok(())
        }

        fn commit(&self, message: &str) -> Result<(), GitError> {
            if self.fail_commits.get() {
                return Err(GitError::CommitFailed(git2::Error::from_str(
                    "simulated failure",
                )));
            }
            self.commits.borrow_mut().push(message.to_string());
            Ok(())
        }

        fn status(&self, path: &Path) -> Result<FileState, GitError> {
            let clean = self.clean_paths.borrow().contains(path);
            Ok(FileState {
                index_changed: false,
                workdir_changed: !clean,
            })
        }
    }

    const INTERVAL: Duration = Duration::from_millis(120_000);

    fn scheduler(tracker: Arc<ChangeTracker>) -> CommitScheduler<FakeGit> {
        CommitScheduler::new(tracker, FakeGit::default(), INTERVAL)
    }

    #[test]
    fn test_no_commit_before_interval_elapses() {
        let tracker = Arc::new(ChangeTracker::new());
        let scheduler = scheduler(Arc::clone(&tracker));

        let t0 = Instant::now();
        tracker.record_at(Path::new("a.txt"), t0);

        // Tick at t=60s: window not yet elapsed
        assert_eq!(scheduler.process(t0 + Duration::from_millis(60_000)), 0);
        assert!(scheduler.git.commit_messages().is_empty());
    }

    #[test]
    fn test_exactly_one_commit_after_interval_elapses() {
        let tracker = Arc::new(ChangeTracker::new());
        let scheduler = scheduler(Arc::clone(&tracker));

        let t0 = Instant::now();
        tracker.record_at(Path::new("a.txt"), t0);

        // Tick at t=130s: one commit with the fixed message template
        assert_eq!(scheduler.process(t0 + Duration::from_millis(130_000)), 1);
        assert_eq!(scheduler.git.commit_messages(), vec!["Updated a.txt"]);
    }

    #[test]
    fn test_rapid_changes_defer_commit_until_quiescent() {
        let tracker = Arc::new(ChangeTracker::new());
        let scheduler = scheduler(Arc::clone(&tracker));
        let t0 = Instant::now();

        // Changes keep arriving within less than the interval of each other;
        // every tick sees a too-recent timestamp and commits nothing.
        let mut last = t0;
        for i in 1..=5 {
            tracker.record_at(Path::new("busy.txt"), last);
            let tick = last + Duration::from_millis(110_000);
            assert_eq!(scheduler.process(tick), 0, "tick {i} should not commit");
            last = tick;
        }

        // Once the file goes quiet for a full interval, it commits
        tracker.record_at(Path::new("busy.txt"), last);
        assert_eq!(scheduler.process(last + INTERVAL), 1);
    }

    #[test]
    fn test_success_resets_timestamp_and_prevents_recommit() {
        let tracker = Arc::new(ChangeTracker::new());
        let scheduler = scheduler(Arc::clone(&tracker));

        let t0 = Instant::now();
        tracker.record_at(Path::new("a.txt"), t0);

        let commit_tick = t0 + Duration::from_millis(130_000);
        assert_eq!(scheduler.process(commit_tick), 1);
        assert_eq!(tracker.last_modified(Path::new("a.txt")), Some(commit_tick));

        // The entry stays in the tracker but its window has restarted, so a
        // tick before the interval elapses again does not re-commit even
        // though the fake reports the file as dirty.
        assert_eq!(
            scheduler.process(commit_tick + Duration::from_millis(60_000)),
            0
        );
        assert_eq!(scheduler.git.commit_messages().len(), 1);
    }

    #[test]
    fn test_failed_commit_leaves_timestamp_for_next_tick() {
        let tracker = Arc::new(ChangeTracker::new());
        let scheduler = scheduler(Arc::clone(&tracker));
        scheduler.git.fail_commits.set(true);

        let t0 = Instant::now();
        tracker.record_at(Path::new("a.txt"), t0);

        let tick = t0 + Duration::from_millis(130_000);
        assert_eq!(scheduler.process(tick), 0);
        // Timestamp untouched by the failure
        assert_eq!(tracker.last_modified(Path::new("a.txt")), Some(t0));

        // The elapsed-time condition still holds, so the next tick
        // immediately re-attempts and succeeds.
        scheduler.git.fail_commits.set(false);
        assert_eq!(scheduler.process(tick + Duration::from_millis(10_000)), 1);
    }

    #[test]
    fn test_clean_file_is_a_failed_attempt() {
        let tracker = Arc::new(ChangeTracker::new());
        let scheduler = scheduler(Arc::clone(&tracker));
        scheduler
            .git
            .clean_paths
            .borrow_mut()
            .insert(PathBuf::from("a.txt"));

        let t0 = Instant::now();
        tracker.record_at(Path::new("a.txt"), t0);

        assert_eq!(scheduler.process(t0 + INTERVAL), 0);
        // Nothing staged, nothing committed, timestamp unchanged
        assert!(scheduler.git.staged.borrow().is_empty());
        assert_eq!(tracker.last_modified(Path::new("a.txt")), Some(t0));
    }

    #[test]
    fn test_each_file_gets_its_own_commit() {
        let tracker = Arc::new(ChangeTracker::new());
        let scheduler = scheduler(Arc::clone(&tracker));

        let t0 = Instant::now();
        tracker.record_at(Path::new("a.txt"), t0);
        tracker.record_at(Path::new("b.txt"), t0);

        assert_eq!(scheduler.process(t0 + INTERVAL), 2);
        let mut messages = scheduler.git.commit_messages();
        messages.sort();
        assert_eq!(messages, vec!["Updated a.txt", "Updated b.txt"]);
    }
}
