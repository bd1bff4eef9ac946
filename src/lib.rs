//! autocommit - automatically commits changed files at regular intervals.
//!
//! # Overview
//!
//! autocommit watches a working directory for file modifications and commits
//! each file that has been quiescent for a configured interval, one commit per
//! file. File-system events are delivered by a debounced watcher; an
//! independent timer scans the pending set on a fixed tick and commits every
//! file whose debounce window has elapsed.

pub mod config;
pub mod error;
pub mod git;
pub mod scheduler;
pub mod tracker;
pub mod watcher;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, GitError, WatchError};
pub use git::{FileState, Git2Client, GitClient};
pub use scheduler::CommitScheduler;
pub use tracker::ChangeTracker;
pub use watcher::{FileWatcher, IgnoreRules};
