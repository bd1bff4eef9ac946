//! Git operations using git2-rs.
//!
//! The scheduler talks to git through the [`GitClient`] trait so tests can
//! substitute a fake; [`Git2Client`] is the production implementation.

mod client;

pub use client::Git2Client;

use std::path::Path;

use crate::error::GitError;

/// Per-file working tree / index state, as reported by `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileState {
    /// The file differs between the index and HEAD (staged change).
    pub index_changed: bool,
    /// The file differs between the working tree and the index.
    pub workdir_changed: bool,
}

impl FileState {
    /// Whether the file has anything to commit at all.
    pub fn has_changes(&self) -> bool {
        self.index_changed || self.workdir_changed
    }
}

/// The version-control operations the scheduler consumes.
///
/// Paths are relative to the repository root.
pub trait GitClient {
    /// Whether the working directory is inside a git repository.
    fn is_repository(&self) -> bool;

    /// Stage a single file.
    fn stage(&self, path: &Path) -> Result<(), GitError>;

    /// Commit whatever is currently staged with the given message.
    fn commit(&self, message: &str) -> Result<(), GitError>;

    /// Report the working/index state of a single file.
    fn status(&self, path: &Path) -> Result<FileState, GitError>;
}
