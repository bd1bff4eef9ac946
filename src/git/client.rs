//! git2-backed implementation of the [`GitClient`] trait.

use std::path::{Path, PathBuf};

use git2::{Commit, ErrorCode, Repository, Status};
use tracing::debug;

use crate::error::GitError;
use crate::git::{FileState, GitClient};

/// Production git client for a working directory.
///
/// The repository is opened per operation rather than held open, mirroring a
/// CLI client that invokes `git` per command. Paths handed in are relative to
/// the working directory and translated to repo-root-relative form, so
/// running from a subdirectory of the repository works.
pub struct Git2Client {
    workdir: PathBuf,
}

impl Git2Client {
    pub fn new(workdir: &Path) -> Self {
        let workdir = workdir
            .canonicalize()
            .unwrap_or_else(|_| workdir.to_path_buf());
        Self { workdir }
    }

    fn open(&self) -> Result<Repository, GitError> {
        Repository::discover(&self.workdir).map_err(GitError::OpenRepository)
    }

    /// Translate a workdir-relative path into a repo-root-relative one.
    ///
    /// Falls back to the path unchanged when the roots cannot be related
    /// (the common case, workdir == repo root, is an identity mapping).
    fn rel_to_repo(&self, repo: &Repository, path: &Path) -> PathBuf {
        let Some(root) = repo.workdir() else {
            return path.to_path_buf();
        };
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let abs = self.workdir.join(path);
        match abs.strip_prefix(&root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => path.to_path_buf(),
        }
    }
}

impl GitClient for Git2Client {
    fn is_repository(&self) -> bool {
        self.open().is_ok()
    }

    fn stage(&self, path: &Path) -> Result<(), GitError> {
        let repo = self.open()?;
        let rel = self.rel_to_repo(&repo, path);

        let staging_failed = |e: git2::Error| GitError::StagingFailed {
            path: rel.display().to_string(),
            source: e,
        };

        let mut index = repo.index().map_err(staging_failed)?;
        index.add_path(&rel).map_err(staging_failed)?;
        index.write().map_err(staging_failed)?;

        debug!("Staged {}", rel.display());
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        let repo = self.open()?;

        let mut index = repo.index().map_err(GitError::CommitFailed)?;
        let tree_id = index.write_tree().map_err(GitError::CommitFailed)?;
        let tree = repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

        // Signature comes from git config; missing user.name/user.email
        // surfaces as a config error.
        let sig = repo.signature().map_err(GitError::ConfigError)?;

        // HEAD is absent in a fresh repository (unborn branch); the first
        // commit then has no parents.
        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit().map_err(GitError::CommitFailed)?),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                None
            }
            Err(e) => return Err(GitError::CommitFailed(e)),
        };
        let parents: Vec<&Commit> = parent.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .map_err(GitError::CommitFailed)?;

        Ok(())
    }

    fn status(&self, path: &Path) -> Result<FileState, GitError> {
        let repo = self.open()?;
        let rel = self.rel_to_repo(&repo, path);

        let status = repo
            .status_file(&rel)
            .map_err(|e| GitError::StatusFailed {
                path: rel.display().to_string(),
                source: e,
            })?;

        Ok(FileState {
            index_changed: status.intersects(
                Status::INDEX_NEW
                    | Status::INDEX_MODIFIED
                    | Status::INDEX_DELETED
                    | Status::INDEX_RENAMED
                    | Status::INDEX_TYPECHANGE,
            ),
            workdir_changed: status.intersects(
                Status::WT_NEW
                    | Status::WT_MODIFIED
                    | Status::WT_DELETED
                    | Status::WT_RENAMED
                    | Status::WT_TYPECHANGE,
            ),
        })
    }
}
