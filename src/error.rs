//! Error types for autocommit modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from configuration loading and `--init`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize default config: {0}")]
    SerializeFailed(#[source] serde_json::Error),
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("No changes to commit for '{0}'")]
    NoChanges(String),

    #[error("Failed to read status for '{path}': {source}")]
    StatusFailed {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to stage '{path}': {source}")]
    StagingFailed {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),
}

/// Errors from file watching.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize file watcher: {0}")]
    InitFailed(#[source] notify::Error),

    #[error("Failed to watch '{path}': {source}")]
    WatchFailed {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}
