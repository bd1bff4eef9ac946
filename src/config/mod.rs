//! Configuration loading and the default config file written by `--init`.
//!
//! Effective settings are merged in increasing priority: built-in defaults,
//! the JSON config file (if present and parseable), then command-line
//! overrides. A missing or broken config file is never fatal.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Default commit quiescence window: 2 minutes.
pub const DEFAULT_INTERVAL_MS: u64 = 120_000;

/// Default scheduler tick period: 10 seconds. Independent of the commit
/// interval; the scheduler re-scans pending files this often.
pub const DEFAULT_TICK_MS: u64 = 10_000;

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".autocommit";

fn default_ignore() -> Vec<String> {
    [
        "node_modules/**",
        ".git/**",
        ".autocommit",
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Effective configuration, immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Commit quiescence window in milliseconds.
    pub interval_ms: u64,

    /// Scheduler tick period in milliseconds.
    pub tick_ms: u64,

    /// Glob patterns excluded from watching (gitignore syntax).
    pub ignore: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            tick_ms: DEFAULT_TICK_MS,
            ignore: default_ignore(),
        }
    }
}

/// On-disk config schema. Every key is optional and unknown keys are
/// ignored; a present `ignore` key replaces the default list wholesale.
#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
}

impl Config {
    /// Load the effective configuration.
    ///
    /// `cli_interval_secs` is the `--interval` override in seconds; it wins
    /// over both the defaults and the config file.
    pub fn load(path: &Path, cli_interval_secs: Option<u64>) -> Config {
        let mut config = Config::default();

        match read_config_file(path) {
            Ok(Some(file)) => config.apply(file),
            Ok(None) => {}
            Err(e) => warn!("{e}; continuing with defaults"),
        }

        if let Some(secs) = cli_interval_secs {
            config.interval_ms = secs.saturating_mul(1000);
        }

        config
    }

    /// The commit quiescence window.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// The scheduler tick period.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    fn apply(&mut self, file: ConfigFile) {
        if let Some(interval) = file.interval {
            self.interval_ms = interval;
        }
        if let Some(ignore) = file.ignore {
            self.ignore = ignore;
        }
        if let Some(tick) = file.tick {
            self.tick_ms = tick;
        }
    }

    /// Write the default configuration to `path` unless a file already
    /// exists there.
    ///
    /// Returns `true` if the file was created and `false` if one was already
    /// present (the existing file is left untouched). The written schema
    /// contains only `interval` and `ignore`.
    pub fn write_default(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }

        let defaults = ConfigFile {
            interval: Some(DEFAULT_INTERVAL_MS),
            ignore: Some(default_ignore()),
            tick: None,
        };
        let json =
            serde_json::to_string_pretty(&defaults).map_err(ConfigError::SerializeFailed)?;

        fs::write(path, json + "\n").map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(true)
    }
}

/// Read and parse the config file. `Ok(None)` means the file does not exist.
fn read_config_file(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let file = serde_json::from_str(&text).map_err(|e| ConfigError::ParseFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(Some(file))
}
