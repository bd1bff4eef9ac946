//! Ignore pattern matching for watched paths.
//!
//! Patterns come from the configuration (`ignore` key) and use gitignore
//! glob syntax, compiled against the watch root.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::warn;

/// Compiled ignore rules.
pub struct IgnoreRules {
    matcher: Gitignore,
}

impl IgnoreRules {
    /// Compile the configured glob patterns against the watch root.
    ///
    /// An unparseable pattern is logged and skipped rather than failing
    /// startup.
    pub fn compile(root: &Path, patterns: &[String]) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                warn!("Skipping invalid ignore pattern '{pattern}': {e}");
            }
        }

        let matcher = match builder.build() {
            Ok(matcher) => matcher,
            Err(e) => {
                warn!("Failed to compile ignore patterns: {e}");
                Gitignore::empty()
            }
        };

        Self { matcher }
    }

    /// Whether a root-relative path matches any ignore pattern.
    pub fn is_ignored(&self, rel: &Path) -> bool {
        self.matcher
            .matched_path_or_any_parents(rel, false)
            .is_ignore()
    }
}
