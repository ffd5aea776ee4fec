//! Gitignore-style glob matching shared by the storage adapters

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::domain::ports::{StorageError, StorageResult};

/// One compiled glob, matched against paths relative to a root.
///
/// A pattern containing `/` is anchored at the root and `*` never crosses
/// a directory boundary; a bare `*.ds` matches at any depth.
#[derive(Debug)]
pub struct GlobMatcher {
    matcher: Gitignore,
}

impl GlobMatcher {
    pub fn new(root: &Path, pattern: &str) -> StorageResult<Self> {
        let invalid = |message: String| StorageError::InvalidPattern {
            pattern: pattern.to_string(),
            message,
        };
        let mut builder = GitignoreBuilder::new(root);
        builder
            .add_line(None, pattern)
            .map_err(|e| invalid(e.to_string()))?;
        let matcher = builder.build().map_err(|e| invalid(e.to_string()))?;
        Ok(Self { matcher })
    }

    /// Whether a file at `relative` (to the root) matches
    pub fn is_match(&self, relative: &Path) -> bool {
        self.matcher.matched(relative, false).is_ignore()
    }
}
