//! Local Storage Implementation
//!
//! Implements the Storage port on the real filesystem. Writes go through a
//! temp file in the target directory and are renamed into place.

use std::io::Write;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::domain::ports::{Storage, StorageError, StorageResult};
use crate::infrastructure::storage::GlobMatcher;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn read_bytes(&self, path: &Path) -> StorageResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| StorageError::io(path, e))
    }

    fn write_bytes(&self, path: &Path, content: &[u8]) -> StorageResult<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|e| StorageError::io(&parent, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| StorageError::io(path, e))?;
        tmp.write_all(content).map_err(|e| StorageError::io(path, e))?;
        tmp.persist(path)
            .map_err(|e| StorageError::io(path, e.error))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        std::fs::create_dir_all(path).map_err(|e| StorageError::io(path, e))
    }

    fn remove_dir_all(&self, path: &Path) -> StorageResult<()> {
        match std::fs::remove_dir_all(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(StorageError::io(path, e)),
            _ => Ok(()),
        }
    }

    fn glob(&self, root: &Path, pattern: &str) -> StorageResult<Vec<PathBuf>> {
        if !root.is_dir() {
            return Ok(Vec::new());
        }
        let glob = GlobMatcher::new(root, pattern)?;
        let mut matches = Vec::new();
        for entry in WalkBuilder::new(root).standard_filters(false).build() {
            let entry = entry.map_err(|e| StorageError::Io {
                path: root.to_path_buf(),
                source: std::io::Error::other(e.to_string()),
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            if glob.is_match(relative) {
                matches.push(entry.path().to_path_buf());
            }
        }
        matches.sort();
        Ok(matches)
    }
}
