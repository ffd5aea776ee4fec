//! Storage port - abstraction over the build workspace
//!
//! The pipeline only needs a handful of operations: read and write text or
//! bytes, check existence, list files matching a glob and manage
//! directories. Implementations decide where the bytes actually live.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// File not found
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Content is not valid UTF-8 text
    #[error("file is not valid UTF-8: {}", .0.display())]
    NotText(PathBuf),

    /// Glob pattern could not be compiled
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// I/O error at a path
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(path.to_path_buf())
        } else {
            StorageError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Abstract storage interface
///
/// Implementations:
/// - `LocalStorage` - the real filesystem
/// - `MemoryStorage` - in-memory map for tests
pub trait Storage: Send + Sync {
    /// Read file content as bytes
    fn read_bytes(&self, path: &Path) -> StorageResult<Vec<u8>>;

    /// Write bytes, creating parent directories
    fn write_bytes(&self, path: &Path, content: &[u8]) -> StorageResult<()>;

    /// Check if a file or directory exists
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and parents
    fn create_dir_all(&self, path: &Path) -> StorageResult<()>;

    /// Remove a directory tree; missing directories are not an error
    fn remove_dir_all(&self, path: &Path) -> StorageResult<()>;

    /// List files under `root` matching a gitignore-style glob, sorted
    fn glob(&self, root: &Path, pattern: &str) -> StorageResult<Vec<PathBuf>>;

    /// Read file content as UTF-8 text
    fn read_text(&self, path: &Path) -> StorageResult<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|_| StorageError::NotText(path.to_path_buf()))
    }

    /// Write text, creating parent directories
    fn write_text(&self, path: &Path, content: &str) -> StorageResult<()> {
        self.write_bytes(path, content.as_bytes())
    }

    /// Append text to a file, creating it when absent
    fn append_text(&self, path: &Path, content: &str) -> StorageResult<()> {
        let mut existing = match self.read_text(path) {
            Ok(text) => text,
            Err(StorageError::NotFound(_)) => String::new(),
            Err(e) => return Err(e),
        };
        existing.push_str(content);
        self.write_text(path, &existing)
    }

    /// Copy a file
    fn copy(&self, from: &Path, to: &Path) -> StorageResult<()> {
        let bytes = self.read_bytes(from)?;
        self.write_bytes(to, &bytes)
    }
}
