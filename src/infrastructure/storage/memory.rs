//! In-memory Storage
//!
//! A path -> bytes map behind a mutex. Directories exist implicitly when a
//! file lives under them or were created explicitly.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::ports::{Storage, StorageError, StorageResult};
use crate::infrastructure::storage::GlobMatcher;

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    tree: Mutex<Tree>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored file path, sorted
    pub fn files(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn read_bytes(&self, path: &Path) -> StorageResult<Vec<u8>> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))
    }

    fn write_bytes(&self, path: &Path, content: &[u8]) -> StorageResult<()> {
        let mut tree = self.lock();
        if let Some(parent) = path.parent() {
            tree.dirs.insert(parent.to_path_buf());
        }
        tree.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let tree = self.lock();
        tree.files.contains_key(path)
            || tree.dirs.iter().any(|d| d.starts_with(path))
            || tree.files.keys().any(|f| f.starts_with(path))
    }

    fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        self.lock().dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> StorageResult<()> {
        let mut tree = self.lock();
        tree.files.retain(|f, _| !f.starts_with(path));
        tree.dirs.retain(|d| !d.starts_with(path));
        Ok(())
    }

    fn glob(&self, root: &Path, pattern: &str) -> StorageResult<Vec<PathBuf>> {
        let glob = GlobMatcher::new(root, pattern)?;
        Ok(self
            .lock()
            .files
            .keys()
            .filter(|path| {
                path.strip_prefix(root)
                    .map(|relative| glob.is_match(relative))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}
