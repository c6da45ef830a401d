//! This module provides a filesystem backend that emulates files and directories on top of a flat
//! key-value store.

use log::{debug, warn};

use crate::core::{FsBackend, VfsFile, utils};
use crate::error::{Result, VfsError};
use crate::storage::StorageBackend;
use crate::vfs::{Entry, FileInfo, KvFile};

/// A filesystem backend whose every file and directory is one key of a flat store.
///
/// ### Internal state
///
/// * `backend`: the namespaced view of the host store. Keys are the names callers pass in,
///   untouched: there is no current directory and no path normalization, so `a/b` and `/a/b`
///   are different keys.
///
/// ### Stored layout
///
/// Each key holds an encoded [`Entry`]: either a file with its bytes or a directory record.
/// Directories exist only as those records; a file `a/b` does not require a directory `a`.
///
/// ### Consistency
///
/// Handles returned by `open`/`create` buffer their writes until `sync`. `stat` reads the store,
/// so it never sees unsynced writes. Nothing coordinates handles on the same key: the last `sync`
/// wins.
///
/// ### Example
///
/// ```
/// use std::sync::Arc;
/// use portable_vfs::{FsBackend, KvFS, MemoryStore, StorageBackend, VfsFile};
///
/// let fs = KvFS::new(StorageBackend::new(Arc::new(MemoryStore::new())));
///
/// fs.mkdir_all("docs", 0o755).unwrap();
/// let file = fs.create("docs/note.txt").unwrap();
/// file.write(b"Hello").unwrap();
/// file.sync().unwrap();
///
/// assert_eq!(fs.stat("docs/note.txt").unwrap().size(), 5);
/// assert!(fs.stat("docs").unwrap().is_dir());
/// ```
#[derive(Clone)]
pub struct KvFS {
    backend: StorageBackend,
}

impl KvFS {
    pub fn new(backend: StorageBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    /// Reads and decodes the entry stored under `name`.
    fn entry(&self, name: &str) -> Result<Option<Entry>> {
        match self.backend.get(name)? {
            Some(text) => Entry::decode(name, &text).map(Some),
            None => Ok(None),
        }
    }
}

impl FsBackend for KvFS {
    fn open(&self, name: &str) -> Result<Box<dyn VfsFile>> {
        Ok(Box::new(KvFile::open(self.backend.clone(), name)?))
    }

    fn create(&self, name: &str) -> Result<Box<dyn VfsFile>> {
        Ok(Box::new(KvFile::create(self.backend.clone(), name)?))
    }

    fn remove(&self, name: &str) -> Result<()> {
        debug!("remove {name}");
        self.backend.delete(name)
    }

    /// Deletes every key that starts with `prefix`.
    ///
    /// Matching is on the raw key string, so `report` also removes `report2`. Every matching key
    /// is attempted; the first failure is returned once all of them have been tried. A key that
    /// disappears between listing and deletion counts as removed.
    fn remove_all(&self, prefix: &str) -> Result<()> {
        let mut first_error = None;
        let mut removed = 0usize;

        for key in self.backend.keys()? {
            if !key.starts_with(prefix) {
                continue;
            }
            match self.backend.delete(&key) {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!("remove_all {prefix}: failed to delete {key}: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }

        debug!("remove_all {prefix}: {removed} keys deleted");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Writes directory records under `path`, exactly as given, and under each ancestor.
    ///
    /// Ancestors are the key text up to each `/`, so `/a/b` records `/a` and `/a/b`, and `a/b/`
    /// is a key of its own next to `a` and `a/b`. Existing directories are left alone. If any of
    /// these keys already holds a file the call fails with `NotADirectory` before anything is
    /// written. `perm` is ignored.
    fn mkdir_all(&self, path: &str, _perm: u32) -> Result<()> {
        let mut missing = Vec::new();
        for segment in utils::key_ancestors(path) {
            match self.entry(&segment)? {
                Some(entry) if entry.is_dir() => {}
                Some(_) => return Err(VfsError::NotADirectory { name: segment }),
                None => missing.push(segment),
            }
        }

        let record = Entry::directory().encode(path)?;
        for segment in &missing {
            self.backend.set(segment, &record)?;
        }
        debug!("mkdir_all {path}: {} created", missing.len());
        Ok(())
    }

    fn stat(&self, name: &str) -> Result<FileInfo> {
        let entry = self.entry(name)?.ok_or_else(|| VfsError::not_found(name))?;
        Ok(FileInfo::new(
            name,
            entry.content().len() as u64,
            entry.entry_type(),
        ))
    }
}
