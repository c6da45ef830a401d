use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use parking_lot::Mutex;

use crate::error::{Result, VfsError};
use crate::storage::KeyValueStore;

/// Host store persisted as a single JSON object on disk.
///
/// This is the native counterpart of a browser's persistent storage area: the whole map lives in
/// memory and every mutation rewrites the document through a temporary sibling file followed by
/// a rename, so a crash leaves either the old or the new document in place.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, loading it if the file exists.
    /// The file itself is not created until the first mutation.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|e| {
                VfsError::StorageUnavailable(format!("{}: malformed store: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(VfsError::StorageUnavailable(format!(
                    "{}: {e}",
                    path.display()
                )));
            }
        };
        debug!("opened store {} ({} keys)", path.display(), entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let unavailable = |e: std::io::Error| {
            VfsError::StorageUnavailable(format!("{}: {e}", self.path.display()))
        };
        let raw = serde_json::to_vec(entries)
            .map_err(|e| VfsError::StorageUnavailable(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, raw).map_err(unavailable)?;
        std::fs::rename(&tmp, &self.path).map_err(unavailable)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&entries) {
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        if let Some(old) = entries.remove(key) {
            if let Err(e) = self.persist(&entries) {
                entries.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().keys().cloned().collect())
    }
}
