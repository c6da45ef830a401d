use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::{Result, VfsError};
use crate::storage::KeyValueStore;

/// In-process host store.
///
/// Optionally enforces a quota on the total size of keys plus values, which lets callers reproduce
/// the behavior of a browser storage area that refuses writes once full.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects any write that would grow it beyond `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            quota: Some(bytes),
        }
    }

    /// Returns the current size of keys plus values, in bytes.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write();
        if let Some(quota) = self.quota {
            let used: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
            let replaced = entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = used - replaced + key.len() + value.len();
            if needed > quota {
                return Err(VfsError::StorageUnavailable(format!(
                    "quota of {quota} bytes exceeded writing {key}"
                )));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_set_get_remove() -> Result<()> {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("k", "v")?;
        assert_eq!(store.get("k")?, Some("v".to_string()));
        assert_eq!(store.len(), 1);

        store.remove("k")?;
        store.remove("k")?;
        assert_eq!(store.get("k")?, None);
        Ok(())
    }

    #[test]
    fn test_quota_rejects_growth() -> Result<()> {
        let store = MemoryStore::with_quota(8);
        store.set("ab", "123456")?;
        assert_eq!(store.used_bytes(), 8);

        let err = store.set("c", "1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
        assert_eq!(store.get("c")?, None);
        Ok(())
    }

    #[test]
    fn test_quota_counts_replaced_value_once() -> Result<()> {
        let store = MemoryStore::with_quota(8);
        store.set("ab", "123456")?;
        // Replacing a value of the same size fits.
        store.set("ab", "654321")?;
        store.set("ab", "1")?;
        store.set("c", "1234")?;
        assert_eq!(store.used_bytes(), 8);
        Ok(())
    }
}
