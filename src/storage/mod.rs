//! Flat key-value storage: the host store abstraction and the namespacing adapter over it.

mod file;
mod memory;

use std::sync::Arc;

use log::trace;

use crate::error::{Result, VfsError};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Application-level scope used when none is configured.
pub const DEFAULT_APP_SCOPE: &str = "portable-vfs";

/// Instance-level scope used when none is configured.
pub const DEFAULT_INSTANCE_SCOPE: &str = "default";

/// A host's flat, string-keyed persistent map (browser `localStorage` is the archetype).
///
/// Implementations are shared by the whole process and must be safe to call from any thread.
/// They know nothing about namespaces; [`StorageBackend`] adds those.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    /// Fails with `StorageUnavailable` when the host refuses the write.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Lists every key currently in the store, including keys of other namespaces.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Namespacing adapter over a [`KeyValueStore`].
///
/// Every key is stored as `<app_scope>/<instance_scope>/<key>`, so the library never collides with
/// unrelated data in the same host store and two differently scoped instances never see each
/// other's keys. The layout is part of the on-store format and must not change between releases.
#[derive(Clone)]
pub struct StorageBackend {
    prefix: String,
    store: Arc<dyn KeyValueStore>,
}

impl StorageBackend {
    /// Creates a backend in the default scopes.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            prefix: format!("{DEFAULT_APP_SCOPE}/{DEFAULT_INSTANCE_SCOPE}/"),
            store,
        }
    }

    /// Creates a backend in the given scopes.
    /// Scopes must be non-empty and must not contain `/`.
    pub fn with_scopes(
        store: Arc<dyn KeyValueStore>,
        app_scope: &str,
        instance_scope: &str,
    ) -> Result<Self> {
        for scope in [app_scope, instance_scope] {
            if scope.is_empty() || scope.contains('/') {
                return Err(VfsError::InvalidScope(scope.to_string()));
            }
        }
        Ok(Self {
            prefix: format!("{app_scope}/{instance_scope}/"),
            store,
        })
    }

    /// Returns the prefix prepended to every key, including the trailing `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        trace!("get {key}");
        self.store.get(&self.key(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        trace!("set {key} ({} bytes)", value.len());
        self.store.set(&self.key(key), value)
    }

    /// Removes `key`; absent keys are ignored.
    pub fn delete(&self, key: &str) -> Result<()> {
        trace!("delete {key}");
        self.store.remove(&self.key(key))
    }

    /// Lists the keys of this namespace with the prefix stripped.
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .store
            .keys()?
            .into_iter()
            .filter_map(|k| k.strip_prefix(&self.prefix).map(str::to_string))
            .collect())
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn shared_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn test_keys_are_prefixed_on_the_host() -> Result<()> {
        let store = shared_store();
        let backend = StorageBackend::with_scopes(store.clone(), "app", "one")?;

        backend.set("notes.txt", "v")?;

        assert_eq!(store.get("app/one/notes.txt")?, Some("v".to_string()));
        assert_eq!(store.get("notes.txt")?, None);
        assert_eq!(backend.get("notes.txt")?, Some("v".to_string()));
        Ok(())
    }

    #[test]
    fn test_delete_uses_prefixed_key() -> Result<()> {
        let store = shared_store();
        store.set("notes.txt", "foreign")?;
        let backend = StorageBackend::new(store.clone());

        backend.set("notes.txt", "ours")?;
        backend.delete("notes.txt")?;

        assert_eq!(backend.get("notes.txt")?, None);
        assert_eq!(store.get("notes.txt")?, Some("foreign".to_string()));
        Ok(())
    }

    #[test]
    fn test_delete_absent_key_is_ok() -> Result<()> {
        let backend = StorageBackend::new(shared_store());
        backend.delete("missing")?;
        backend.delete("missing")?;
        Ok(())
    }

    #[test]
    fn test_keys_strip_prefix_and_skip_foreign() -> Result<()> {
        let store = shared_store();
        store.set("unrelated", "x")?;
        let one = StorageBackend::with_scopes(store.clone(), "app", "one")?;
        let two = StorageBackend::with_scopes(store.clone(), "app", "two")?;

        one.set("a", "1")?;
        one.set("dir/b", "2")?;
        two.set("c", "3")?;

        let mut keys = one.keys()?;
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "dir/b".to_string()]);
        assert_eq!(two.keys()?, vec!["c".to_string()]);
        Ok(())
    }

    #[test]
    fn test_invalid_scopes_rejected() {
        let store = shared_store();
        for (app, instance) in [("", "x"), ("x", ""), ("a/b", "x"), ("x", "a/b")] {
            let err = StorageBackend::with_scopes(store.clone(), app, instance)
                .err()
                .unwrap();
            assert_eq!(err.kind(), ErrorKind::InvalidScope);
        }
    }
}
