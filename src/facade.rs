use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::config::{BackendConfig, Config};
use crate::core::{FsBackend, VfsFile};
use crate::error::{Result, VfsError};
use crate::storage::{KeyValueStore, StorageBackend};
use crate::vfs::{DirFS, FileInfo, KvFS};

/// Entry point of the library: the six filesystem operations, dispatched to the backend chosen
/// at construction.
///
/// `Fs` is cheap to clone; clones share the backend.
///
/// ```
/// use portable_vfs::{Fs, MemoryStore, StorageBackend, VfsFile};
/// use std::sync::Arc;
///
/// let fs = Fs::key_value(StorageBackend::new(Arc::new(MemoryStore::new())));
/// let file = fs.create("greeting").unwrap();
/// file.write(b"hi").unwrap();
/// file.sync().unwrap();
/// assert_eq!(fs.open("greeting").unwrap().read_to_end().unwrap(), b"hi");
/// ```
#[derive(Clone)]
pub struct Fs {
    backend: Arc<dyn FsBackend>,
}

impl Fs {
    pub fn new(backend: Arc<dyn FsBackend>) -> Fs {
        Fs { backend }
    }

    /// Files under a host directory. See [`DirFS::new`].
    pub fn native<P: AsRef<Path>>(root: P) -> Result<Fs> {
        Ok(Fs::new(Arc::new(DirFS::new(root)?)))
    }

    /// Files emulated on a flat key-value store.
    pub fn key_value(backend: StorageBackend) -> Fs {
        Fs::new(Arc::new(KvFS::new(backend)))
    }

    /// Builds the backend a [`Config`] describes, opening its store if it has one.
    pub fn from_config(config: &Config) -> Result<Fs> {
        match &config.backend {
            BackendConfig::Native { root } => {
                debug!("native backend at {}", root.display());
                Fs::native(root)
            }
            BackendConfig::KeyValue { store, .. } => {
                Fs::from_config_with_store(config, store.open()?)
            }
        }
    }

    /// Like [`from_config`](Fs::from_config), but the key-value backend uses `store` in place of
    /// the configured one. Fails with `Config` for a native configuration.
    pub fn from_config_with_store(config: &Config, store: Arc<dyn KeyValueStore>) -> Result<Fs> {
        match &config.backend {
            BackendConfig::KeyValue {
                app_scope,
                instance_scope,
                ..
            } => {
                let backend = StorageBackend::with_scopes(store, app_scope, instance_scope)?;
                debug!("key-value backend under {}", backend.prefix());
                Ok(Fs::key_value(backend))
            }
            BackendConfig::Native { .. } => Err(VfsError::Config(
                "a host store only applies to the key_value backend".to_string(),
            )),
        }
    }

    pub fn backend(&self) -> &Arc<dyn FsBackend> {
        &self.backend
    }

    pub fn open(&self, name: &str) -> Result<Box<dyn VfsFile>> {
        self.backend.open(name)
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn VfsFile>> {
        self.backend.create(name)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        self.backend.remove(name)
    }

    pub fn remove_all(&self, path: &str) -> Result<()> {
        self.backend.remove_all(path)
    }

    pub fn mkdir_all(&self, path: &str, perm: u32) -> Result<()> {
        self.backend.mkdir_all(path, perm)
    }

    pub fn stat(&self, name: &str) -> Result<FileInfo> {
        self.backend.stat(name)
    }
}
