//! JSON description of which backend an [`Fs`](crate::Fs) should use.
//!
//! ```json
//! { "backend": { "kind": "native", "root": "/var/lib/app" } }
//! { "backend": { "kind": "key_value", "app_scope": "app", "instance_scope": "main",
//!                "store": { "type": "memory", "quota_bytes": 5242880 } } }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VfsError};
use crate::storage::{
    DEFAULT_APP_SCOPE, DEFAULT_INSTANCE_SCOPE, FileStore, KeyValueStore, MemoryStore,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Files live under `root` on the host filesystem.
    Native { root: PathBuf },
    /// Files live in a flat key-value store, namespaced by the two scopes.
    KeyValue {
        #[serde(default = "default_app_scope")]
        app_scope: String,
        #[serde(default = "default_instance_scope")]
        instance_scope: String,
        #[serde(default)]
        store: StoreConfig,
    },
}

/// The host store behind a key-value backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    Memory {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quota_bytes: Option<usize>,
    },
    File {
        path: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory { quota_bytes: None }
    }
}

fn default_app_scope() -> String {
    DEFAULT_APP_SCOPE.to_string()
}

fn default_instance_scope() -> String {
    DEFAULT_INSTANCE_SCOPE.to_string()
}

impl Config {
    pub fn from_json(text: &str) -> Result<Config> {
        serde_json::from_str(text).map_err(|e| VfsError::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| VfsError::from_io(path.display().to_string(), e))?;
        serde_json::from_str(&text)
            .map_err(|e| VfsError::Config(format!("{}: {e}", path.display())))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| VfsError::Config(e.to_string()))
    }
}

impl StoreConfig {
    /// Opens the store this entry describes.
    pub fn open(&self) -> Result<Arc<dyn KeyValueStore>> {
        Ok(match self {
            StoreConfig::Memory { quota_bytes: None } => Arc::new(MemoryStore::new()),
            StoreConfig::Memory {
                quota_bytes: Some(quota),
            } => Arc::new(MemoryStore::with_quota(*quota)),
            StoreConfig::File { path } => Arc::new(FileStore::open(path)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempdir::TempDir;

    #[test]
    fn test_native() -> Result<()> {
        let config = Config::from_json(r#"{ "backend": { "kind": "native", "root": "/var/lib/app" } }"#)?;
        assert_eq!(
            config.backend,
            BackendConfig::Native {
                root: PathBuf::from("/var/lib/app")
            }
        );
        Ok(())
    }

    #[test]
    fn test_key_value_defaults() -> Result<()> {
        let config = Config::from_json(r#"{ "backend": { "kind": "key_value" } }"#)?;
        assert_eq!(
            config.backend,
            BackendConfig::KeyValue {
                app_scope: DEFAULT_APP_SCOPE.to_string(),
                instance_scope: DEFAULT_INSTANCE_SCOPE.to_string(),
                store: StoreConfig::Memory { quota_bytes: None },
            }
        );
        Ok(())
    }

    #[test]
    fn test_key_value_full() -> Result<()> {
        let text = r#"{
            "backend": {
                "kind": "key_value",
                "app_scope": "app",
                "instance_scope": "main",
                "store": { "type": "memory", "quota_bytes": 1024 }
            }
        }"#;
        let config = Config::from_json(text)?;
        assert_eq!(
            config.backend,
            BackendConfig::KeyValue {
                app_scope: "app".to_string(),
                instance_scope: "main".to_string(),
                store: StoreConfig::Memory {
                    quota_bytes: Some(1024)
                },
            }
        );
        assert_eq!(Config::from_json(&config.to_json()?)?, config);
        Ok(())
    }

    #[test]
    fn test_malformed() {
        for text in [
            "",
            "{}",
            r#"{ "backend": { "kind": "ftp" } }"#,
            r#"{ "backend": { "kind": "native" } }"#,
            r#"{ "backend": { "kind": "key_value", "store": { "type": "file" } } }"#,
        ] {
            let err = Config::from_json(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "{text}");
        }
    }

    #[test]
    fn test_from_file() -> Result<()> {
        let temp_dir = TempDir::new("config_test").unwrap();
        let path = temp_dir.path().join("vfs.json");
        let store_path = temp_dir.path().join("store.json");
        let config = Config {
            backend: BackendConfig::KeyValue {
                app_scope: "app".to_string(),
                instance_scope: "main".to_string(),
                store: StoreConfig::File { path: store_path },
            },
        };
        std::fs::write(&path, config.to_json()?).unwrap();

        assert_eq!(Config::from_file(&path)?, config);
        assert_eq!(
            Config::from_file(temp_dir.path().join("missing.json"))
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(Config::from_file(&path).unwrap_err().kind(), ErrorKind::Config);
        Ok(())
    }

    #[test]
    fn test_open_store() -> Result<()> {
        let store = StoreConfig::Memory {
            quota_bytes: Some(16),
        }
        .open()?;
        let err = store.set("key", "a value that is far too long").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
        Ok(())
    }
}
