//! POSIX-style file access over either a host directory or a flat key-value store.
//!
//! ### Overview
//!
//! `portable-vfs` lets the same code read and write files whether it runs on a machine with a real
//! filesystem or in a host that only offers a string-keyed persistent map (browser `localStorage`
//! is the archetype). The [`Fs`] facade exposes six operations (`open`, `create`, `remove`,
//! `remove_all`, `mkdir_all`, `stat`) and dispatches them to an [`FsBackend`] chosen at
//! construction:
//!
//! - [`DirFS`] maps names onto a directory of the host filesystem.
//! - [`KvFS`] emulates files and directories on a [`KeyValueStore`]. Every file is one key; its
//!   bytes are base64 inside a small JSON record, and directories are records of their own.
//!
//! **Key ideas**:
//! - **One error taxonomy**: both backends report the same [`ErrorKind`] for the same condition.
//! - **Explicit durability**: key-value handles buffer writes; only `sync` persists them.
//! - **Namespacing**: key-value data lives under `<app>/<instance>/`, so several instances can
//!   share one host store.
//!
//! ### Example
//!
//! ```
//! use std::sync::Arc;
//! use portable_vfs::{Fs, MemoryStore, StorageBackend, VfsFile};
//!
//! let fs = Fs::key_value(StorageBackend::new(Arc::new(MemoryStore::new())));
//! fs.mkdir_all("notes", 0o755).unwrap();
//!
//! let file = fs.create("notes/todo.txt").unwrap();
//! file.write(b"buy milk").unwrap();
//! file.sync().unwrap();
//! file.close().unwrap();
//!
//! assert_eq!(fs.stat("notes/todo.txt").unwrap().size(), 8);
//! ```

mod config;
mod core;
mod error;
mod facade;
mod sealed;
mod storage;
mod vfs;

pub use config::{BackendConfig, Config, StoreConfig};
pub use crate::core::{FsBackend, VfsFile, Whence};
pub use error::{ErrorKind, Result, VfsError};
pub use facade::Fs;
pub use sealed::{PayloadCipher, read_sealed, write_sealed};
pub use storage::{
    DEFAULT_APP_SCOPE, DEFAULT_INSTANCE_SCOPE, FileStore, KeyValueStore, MemoryStore,
    StorageBackend,
};
pub use vfs::{DirFS, DirFile, Entry, EntryType, FileInfo, KvFS, KvFile};
