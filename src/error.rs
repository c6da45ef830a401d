//! Error taxonomy shared by every backend.
//!
//! Both the native and the key-value backends report failures through [`VfsError`], so calling
//! code can branch on [`VfsError::kind`] without knowing which backend produced the error.

use std::io;

use thiserror::Error;

/// Errors produced by file handles, backends and the dispatch facade.
#[derive(Debug, Error)]
pub enum VfsError {
    #[error("{name}: no such file or directory")]
    NotFound { name: String },

    #[error("end of file")]
    EndOfFile,

    #[error("invalid offset: {offset}")]
    InvalidOffset { offset: i128 },

    #[error("invalid whence: {0}")]
    InvalidWhence(i32),

    #[error("{name}: stored value is corrupt: {reason}")]
    Encoding { name: String, reason: String },

    #[error("{name}: file already closed")]
    ClosedHandle { name: String },

    #[error("{name}: not a directory")]
    NotADirectory { name: String },

    #[error("{name}: is a directory")]
    IsADirectory { name: String },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("authentication failed: wrong password or tampered payload")]
    Authentication,

    #[error("invalid namespace scope: {0:?}")]
    InvalidScope(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Fieldless discriminant of [`VfsError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    EndOfFile,
    InvalidOffset,
    InvalidWhence,
    Encoding,
    ClosedHandle,
    NotADirectory,
    IsADirectory,
    StorageUnavailable,
    Authentication,
    InvalidScope,
    Config,
    Io,
}

impl VfsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VfsError::NotFound { .. } => ErrorKind::NotFound,
            VfsError::EndOfFile => ErrorKind::EndOfFile,
            VfsError::InvalidOffset { .. } => ErrorKind::InvalidOffset,
            VfsError::InvalidWhence(_) => ErrorKind::InvalidWhence,
            VfsError::Encoding { .. } => ErrorKind::Encoding,
            VfsError::ClosedHandle { .. } => ErrorKind::ClosedHandle,
            VfsError::NotADirectory { .. } => ErrorKind::NotADirectory,
            VfsError::IsADirectory { .. } => ErrorKind::IsADirectory,
            VfsError::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            VfsError::Authentication => ErrorKind::Authentication,
            VfsError::InvalidScope(_) => ErrorKind::InvalidScope,
            VfsError::Config(_) => ErrorKind::Config,
            VfsError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Maps a host I/O error onto the taxonomy.
    /// * `name` is the caller-visible name the operation was applied to.
    pub fn from_io(name: impl Into<String>, err: io::Error) -> Self {
        let name = name.into();
        match err.kind() {
            io::ErrorKind::NotFound => VfsError::NotFound { name },
            io::ErrorKind::IsADirectory => VfsError::IsADirectory { name },
            io::ErrorKind::NotADirectory => VfsError::NotADirectory { name },
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => {
                VfsError::StorageUnavailable(format!("{name}: {err}"))
            }
            _ => VfsError::Io { name, source: err },
        }
    }

    pub(crate) fn not_found(name: &str) -> Self {
        VfsError::NotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn closed(name: &str) -> Self {
        VfsError::ClosedHandle {
            name: name.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VfsError>;
