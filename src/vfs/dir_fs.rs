//! This module provides a filesystem backend that maps to a real directory on the host system.
//! Every name is resolved inside a designated root, so callers use the same relative names they
//! would use with the key-value backend.
//!
//! ### Key Features:
//! - **Isolated root**: All operations are confined to `self.root`; `..` can never climb above it.
//! - **Path normalization**: `.` and `..` components are resolved and a leading `/` is ignored.
//! - **Uniform errors**: host I/O errors are mapped onto the same kinds the key-value backend
//!   reports (`NotFound`, `IsADirectory`, `NotADirectory`, ...).

use std::fs::{DirBuilder, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::core::{FsBackend, VfsFile, utils};
use crate::error::{Result, VfsError};
use crate::vfs::{DirFile, EntryType, FileInfo};

/// A filesystem backend rooted at a directory of the host filesystem.
///
/// ### Usage notes:
/// - `DirFS` does not follow symlinks when removing; `remove()` removes the link, not the target.
/// - Permissions are not adjusted; ensure `root` is writable.
/// - Handles write through to the host file. `sync()` forces the data to stable storage.
///
/// ### Example:
/// ```
/// use portable_vfs::{DirFS, FsBackend, VfsFile};
///
/// let root = std::env::temp_dir().join("portable_vfs_doc");
/// let fs = DirFS::new(&root).unwrap();
///
/// fs.mkdir_all("docs", 0o755).unwrap();
/// let file = fs.create("docs/note.txt").unwrap();
/// file.write(b"Hello").unwrap();
/// file.sync().unwrap();
/// assert_eq!(fs.stat("docs/note.txt").unwrap().size(), 5);
///
/// fs.remove_all("docs").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DirFS {
    root: PathBuf, // host-related absolute normalized path
}

impl DirFS {
    /// Creates a new `DirFS` instance with the root directory at `root`.
    /// * `root` is an absolute host path. If it does not exist it is created with its parents.
    /// If `root` is empty, relative, or an existing non-directory, an error is returned.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();

        if root.as_os_str().is_empty() {
            return Err(VfsError::Config("invalid root path: empty".to_string()));
        }
        if root.is_relative() {
            return Err(VfsError::Config(format!(
                "the root path must be absolute: {}",
                root.display()
            )));
        }

        let root = utils::normalize(root);
        let name = root.display().to_string();
        match std::fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(VfsError::NotADirectory { name }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                std::fs::create_dir_all(&root).map_err(|e| VfsError::from_io(name, e))?;
            }
            Err(e) => return Err(VfsError::from_io(name, e)),
        }

        Ok(Self { root })
    }

    /// Returns root path related to the host file system.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Returns the host path a caller-visible name resolves to.
    pub fn to_host(&self, name: &str) -> PathBuf {
        let inner = utils::normalize(Path::new("/").join(name));
        match inner.strip_prefix("/") {
            Ok(relative) => self.root.join(relative),
            Err(_) => self.root.join(inner),
        }
    }

    fn io(name: &str) -> impl Fn(io::Error) -> VfsError + '_ {
        move |e| VfsError::from_io(name, e)
    }

    /// Best-effort removal of every child of `dir`; returns the first failure.
    fn clear_dir(dir: &Path, name: &str) -> Result<()> {
        let mut first_error = None;
        for entry in std::fs::read_dir(dir).map_err(Self::io(name))? {
            let result = entry.and_then(|e| utils::rm_on_host(e.path()));
            match result {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!("remove_all {name}: {e}");
                    first_error.get_or_insert(VfsError::from_io(name, e));
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl FsBackend for DirFS {
    /// Opens an existing regular file for reading and writing.
    /// Falls back to read-only access when the host denies writing.
    fn open(&self, name: &str) -> Result<Box<dyn VfsFile>> {
        let host = self.to_host(name);
        let meta = std::fs::metadata(&host).map_err(Self::io(name))?;
        if meta.is_dir() {
            return Err(VfsError::IsADirectory {
                name: name.to_string(),
            });
        }

        let file = match OpenOptions::new().read(true).write(true).open(&host) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                File::open(&host).map_err(Self::io(name))?
            }
            Err(e) => return Err(VfsError::from_io(name, e)),
        };
        debug!("open {name} -> {}", host.display());
        Ok(Box::new(DirFile::new(name, file)))
    }

    /// Creates or truncates a file. The parent directory must exist.
    fn create(&self, name: &str) -> Result<Box<dyn VfsFile>> {
        let host = self.to_host(name);
        if host.is_dir() {
            return Err(VfsError::IsADirectory {
                name: name.to_string(),
            });
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&host)
            .map_err(Self::io(name))?;
        debug!("create {name} -> {}", host.display());
        Ok(Box::new(DirFile::new(name, file)))
    }

    /// Removes a file or an empty directory; a missing entry is not an error.
    fn remove(&self, name: &str) -> Result<()> {
        let host = self.to_host(name);
        let result = match std::fs::symlink_metadata(&host) {
            Ok(meta) if meta.is_dir() => std::fs::remove_dir(&host),
            Ok(_) => std::fs::remove_file(&host),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                debug!("remove {name}");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VfsError::from_io(name, e)),
        }
    }

    /// Removes `path` and everything below it; a missing path is not an error.
    /// The root itself is never removed, only emptied.
    fn remove_all(&self, path: &str) -> Result<()> {
        let host = self.to_host(path);
        if host == self.root {
            return Self::clear_dir(&host, path);
        }
        match utils::rm_on_host(&host) {
            Ok(()) => {
                debug!("remove_all {path}");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VfsError::from_io(path, e)),
        }
    }

    /// Creates `path` and any missing parents.
    /// Fails with `NotADirectory` if a file sits anywhere on the path.
    fn mkdir_all(&self, path: &str, perm: u32) -> Result<()> {
        let target = self.to_host(path);
        let relative = target.strip_prefix(&self.root).unwrap_or(Path::new(""));

        let mut builder = DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(perm);
        }
        #[cfg(not(unix))]
        let _ = perm;

        let mut built = self.root.clone();
        let mut created = 0usize;
        for component in relative.components() {
            built.push(component);
            match std::fs::metadata(&built) {
                Ok(meta) if meta.is_dir() => continue,
                Ok(_) => {
                    return Err(VfsError::NotADirectory {
                        name: path.to_string(),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(VfsError::from_io(path, e)),
            }
            match builder.create(&built) {
                Ok(()) => created += 1,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && built.is_dir() => {}
                Err(e) => return Err(VfsError::from_io(path, e)),
            }
        }
        debug!("mkdir_all {path}: {created} created");
        Ok(())
    }

    fn stat(&self, name: &str) -> Result<FileInfo> {
        let meta = std::fs::metadata(self.to_host(name)).map_err(Self::io(name))?;
        let kind = if meta.is_dir() {
            EntryType::Directory
        } else {
            EntryType::File
        };
        Ok(FileInfo::new(name, meta.len(), kind))
    }
}
