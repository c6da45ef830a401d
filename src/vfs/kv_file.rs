//! File handle over a single key of a flat key-value store.
//!
//! The whole file lives in an in-memory buffer while the handle is open. Reads, writes and seeks
//! only touch that buffer; [`KvFile::sync`](crate::VfsFile::sync) is the one operation that writes
//! it back to the store.
//!
//! Handles opened on the same key do not coordinate: each buffers its own writes and whichever
//! syncs last replaces the stored value.

use log::{debug, trace, warn};
use parking_lot::Mutex;

use crate::core::{VfsFile, Whence, utils};
use crate::error::{Result, VfsError};
use crate::storage::StorageBackend;
use crate::vfs::Entry;

struct Buffer {
    data: Vec<u8>,
    cursor: u64,
    dirty: bool, // buffer holds writes not yet stored
}

/// An open file backed by one key of a [`StorageBackend`].
///
/// The buffer, cursor and dirty flag sit behind one lock held for the duration of each call.
/// `None` marks a closed handle.
pub struct KvFile {
    name: String,
    backend: StorageBackend,
    state: Mutex<Option<Buffer>>,
}

impl KvFile {
    /// Loads the file stored under `name`.
    pub(crate) fn open(backend: StorageBackend, name: &str) -> Result<KvFile> {
        let text = backend.get(name)?.ok_or_else(|| VfsError::not_found(name))?;
        let entry = Entry::decode(name, &text)?;
        if entry.is_dir() {
            return Err(VfsError::IsADirectory {
                name: name.to_string(),
            });
        }
        debug!("open {name} ({} bytes)", entry.content().len());
        Ok(Self::with_content(backend, name, entry.into_content()))
    }

    /// Stores an empty file under `name`, replacing any previous file.
    pub(crate) fn create(backend: StorageBackend, name: &str) -> Result<KvFile> {
        if let Some(text) = backend.get(name)? {
            // A corrupt previous value is simply overwritten.
            if Entry::decode(name, &text).is_ok_and(|e| e.is_dir()) {
                return Err(VfsError::IsADirectory {
                    name: name.to_string(),
                });
            }
        }
        backend.set(name, &Entry::encode_file(name, &[])?)?;
        debug!("create {name}");
        Ok(Self::with_content(backend, name, Vec::new()))
    }

    fn with_content(backend: StorageBackend, name: &str, data: Vec<u8>) -> KvFile {
        KvFile {
            name: name.to_string(),
            backend,
            state: Mutex::new(Some(Buffer {
                data,
                cursor: 0,
                dirty: false,
            })),
        }
    }

    /// Runs `f` on the buffer of an open handle.
    fn with_buffer<T>(&self, f: impl FnOnce(&mut Buffer) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock();
        match state.as_mut() {
            Some(buffer) => f(buffer),
            None => Err(VfsError::closed(&self.name)),
        }
    }
}

/// Copies bytes of `data` starting at `pos` into `out`.
fn copy_from(data: &[u8], pos: u64, out: &mut [u8]) -> Result<usize> {
    if out.is_empty() {
        return Ok(0);
    }
    if pos >= data.len() as u64 {
        return Err(VfsError::EndOfFile);
    }
    let start = pos as usize;
    let n = out.len().min(data.len() - start);
    out[..n].copy_from_slice(&data[start..start + n]);
    Ok(n)
}

impl VfsFile for KvFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.with_buffer(|b| {
            let n = copy_from(&b.data, b.cursor, buf)?;
            b.cursor += n as u64;
            Ok(n)
        })
    }

    fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<usize> {
        self.with_buffer(|b| {
            if offset < 0 {
                return Err(VfsError::InvalidOffset {
                    offset: offset as i128,
                });
            }
            copy_from(&b.data, offset as u64, buf)
        })
    }

    fn seek(&self, offset: i64, whence: Whence) -> Result<u64> {
        self.with_buffer(|b| {
            b.cursor = utils::seek_target(b.cursor, b.data.len() as u64, offset, whence)?;
            trace!("seek {} -> {}", self.name, b.cursor);
            Ok(b.cursor)
        })
    }

    fn write(&self, buf: &[u8]) -> Result<usize> {
        self.with_buffer(|b| {
            if buf.is_empty() {
                return Ok(0);
            }
            let overflow = || VfsError::InvalidOffset {
                offset: b.cursor as i128 + buf.len() as i128,
            };
            let start = usize::try_from(b.cursor).map_err(|_| overflow())?;
            let end = start.checked_add(buf.len()).ok_or_else(overflow)?;
            if b.data.len() < end {
                // Zero-fills any gap left by a seek past the end.
                b.data.resize(end, 0);
            }
            b.data[start..end].copy_from_slice(buf);
            b.cursor = end as u64;
            b.dirty = true;
            trace!("write {} bytes to {} at {start}", buf.len(), self.name);
            Ok(buf.len())
        })
    }

    fn sync(&self) -> Result<()> {
        self.with_buffer(|b| {
            if !b.dirty {
                return Ok(());
            }
            let text = Entry::encode_file(&self.name, &b.data)?;
            self.backend.set(&self.name, &text)?;
            b.dirty = false;
            debug!("sync {} ({} bytes)", self.name, b.data.len());
            Ok(())
        })
    }

    fn close(&self) -> Result<()> {
        let buffer = self
            .state
            .lock()
            .take()
            .ok_or_else(|| VfsError::closed(&self.name))?;
        if buffer.dirty {
            warn!("{} closed with unsynced writes", self.name);
        }
        Ok(())
    }
}

impl Drop for KvFile {
    fn drop(&mut self) {
        if let Some(buffer) = self.state.get_mut() {
            if buffer.dirty {
                warn!("{} dropped with unsynced writes", self.name);
            }
        }
    }
}
