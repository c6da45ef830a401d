use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use log::{debug, trace};
use parking_lot::Mutex;

use crate::core::{VfsFile, Whence, utils};
use crate::error::{Result, VfsError};

/// An open host file.
///
/// Wraps [`std::fs::File`] so that it reports the same error kinds as the key-value handle:
/// exhausted reads fail with `EndOfFile`, seeks before the start with `InvalidOffset`, and any
/// call after `close` with `ClosedHandle`.
pub struct DirFile {
    name: String,
    file: Mutex<Option<File>>,
}

impl DirFile {
    pub(crate) fn new(name: &str, file: File) -> DirFile {
        DirFile {
            name: name.to_string(),
            file: Mutex::new(Some(file)),
        }
    }

    fn with_file<T>(&self, f: impl FnOnce(&mut File) -> std::io::Result<T>) -> Result<T> {
        let mut guard = self.file.lock();
        let file = guard.as_mut().ok_or_else(|| VfsError::closed(&self.name))?;
        f(file).map_err(|e| VfsError::from_io(self.name.as_str(), e))
    }
}

/// Reads until `buf` is full or the file ends.
fn read_full(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match file.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

impl VfsFile for DirFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let n = self.with_file(|f| f.read(buf))?;
        if n == 0 && !buf.is_empty() {
            return Err(VfsError::EndOfFile);
        }
        Ok(n)
    }

    fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<usize> {
        let mut guard = self.file.lock();
        let file = guard.as_mut().ok_or_else(|| VfsError::closed(&self.name))?;
        if offset < 0 {
            return Err(VfsError::InvalidOffset {
                offset: offset as i128,
            });
        }
        let io = |e| VfsError::from_io(self.name.as_str(), e);

        let saved = file.stream_position().map_err(io)?;
        file.seek(SeekFrom::Start(offset as u64)).map_err(io)?;
        let read = read_full(file, buf);
        file.seek(SeekFrom::Start(saved)).map_err(io)?;

        let n = read.map_err(io)?;
        if n == 0 && !buf.is_empty() {
            return Err(VfsError::EndOfFile);
        }
        Ok(n)
    }

    fn seek(&self, offset: i64, whence: Whence) -> Result<u64> {
        let mut guard = self.file.lock();
        let file = guard.as_mut().ok_or_else(|| VfsError::closed(&self.name))?;
        let io = |e| VfsError::from_io(self.name.as_str(), e);

        let current = file.stream_position().map_err(io)?;
        let len = file.metadata().map_err(io)?.len();
        let target = utils::seek_target(current, len, offset, whence)?;
        let pos = file.seek(SeekFrom::Start(target)).map_err(io)?;
        trace!("seek {} -> {pos}", self.name);
        Ok(pos)
    }

    fn write(&self, buf: &[u8]) -> Result<usize> {
        self.with_file(|f| f.write_all(buf))?;
        trace!("write {} bytes to {}", buf.len(), self.name);
        Ok(buf.len())
    }

    fn sync(&self) -> Result<()> {
        self.with_file(|f| {
            f.flush()?;
            f.sync_all()
        })?;
        debug!("sync {}", self.name);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        // Dropping the host handle closes the descriptor.
        self.file
            .lock()
            .take()
            .map(drop)
            .ok_or_else(|| VfsError::closed(&self.name))
    }
}
