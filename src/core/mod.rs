pub mod utils;

use crate::error::{Result, VfsError};
use crate::vfs::FileInfo;

/// Reference point for [`VfsFile::seek`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

impl TryFrom<i32> for Whence {
    type Error = VfsError;

    /// Accepts the conventional wire values: 0 = start, 1 = current, 2 = end.
    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Whence::Start),
            1 => Ok(Whence::Current),
            2 => Ok(Whence::End),
            other => Err(VfsError::InvalidWhence(other)),
        }
    }
}

/// Capability set of an open file handle.
///
/// Handles lock internally, so every method takes `&self` and a handle may be shared between
/// threads. Once [`close`](VfsFile::close) has succeeded every other method (and a second close)
/// fails with `ClosedHandle`.
///
/// Writes are buffered: only [`sync`](VfsFile::sync) guarantees that data reaches the underlying
/// storage. Closing a handle with unsynced writes may discard them.
pub trait VfsFile: Send + Sync {
    /// Returns the name of the file as presented to `open` or `create`.
    fn name(&self) -> &str;

    /// Reads up to `buf.len()` bytes at the cursor and advances it.
    /// Fails with `EndOfFile` when nothing is left and `buf` is not empty.
    fn read(&self, buf: &mut [u8]) -> Result<usize>;

    /// Reads up to `buf.len()` bytes starting at `offset`; the cursor is not moved.
    fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<usize>;

    /// Moves the cursor and returns its new absolute position.
    /// Seeking past the end is allowed; seeking before the start fails with `InvalidOffset`.
    fn seek(&self, offset: i64, whence: Whence) -> Result<u64>;

    /// Writes `buf` at the cursor, extending the file as needed, and advances the cursor.
    fn write(&self, buf: &[u8]) -> Result<usize>;

    /// Commits buffered writes to stable storage.
    fn sync(&self) -> Result<()>;

    /// Releases the handle.
    fn close(&self) -> Result<()>;

    /// Reads everything from the cursor to the end of the file.
    fn read_to_end(&self) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            match self.read(&mut chunk) {
                Ok(n) => content.extend_from_slice(&chunk[..n]),
                Err(VfsError::EndOfFile) => return Ok(content),
                Err(e) => return Err(e),
            }
        }
    }
}

/// A storage strategy behind the [`Fs`](crate::Fs) facade.
///
/// Implementations must report identical error kinds for identical conditions, so callers never
/// need to know which backend they are talking to.
pub trait FsBackend: Send + Sync {
    /// Opens an existing file.
    fn open(&self, name: &str) -> Result<Box<dyn VfsFile>>;

    /// Creates or truncates a file.
    fn create(&self, name: &str) -> Result<Box<dyn VfsFile>>;

    /// Removes a file or an empty directory. Succeeds if `name` does not exist.
    fn remove(&self, name: &str) -> Result<()>;

    /// Removes everything under `path`; reports the first failure after trying all entries.
    fn remove_all(&self, path: &str) -> Result<()>;

    /// Creates a directory together with any missing parents.
    fn mkdir_all(&self, path: &str, perm: u32) -> Result<()>;

    /// Describes the named entry as currently persisted.
    fn stat(&self, name: &str) -> Result<FileInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_whence_from_wire_values() {
        assert_eq!(Whence::try_from(0).unwrap(), Whence::Start);
        assert_eq!(Whence::try_from(1).unwrap(), Whence::Current);
        assert_eq!(Whence::try_from(2).unwrap(), Whence::End);

        let err = Whence::try_from(3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidWhence);
        assert_eq!(Whence::try_from(-1).unwrap_err().kind(), ErrorKind::InvalidWhence);
    }
}
