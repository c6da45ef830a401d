use std::path::{Component, Path, PathBuf};

use crate::core::Whence;
use crate::error::{Result, VfsError};

/// Resolves `.` and `..` components lexically.
/// A `..` above the first component is dropped, so an absolute path never rises above `/`.
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(parent) = result.parent() {
                    result = parent.to_path_buf();
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// Removes a file, or a directory with all its contents, from the host.
pub fn rm_on_host<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

/// Returns the ancestors of a slash-separated key followed by the key itself, shortest first.
/// Each ancestor is the key text up to one of its `/`, so a leading slash is kept. Prefixes that
/// are empty or end in `/` (from doubled slashes) are skipped, as is a key made only of slashes.
///
/// `"/a/b"` gives `["/a", "/a/b"]`; `"a/b/"` gives `["a", "a/b", "a/b/"]`.
pub fn key_ancestors(key: &str) -> Vec<String> {
    if key.chars().all(|c| c == '/') {
        return Vec::new();
    }
    let mut out: Vec<String> = key
        .match_indices('/')
        .map(|(i, _)| &key[..i])
        .filter(|prefix| !prefix.is_empty() && !prefix.ends_with('/'))
        .map(str::to_string)
        .collect();
    out.push(key.to_string());
    out
}

/// Computes a cursor position for a seek request.
/// * `current` - the cursor before the seek.
/// * `len` - the file length used as the base for [`Whence::End`].
pub fn seek_target(current: u64, len: u64, offset: i64, whence: Whence) -> Result<u64> {
    let base = match whence {
        Whence::Start => 0,
        Whence::Current => current as i128,
        Whence::End => len as i128,
    };
    let target = base + offset as i128;
    if target < 0 || target > i64::MAX as i128 {
        return Err(VfsError::InvalidOffset { offset: target });
    }
    Ok(target as u64)
}
