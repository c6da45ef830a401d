use crate::vfs::EntryType;

/// Snapshot of an entry returned by `stat`. Not linked to any open handle.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    name: String,
    size: u64,
    kind: EntryType,
}

impl FileInfo {
    pub fn new(name: impl Into<String>, size: u64, kind: EntryType) -> FileInfo {
        let size = match kind {
            EntryType::File => size,
            EntryType::Directory => 0,
        };
        FileInfo {
            name: name.into(),
            size,
            kind,
        }
    }

    /// Name as presented to `stat`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length in bytes; zero for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn kind(&self) -> EntryType {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryType::File
    }
}
