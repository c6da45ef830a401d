//! Stored representation of a single key: a file with its bytes, or a directory.
//!
//! Host stores only hold text, so every entry is written as a small JSON record:
//!
//! ```text
//! {"kind":"file","data":"<base64 payload>"}
//! {"kind":"directory"}
//! ```
//!
//! The kind lives in its own field, so no file payload can ever decode as a directory.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VfsError};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EntryType {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    entry_type: EntryType,
    content: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record {
    File { data: String },
    Directory,
}

impl Entry {
    pub fn file(content: Vec<u8>) -> Entry {
        Entry {
            entry_type: EntryType::File,
            content,
        }
    }

    pub fn directory() -> Entry {
        Entry {
            entry_type: EntryType::Directory,
            content: Vec::new(),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    /// File bytes; always empty for a directory.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }

    /// Encodes the entry into the text stored on the host.
    /// * `name` identifies the key in the `Encoding` error.
    pub fn encode(&self, name: &str) -> Result<String> {
        match self.entry_type {
            EntryType::File => Self::encode_file(name, &self.content),
            EntryType::Directory => Self::encode_record(name, &Record::Directory),
        }
    }

    /// Encodes file bytes without building an `Entry` first.
    pub fn encode_file(name: &str, content: &[u8]) -> Result<String> {
        Self::encode_record(
            name,
            &Record::File {
                data: B64.encode(content),
            },
        )
    }

    fn encode_record(name: &str, record: &Record) -> Result<String> {
        serde_json::to_string(record).map_err(|e| VfsError::Encoding {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Decodes stored text back into an entry.
    /// * `name` identifies the key in the `Encoding` error.
    pub fn decode(name: &str, text: &str) -> Result<Entry> {
        let corrupt = |reason: String| VfsError::Encoding {
            name: name.to_string(),
            reason,
        };
        let record: Record = serde_json::from_str(text).map_err(|e| corrupt(e.to_string()))?;
        match record {
            Record::File { data } => {
                let content = B64.decode(data).map_err(|e| corrupt(e.to_string()))?;
                Ok(Entry::file(content))
            }
            Record::Directory => Ok(Entry::directory()),
        }
    }
}
