mod dir_file;
mod dir_fs;
mod entry;
mod file_info;
mod kv_file;
mod kv_fs;

pub use dir_file::DirFile;
pub use dir_fs::DirFS;
pub use entry::{Entry, EntryType};
pub use file_info::FileInfo;
pub use kv_file::KvFile;
pub use kv_fs::KvFS;
