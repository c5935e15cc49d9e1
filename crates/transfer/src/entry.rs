use std::path::PathBuf;
use std::sync::Arc;

/// Where an entry's bytes come from.
///
/// Content is reopened for every upload attempt, so a handle is only a
/// recipe for reading, never an open stream.
#[derive(Debug, Clone)]
pub enum EntryContent {
    /// A file on the local filesystem.
    File(PathBuf),
    /// Bytes already held in memory.
    Memory(Arc<[u8]>),
}

/// One file staged for transfer to the device.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Destination path relative to the device web root, `/` separated.
    pub relative_path: String,
    /// Size at collection time. Only used for progress accounting.
    pub size: u64,
    pub content: EntryContent,
}

impl Entry {
    /// Creates an entry backed by in-memory bytes.
    pub fn from_bytes(relative_path: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        let data = data.into();
        Self {
            relative_path: relative_path.into(),
            size: data.len() as u64,
            content: EntryContent::Memory(data),
        }
    }

    /// Creates an entry backed by a local file.
    pub fn from_file(relative_path: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            relative_path: relative_path.into(),
            size,
            content: EntryContent::File(path.into()),
        }
    }
}
