//! Project file-tree entries, as supplied by the caller.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// One file in the build context, with its size on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: Utf8PathBuf,
    pub size_bytes: u64,
}

impl FileEntry {
    pub fn new(path: impl Into<Utf8PathBuf>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }
}

pub fn total_bytes(files: &[FileEntry]) -> u64 {
    files.iter().map(|f| f.size_bytes).sum()
}
