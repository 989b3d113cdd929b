//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use imageslim_types::files::FileEntry;

/// Source of the build-context file list.
pub trait ProjectScanner {
    /// Enumerate every file in the context with its size, paths relative to
    /// the context root.
    fn scan(&self) -> anyhow::Result<Vec<FileEntry>>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
