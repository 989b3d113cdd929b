//! Default filesystem-backed port implementations.

use crate::ports::{ProjectScanner, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use imageslim_types::files::FileEntry;
use tracing::debug;

/// Walks the build context directory and lists every regular file.
///
/// Paths are reported relative to the context root with `/` separators,
/// matching how build-spec COPY sources and ignore rules are written.
#[derive(Debug, Clone)]
pub struct FsProjectScanner {
    pub context_dir: Utf8PathBuf,
}

impl FsProjectScanner {
    pub fn new(context_dir: Utf8PathBuf) -> Self {
        Self { context_dir }
    }

    fn walk(&self, dir: &Utf8Path, out: &mut Vec<FileEntry>) -> anyhow::Result<()> {
        for entry in fs_err::read_dir(dir.as_std_path()).with_context(|| format!("read {dir}"))? {
            let entry = entry.with_context(|| format!("read entry in {dir}"))?;
            let path = Utf8PathBuf::from_path_buf(entry.path())
                .map_err(|p| anyhow::anyhow!("non-UTF-8 path in context: {}", p.display()))?;
            let metadata = entry.metadata().with_context(|| format!("stat {path}"))?;

            if metadata.is_dir() {
                self.walk(&path, out)?;
            } else if metadata.is_file() {
                let relative = path
                    .strip_prefix(&self.context_dir)
                    .with_context(|| format!("relativize {path}"))?;
                out.push(FileEntry::new(relative.to_path_buf(), metadata.len()));
            }
            // Symlinks and other special entries are skipped.
        }
        Ok(())
    }
}

impl ProjectScanner for FsProjectScanner {
    fn scan(&self) -> anyhow::Result<Vec<FileEntry>> {
        let mut files = Vec::new();
        self.walk(&self.context_dir, &mut files)?;
        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(files = files.len(), context = %self.context_dir, "scanned build context");
        Ok(files)
    }
}

/// Pre-listed context for embedding and testing. Sorted on construction to
/// match `FsProjectScanner`'s deterministic ordering.
#[derive(Debug, Clone)]
pub struct InMemoryProjectScanner {
    files: Vec<FileEntry>,
}

impl InMemoryProjectScanner {
    pub fn new(mut files: Vec<FileEntry>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self { files }
    }
}

impl ProjectScanner for InMemoryProjectScanner {
    fn scan(&self) -> anyhow::Result<Vec<FileEntry>> {
        Ok(self.files.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent.as_std_path())
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs_err::write(path.as_std_path(), contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs_err::create_dir_all(path.as_std_path())
            .with_context(|| format!("create_dir_all {}", path))
    }
}
