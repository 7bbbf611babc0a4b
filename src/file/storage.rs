//! Content storage on the local filesystem.
//!
//! Blobs live under a root directory. Each folder record owns a
//! subdirectory, so the on-disk layout mirrors the logical tree:
//! ```text
//! {root}/
//! ├── 3f2a...e1            (file blob)
//! └── 9c41...07/           (folder)
//!     └── 5b7d...aa        (file blob inside the folder)
//! ```
//! All names are UUID v4 strings, never the client's display name.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::Result;

/// Filesystem storage for file content and folder directories.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `root`.
    ///
    /// Nothing is created on disk until content is placed.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory for top-level records.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A fresh on-disk name.
    pub fn new_name() -> String {
        Uuid::new_v4().to_string()
    }

    /// Create `dir` and its ancestors. An existing directory is success.
    pub async fn ensure_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).await?;
        Ok(())
    }

    /// Write a blob, replacing any previous content at `path`.
    pub async fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        fs::write(path, content).await?;
        Ok(())
    }

    /// Read a blob. Returns `None` if nothing exists at `path`.
    pub async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
