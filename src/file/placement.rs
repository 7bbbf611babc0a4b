//! Where new content lands on disk.

use std::path::{Path, PathBuf};

use tracing::warn;

use super::{FileRepository, FileStorage, ROOT_PARENT_ID};
use crate::db::Database;
use crate::{Result, StashError};

/// Message for an unknown (or foreign) parent.
pub const PARENT_NOT_FOUND: &str = "Parent not found";

/// Message for a parent that is not a folder.
pub const PARENT_NOT_A_FOLDER: &str = "Parent is not a folder";

/// Target location of a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Directory the record goes into.
    pub directory: PathBuf,
    /// On-disk name, unrelated to the display name.
    pub filename: String,
}

impl Placement {
    /// Full path of the record: the blob for files, the directory for folders.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Resolves a parent ID to a directory and picks a fresh filename.
pub struct PlacementPlanner<'a> {
    db: &'a Database,
    storage: &'a FileStorage,
}

impl<'a> PlacementPlanner<'a> {
    /// Create a planner.
    pub fn new(db: &'a Database, storage: &'a FileStorage) -> Self {
        Self { db, storage }
    }

    /// Plan the placement of a new record owned by `owner_id` under `parent_id`.
    ///
    /// A parent owned by someone else is reported as not found.
    pub async fn plan(&self, owner_id: i64, parent_id: i64) -> Result<Placement> {
        let directory = if parent_id == ROOT_PARENT_ID {
            self.storage.root().to_path_buf()
        } else {
            let repo = FileRepository::new(self.db.pool());
            let parent = repo
                .get_owned(parent_id, owner_id)
                .await?
                .ok_or_else(|| StashError::bad_request(PARENT_NOT_FOUND))?;

            if !parent.is_folder() {
                return Err(StashError::bad_request(PARENT_NOT_A_FOLDER));
            }
            PathBuf::from(parent.local_path)
        };

        self.ensure_dir_lenient(&directory).await;

        Ok(Placement {
            directory,
            filename: FileStorage::new_name(),
        })
    }

    async fn ensure_dir_lenient(&self, dir: &Path) {
        if let Err(e) = self.storage.ensure_dir(dir).await {
            warn!(directory = %dir.display(), error = %e, "Could not create directory");
        }
    }
}
