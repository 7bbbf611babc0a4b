//! File management module for stash.
//!
//! This module provides:
//! - File/folder records forming a tree under the virtual root `0`
//! - Placement of new content on disk
//! - Content storage with UUID naming
//! - The service orchestrating upload, listing, visibility and retrieval

mod placement;
mod repository;
mod service;
mod storage;

pub use placement::{Placement, PlacementPlanner, PARENT_NOT_A_FOLDER, PARENT_NOT_FOUND};
pub use repository::{FileRepository, ParentFilter};
pub use service::{
    ContentResult, FileService, UploadRequest, FOLDER_HAS_NO_CONTENT, INVALID_DATA, MISSING_DATA,
    MISSING_NAME, MISSING_TYPE,
};
pub use storage::FileStorage;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Parent id of top-level records.
pub const ROOT_PARENT_ID: i64 = 0;

/// Records per listing page.
pub const PAGE_SIZE: i64 = 20;

/// Kind of a file record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum FileType {
    /// Plain file with content.
    File,
    /// Folder; has no content, holds children.
    Folder,
    /// Image; has content and triggers post-processing.
    Image,
}

impl FileType {
    /// String representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::File => "file",
            FileType::Folder => "folder",
            FileType::Image => "image",
        }
    }

    /// Whether records of this type own a content blob.
    pub fn has_content(&self) -> bool {
        !matches!(self, FileType::Folder)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(FileType::File),
            "folder" => Ok(FileType::Folder),
            "image" => Ok(FileType::Image),
            _ => Err(format!("unknown file type: {s}")),
        }
    }
}

/// A stored file or folder.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique record ID.
    pub id: i64,
    /// Owner; set once at creation.
    pub user_id: i64,
    /// Display name supplied by the client.
    pub name: String,
    /// Record kind.
    pub file_type: FileType,
    /// Whether anyone may read the content.
    pub is_public: bool,
    /// Parent folder ID, `0` for top level.
    pub parent_id: i64,
    /// Content blob path for files and images, directory path for folders.
    pub local_path: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl FileRecord {
    /// Whether this record is a folder.
    pub fn is_folder(&self) -> bool {
        self.file_type == FileType::Folder
    }

    /// Whether `user_id` may read this record's content.
    pub fn readable_by(&self, user_id: Option<i64>) -> bool {
        self.is_public || user_id == Some(self.user_id)
    }
}

/// Data for creating a new record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Owner.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// Record kind.
    pub file_type: FileType,
    /// Initial visibility.
    pub is_public: bool,
    /// Parent folder ID, `0` for top level.
    pub parent_id: i64,
    /// Content or directory path.
    pub local_path: String,
}

/// The client-visible part of a [`FileRecord`].
///
/// Every read path answers with this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// Record ID.
    pub id: i64,
    /// Owner ID.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// Record kind.
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Visibility.
    pub is_public: bool,
    /// Parent folder ID, `0` for top level.
    pub parent_id: i64,
}

impl From<&FileRecord> for Projection {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            name: record.name.clone(),
            file_type: record.file_type,
            is_public: record.is_public,
            parent_id: record.parent_id,
        }
    }
}

impl From<FileRecord> for Projection {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            name: record.name,
            file_type: record.file_type,
            is_public: record.is_public,
            parent_id: record.parent_id,
        }
    }
}
