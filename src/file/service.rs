//! File service for stash.
//!
//! This module provides the record operations exposed over HTTP:
//! - Upload of files, images and folders
//! - Owner-scoped show and paginated listing
//! - Publish / unpublish
//! - Content retrieval with public/private access control

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{error, info, warn};

use super::placement::PlacementPlanner;
use super::repository::{FileRepository, ParentFilter};
use super::storage::FileStorage;
use super::{FileRecord, FileType, NewFileRecord, Projection, ROOT_PARENT_ID};
use crate::db::Database;
use crate::queue::ProcessingDispatcher;
use crate::{Result, StashError};

/// Upload rejected: no name.
pub const MISSING_NAME: &str = "Missing name";
/// Upload rejected: no type, or not one of file/folder/image.
pub const MISSING_TYPE: &str = "Missing type";
/// Upload rejected: a file or image without data.
pub const MISSING_DATA: &str = "Missing data";
/// Upload rejected: data is not valid base64.
pub const INVALID_DATA: &str = "Invalid data";
/// Content requested for a folder.
pub const FOLDER_HAS_NO_CONTENT: &str = "A folder doesn't have content";

/// Request data for an upload.
///
/// Fields are optional so that validation can name the first missing one.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    /// Display name.
    pub name: Option<String>,
    /// Raw type string, validated against [`FileType`].
    pub file_type: Option<String>,
    /// Parent folder, `0` for top level.
    pub parent_id: i64,
    /// Initial visibility.
    pub is_public: bool,
    /// Base64 content; ignored for folders.
    pub data: Option<String>,
}

impl UploadRequest {
    /// Create a top-level, private upload request.
    pub fn new(name: impl Into<String>, file_type: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            file_type: Some(file_type.into()),
            parent_id: ROOT_PARENT_ID,
            ..Default::default()
        }
    }

    /// Set the base64 content.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the parent folder.
    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Set the initial visibility.
    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }
}

/// Validated upload, ready to place.
struct ValidUpload {
    name: String,
    file_type: FileType,
    content: Option<Vec<u8>>,
}

impl UploadRequest {
    fn validate(&self) -> Result<ValidUpload> {
        let name = match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(StashError::bad_request(MISSING_NAME)),
        };

        let file_type = self
            .file_type
            .as_deref()
            .and_then(|t| t.parse::<FileType>().ok())
            .ok_or_else(|| StashError::bad_request(MISSING_TYPE))?;

        let content = if file_type.has_content() {
            let data = self
                .data
                .as_deref()
                .filter(|data| !data.is_empty())
                .ok_or_else(|| StashError::bad_request(MISSING_DATA))?;
            let bytes = STANDARD
                .decode(data)
                .map_err(|_| StashError::bad_request(INVALID_DATA))?;
            Some(bytes)
        } else {
            None
        };

        Ok(ValidUpload {
            name,
            file_type,
            content,
        })
    }
}

/// Content of a file together with its record.
#[derive(Debug)]
pub struct ContentResult {
    /// The file record.
    pub record: FileRecord,
    /// Raw bytes.
    pub content: Vec<u8>,
    /// MIME type derived from the display name.
    pub content_type: String,
}

/// File service for record and content operations.
pub struct FileService<'a> {
    db: &'a Database,
    storage: &'a FileStorage,
    dispatcher: &'a ProcessingDispatcher,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(
        db: &'a Database,
        storage: &'a FileStorage,
        dispatcher: &'a ProcessingDispatcher,
    ) -> Self {
        Self {
            db,
            storage,
            dispatcher,
        }
    }

    fn repo(&self) -> FileRepository<'_> {
        FileRepository::new(self.db.pool())
    }

    /// Upload a file, image or folder owned by `user_id`.
    ///
    /// Content is written before the record is inserted, so a failed blob
    /// write leaves no metadata behind. A folder whose directory cannot be
    /// created is still recorded. Images are queued for post-processing;
    /// a queue failure does not fail the upload.
    pub async fn upload(&self, user_id: i64, request: &UploadRequest) -> Result<Projection> {
        let upload = request.validate()?;

        let placement = PlacementPlanner::new(self.db, self.storage)
            .plan(user_id, request.parent_id)
            .await?;
        let local_path = placement.path();

        match &upload.content {
            Some(content) => {
                if let Err(e) = self.storage.write(&local_path, content).await {
                    error!(user_id, path = %local_path.display(), error = %e, "Failed to write file content");
                    return Err(e);
                }
            }
            None => {
                if let Err(e) = self.storage.ensure_dir(&local_path).await {
                    warn!(user_id, path = %local_path.display(), error = %e, "Failed to create folder directory");
                }
            }
        }

        let record = self
            .repo()
            .insert(&NewFileRecord {
                user_id,
                name: upload.name,
                file_type: upload.file_type,
                is_public: request.is_public,
                parent_id: request.parent_id,
                local_path: local_path.to_string_lossy().into_owned(),
            })
            .await?;

        info!(
            user_id,
            file_id = record.id,
            file_type = %record.file_type,
            "File uploaded"
        );

        if record.file_type == FileType::Image {
            self.dispatcher.dispatch(user_id, record.id).await;
        }

        Ok(Projection::from(record))
    }

    /// A record owned by `user_id`.
    pub async fn show(&self, user_id: i64, id: i64) -> Result<Projection> {
        self.repo()
            .get_owned(id, user_id)
            .await?
            .map(Projection::from)
            .ok_or(StashError::NotFound)
    }

    /// One page of `user_id`'s records.
    pub async fn index(
        &self,
        user_id: i64,
        parent: ParentFilter,
        page: u32,
    ) -> Result<Vec<Projection>> {
        let records = self.repo().list_page(Some(user_id), parent, page).await?;
        Ok(records.into_iter().map(Projection::from).collect())
    }

    /// Make an owned record public or private.
    pub async fn set_visibility(
        &self,
        user_id: i64,
        id: i64,
        is_public: bool,
    ) -> Result<Projection> {
        let record = self
            .repo()
            .update_visibility(id, user_id, is_public)
            .await?
            .ok_or(StashError::NotFound)?;

        info!(user_id, file_id = id, is_public, "File visibility changed");
        Ok(Projection::from(record))
    }

    /// Read a record's content.
    ///
    /// Private records are only readable by their owner; anyone else,
    /// including an anonymous caller, gets `NotFound`.
    pub async fn retrieve_content(&self, caller: Option<i64>, id: i64) -> Result<ContentResult> {
        let record = self
            .repo()
            .get_by_id(id)
            .await?
            .filter(|record| record.readable_by(caller))
            .ok_or(StashError::NotFound)?;

        if record.is_folder() {
            return Err(StashError::bad_request(FOLDER_HAS_NO_CONTENT));
        }

        let content = self
            .storage
            .read(Path::new(&record.local_path))
            .await?
            .ok_or(StashError::NotFound)?;

        let content_type = mime_guess::from_path(&record.name)
            .first_or_octet_stream()
            .to_string();

        Ok(ContentResult {
            record,
            content,
            content_type,
        })
    }
}
