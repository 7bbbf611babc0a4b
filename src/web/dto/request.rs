//! Request DTOs for the HTTP interface.

use serde::Deserialize;

use crate::file::{ParentFilter, UploadRequest, PARENT_NOT_FOUND, ROOT_PARENT_ID};
use crate::StashError;

/// A parent ID sent either as a JSON number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParentIdInput {
    /// `"parentId": 4`
    Number(i64),
    /// `"parentId": "4"`
    Text(String),
}

impl ParentIdInput {
    fn to_id(&self) -> Option<i64> {
        match self {
            ParentIdInput::Number(id) => Some(*id),
            ParentIdInput::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// File upload request body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// `file`, `folder` or `image`.
    #[serde(default, rename = "type")]
    pub file_type: Option<String>,
    /// Parent folder; absent means top level.
    #[serde(default)]
    pub parent_id: Option<ParentIdInput>,
    /// Initial visibility, private when absent.
    #[serde(default)]
    pub is_public: Option<bool>,
    /// Base64 content.
    #[serde(default)]
    pub data: Option<String>,
}

impl TryFrom<UploadFileRequest> for UploadRequest {
    type Error = StashError;

    /// A parent ID that is not a number cannot name a folder.
    fn try_from(req: UploadFileRequest) -> Result<Self, Self::Error> {
        let parent_id = match &req.parent_id {
            None => ROOT_PARENT_ID,
            Some(input) => input
                .to_id()
                .ok_or_else(|| StashError::bad_request(PARENT_NOT_FOUND))?,
        };

        Ok(UploadRequest {
            name: req.name,
            file_type: req.file_type,
            parent_id,
            is_public: req.is_public.unwrap_or(false),
            data: req.data,
        })
    }
}

/// Query parameters for listing files.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexQuery {
    /// Restrict to children of this folder; `0` lists top-level records.
    #[serde(default)]
    pub parent_id: Option<i64>,
    /// Zero-based page number.
    #[serde(default)]
    pub page: Option<u32>,
}

impl IndexQuery {
    /// The parent restriction for the listing.
    pub fn parent_filter(&self) -> ParentFilter {
        match self.parent_id {
            Some(id) => ParentFilter::Parent(id),
            None => ParentFilter::Any,
        }
    }

    /// The requested page, first page when absent.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(0)
    }
}

/// Query parameters for content retrieval.
#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    /// Thumbnail size. Accepted for compatibility; the original content is
    /// always served.
    #[serde(default)]
    pub size: Option<String>,
}
