use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::utils::format::file_category;

/// Metadata the object store reports for one stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub name: String,
    pub path: String,
    pub size: i64,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

/// A stored object as shown to the dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub id: Uuid,
    pub name: String,
    pub size: i64,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Coarse kind used for choosing an icon.
    pub category: String,
    pub uploaded_at: DateTime<Utc>,
    pub url: String,
    pub path: String,
}

impl StoredObject {
    pub fn from_metadata(meta: ObjectMetadata, url: String) -> Self {
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_URL, meta.path.as_bytes()),
            name: meta.name,
            size: meta.size,
            category: file_category(&meta.content_type).as_str().to_string(),
            mime_type: meta.content_type,
            uploaded_at: meta.created_at,
            url,
            path: meta.path,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Size,
    Date,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListFilesQuery {
    /// Case-insensitive substring matched against file names.
    pub q: Option<String>,
    pub sort: Option<SortKey>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RecentFilesQuery {
    /// Caller's offset from UTC in minutes, used for day grouping.
    pub tz_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    pub token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub new_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileListResponse {
    pub files: Vec<StoredObject>,
    pub total: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentFilesResponse {
    pub today: Vec<StoredObject>,
    pub yesterday: Vec<StoredObject>,
    pub older: Vec<StoredObject>,
    pub total: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    pub url: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenameResponse {
    pub message: String,
    pub file: StoredObject,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
    pub storage: crate::models::StorageAccount,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub files: Vec<StoredObject>,
    pub storage: crate::models::StorageAccount,
}
