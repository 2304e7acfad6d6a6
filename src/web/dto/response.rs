//! Response DTOs.

use serde::Serialize;

use crate::datetime::to_rfc3339;
use crate::file::{FileRecord, Folder, Listing};
use crate::web::middleware::SessionClaims;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Folder entry.
#[derive(Debug, Serialize)]
pub struct FolderResponse {
    /// Folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Parent folder ID.
    pub parent_id: Option<i64>,
    /// Link to the folder listing.
    pub url: String,
    /// Creation time (RFC3339).
    pub created_at: String,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            url: format!("/files/{}", folder.id),
            id: folder.id,
            name: folder.name,
            parent_id: folder.parent_id,
            created_at: to_rfc3339(&folder.created_at),
        }
    }
}

/// File entry in a listing.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// File ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    pub mime_type: String,
    /// Containing folder ID.
    pub folder_id: Option<i64>,
    /// Link to the detail view.
    pub url: String,
    /// Upload time (RFC3339).
    pub uploaded_at: String,
}

impl From<FileRecord> for FileResponse {
    fn from(file: FileRecord) -> Self {
        Self {
            url: format!("/files/details/file/{}", file.id),
            id: file.id,
            name: file.name,
            size: file.size,
            mime_type: file.mime_type,
            folder_id: file.folder_id,
            uploaded_at: to_rfc3339(&file.uploaded_at),
        }
    }
}

/// One level of the user's tree.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    /// The folder being listed (null at the root level).
    pub folder: Option<FolderResponse>,
    /// Breadcrumb from the root down to `folder`.
    pub path: Vec<FolderResponse>,
    /// Child folders.
    pub folders: Vec<FolderResponse>,
    /// Files at this level.
    pub files: Vec<FileResponse>,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            folder: listing.folder.map(Into::into),
            path: listing.path.into_iter().map(Into::into).collect(),
            folders: listing.folders.into_iter().map(Into::into).collect(),
            files: listing.files.into_iter().map(Into::into).collect(),
        }
    }
}

/// File detail view.
#[derive(Debug, Serialize)]
pub struct FileDetailsResponse {
    /// File ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    pub mime_type: String,
    /// Containing folder ID.
    pub folder_id: Option<i64>,
    /// Upload time (RFC3339).
    pub uploaded_at: String,
    /// Last update time (RFC3339).
    pub updated_at: String,
    /// Download link.
    pub download_url: String,
    /// Delete link (POST).
    pub delete_url: String,
}

impl From<FileRecord> for FileDetailsResponse {
    fn from(file: FileRecord) -> Self {
        Self {
            download_url: format!("/files/download/{}", file.id),
            delete_url: format!("/files/delete/file/{}", file.id),
            id: file.id,
            name: file.name,
            size: file.size,
            mime_type: file.mime_type,
            folder_id: file.folder_id,
            uploaded_at: to_rfc3339(&file.uploaded_at),
            updated_at: to_rfc3339(&file.updated_at),
        }
    }
}

/// The signed-in user.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
}

impl From<SessionClaims> for SessionInfo {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
        }
    }
}

/// Description of a login or signup entry point.
#[derive(Debug, Serialize)]
pub struct AuthEntryResponse {
    /// Form target.
    pub action: &'static str,
    /// Form method.
    pub method: &'static str,
    /// Form field names.
    pub fields: &'static [&'static str],
    /// Current identity, if already signed in.
    pub user: Option<SessionInfo>,
}
