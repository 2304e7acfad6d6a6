//! Folder and file handlers.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;

use crate::file::UploadRequest;
use crate::web::dto::{
    ApiResponse, FileDetailsResponse, FolderForm, ListingResponse, ValidatedForm,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::FileboxError;

use super::AppState;

const FILES_PATH: &str = "/files";

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are dropped, quotes and backslashes are replaced in
/// the plain `filename` parameter, and names that needed changes or are not
/// ASCII also carry an RFC 5987 `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && sanitized == filename {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Parse a numeric id from a path segment. Anything else is a missing page.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found())
}

fn folder_location(folder_id: Option<i64>) -> String {
    match folder_id {
        Some(id) => format!("{}/{}", FILES_PATH, id),
        None => FILES_PATH.to_string(),
    }
}

fn no_store(listing: ListingResponse) -> Response {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(ApiResponse::new(listing)),
    )
        .into_response()
}

/// GET / - Send the browser to the file tree.
pub async fn root_redirect() -> Redirect {
    Redirect::to(FILES_PATH)
}

/// GET /files - Root level of the caller's tree.
pub async fn list_root(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Response, ApiError> {
    let listing = state.file_service().list_children(auth.user_id(), None).await?;
    Ok(no_store(listing.into()))
}

/// GET /files/:folder - One of the caller's folders.
pub async fn list_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(folder): Path<String>,
) -> Result<Response, ApiError> {
    let folder_id = parse_id(&folder)?;
    let listing = state
        .file_service()
        .list_children(auth.user_id(), Some(folder_id))
        .await?;
    Ok(no_store(listing.into()))
}

/// GET /files/by-name/:name - Jump to the caller's folder with that name.
pub async fn folder_by_name(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> Result<Redirect, ApiError> {
    let folder = state
        .file_service()
        .resolve_by_name(auth.user_id(), &name)
        .await?;
    Ok(Redirect::to(&folder_location(Some(folder.id))))
}

/// POST /files/new/folder - Create a folder at the root level.
pub async fn create_root_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedForm(form): ValidatedForm<FolderForm>,
) -> Result<Redirect, ApiError> {
    state
        .file_service()
        .create_folder(auth.user_id(), &form.name, None)
        .await?;
    Ok(Redirect::to(FILES_PATH))
}

/// POST /files/:folder/new/folder - Create a folder inside another.
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(folder): Path<String>,
    ValidatedForm(form): ValidatedForm<FolderForm>,
) -> Result<Redirect, ApiError> {
    let parent_id = parse_id(&folder)?;
    state
        .file_service()
        .create_folder(auth.user_id(), &form.name, Some(parent_id))
        .await?;
    Ok(Redirect::to(&folder_location(Some(parent_id))))
}

/// POST /files/delete/folder/:folder - Delete a folder and everything below it.
///
/// A folder that is already gone is not an error here.
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(folder): Path<String>,
) -> Result<Redirect, ApiError> {
    let folder_id = parse_id(&folder)?;

    match state
        .file_service()
        .delete_folder(auth.user_id(), folder_id)
        .await
    {
        Ok(deletion) => Ok(Redirect::to(&folder_location(deletion.parent_id))),
        Err(FileboxError::NotFound(_)) => Ok(Redirect::to(FILES_PATH)),
        Err(e) => Err(e.into()),
    }
}

/// POST /files/delete/file/:file - Delete a single file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(file): Path<String>,
) -> Result<Redirect, ApiError> {
    let file_id = parse_id(&file)?;

    match state.file_service().delete_file(auth.user_id(), file_id).await {
        Ok(deletion) => Ok(Redirect::to(&folder_location(deletion.folder_id))),
        Err(FileboxError::NotFound(_)) => Ok(Redirect::to(FILES_PATH)),
        Err(e) => Err(e.into()),
    }
}

fn multipart_error(state: &AppState, err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return FileboxError::TooLarge {
            max_bytes: state.max_upload_size,
        }
        .into();
    }
    tracing::debug!(error = %err, "Rejected multipart body");
    ApiError::bad_request("Invalid multipart data")
}

/// Pull the `file` field out of a multipart body.
async fn read_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UploadRequest, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(state, e))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let mime_type = field.content_type().map(str::to_string);
        let content = field
            .bytes()
            .await
            .map_err(|e| multipart_error(state, e))?
            .to_vec();

        let request = UploadRequest::new(name, content);
        return Ok(match mime_type {
            Some(mime_type) => request.with_mime_type(mime_type),
            None => request,
        });
    }

    Err(ApiError::bad_request("No file provided"))
}

/// POST /files/upload/file - Upload to the root level.
pub async fn upload_root(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let request = read_upload(&state, multipart).await?;
    state.file_service().upload(auth.user_id(), &request).await?;
    Ok(Redirect::to(FILES_PATH))
}

/// POST /files/:folder/upload/file - Upload into a folder.
pub async fn upload_to_folder(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(folder): Path<String>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let folder_id = parse_id(&folder)?;
    let request = read_upload(&state, multipart)
        .await?
        .in_folder(Some(folder_id));
    state.file_service().upload(auth.user_id(), &request).await?;
    Ok(Redirect::to(&folder_location(Some(folder_id))))
}

/// GET|POST /files/download/:file - Stream a file as an attachment.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let file_id = parse_id(&file)?;
    let download = state.file_service().download(auth.user_id(), file_id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.file.mime_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&download.file.name),
        )
        .header(header::CONTENT_LENGTH, download.content.len())
        .body(Body::from(download.content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// GET /files/details/file/:file - File detail view.
pub async fn file_details(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(file): Path<String>,
) -> Result<Json<ApiResponse<FileDetailsResponse>>, ApiError> {
    let file_id = parse_id(&file)?;
    let file = state.file_service().get_file(auth.user_id(), file_id).await?;
    Ok(Json(ApiResponse::new(file.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::error::ErrorCode;

    #[test]
    fn test_content_disposition_header_simple_ascii() {
        let result = content_disposition_header("document.txt");
        assert_eq!(result, "attachment; filename=\"document.txt\"");
    }

    #[test]
    fn test_content_disposition_header_with_spaces() {
        let result = content_disposition_header("my document.txt");
        assert_eq!(result, "attachment; filename=\"my document.txt\"");
    }

    #[test]
    fn test_content_disposition_header_unicode() {
        let result = content_disposition_header("résumé.pdf");
        assert!(result.starts_with("attachment; filename=\"résumé.pdf\""));
        assert!(result.contains("filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"));
    }

    #[test]
    fn test_content_disposition_header_double_quote() {
        let result = content_disposition_header("test\"file.txt");
        assert!(result.contains("filename=\"test_file.txt\""));
        assert!(result.contains("%22"));
    }

    #[test]
    fn test_content_disposition_header_control_characters() {
        let result = content_disposition_header("test\r\nX-Injected: bad.txt");
        assert!(!result.contains('\r'));
        assert!(!result.contains('\n'));
        assert!(result.starts_with("attachment; filename="));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("abc").unwrap_err().code(), ErrorCode::NotFound);
        assert_eq!(parse_id("").unwrap_err().code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_folder_location() {
        assert_eq!(folder_location(None), "/files");
        assert_eq!(folder_location(Some(7)), "/files/7");
    }
}
