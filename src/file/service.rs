//! File service for Filebox.
//!
//! High-level tree operations. Every method takes the acting user's id, and
//! a row owned by someone else is reported as `NotFound`, the same as a row
//! that does not exist.

use futures::future::BoxFuture;
use sqlx::SqliteConnection;
use tracing::{info, warn};

use crate::auth::validation::{sanitize_file_name, validate_folder_name};
use crate::db::Database;
use crate::{FileboxError, Result};

use super::folder::{Folder, FolderRepository, NewFolder};
use super::metadata::{FileRecord, FileRepository, NewFile};
use super::storage::FileStorage;
use super::DEFAULT_MAX_FILE_SIZE;

const OCTET_STREAM: &str = "application/octet-stream";

/// Request data for a file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Display name as sent by the client.
    pub name: String,
    /// MIME type declared by the client, if any.
    pub mime_type: Option<String>,
    /// File content.
    pub content: Vec<u8>,
    /// Target folder (None for the root level).
    pub folder_id: Option<i64>,
}

impl UploadRequest {
    /// Create a new root-level upload request.
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            content,
            folder_id: None,
        }
    }

    /// Set the target folder.
    pub fn in_folder(mut self, folder_id: Option<i64>) -> Self {
        self.folder_id = folder_id;
        self
    }

    /// Set the declared MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Contents of one level of a user's tree.
#[derive(Debug, Clone)]
pub struct Listing {
    /// The folder being listed (None for the root level).
    pub folder: Option<Folder>,
    /// Breadcrumb from the root down to `folder` (empty at the root level).
    pub path: Vec<Folder>,
    /// Child folders, ordered by name.
    pub folders: Vec<Folder>,
    /// Files in this level, ordered by name.
    pub files: Vec<FileRecord>,
}

/// Outcome of a recursive folder delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderDeletion {
    /// Parent of the deleted folder (None if it was at the root level).
    pub parent_id: Option<i64>,
    /// Folder rows removed, the target included.
    pub folders_deleted: usize,
    /// File rows removed.
    pub files_deleted: usize,
    /// Stored objects removed (missing objects count as removed).
    pub objects_removed: usize,
}

/// Outcome of a single file delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDeletion {
    /// Folder the file was in (None for the root level).
    pub folder_id: Option<i64>,
    /// Whether the stored object is gone.
    pub object_removed: bool,
}

/// Result of a file download.
#[derive(Debug)]
pub struct DownloadResult {
    /// File metadata.
    pub file: FileRecord,
    /// File content.
    pub content: Vec<u8>,
}

/// Rows removed during a subtree walk.
#[derive(Debug, Default)]
struct DeleteTally {
    folders: usize,
    files: usize,
    storage_keys: Vec<String>,
}

/// File service for managing a user's folders and files.
pub struct FileService<'a> {
    db: &'a Database,
    storage: &'a FileStorage,
    max_file_size: u64,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(db: &'a Database, storage: &'a FileStorage) -> Self {
        Self {
            db,
            storage,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Create a new FileService with a custom max file size.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Get one of the user's folders.
    pub async fn get_folder(&self, user_id: i64, folder_id: i64) -> Result<Folder> {
        FolderRepository::new(self.db.pool())
            .get_owned(user_id, folder_id)
            .await?
            .ok_or_else(|| FileboxError::NotFound("folder".to_string()))
    }

    /// List one level of the user's tree (the root level when `folder_id` is None).
    pub async fn list_children(&self, user_id: i64, folder_id: Option<i64>) -> Result<Listing> {
        let folders = FolderRepository::new(self.db.pool());
        let files = FileRepository::new(self.db.pool());

        let (folder, path) = match folder_id {
            Some(id) => {
                let folder = self.get_folder(user_id, id).await?;
                let path = folders.get_path(user_id, id).await?;
                (Some(folder), path)
            }
            None => (None, Vec::new()),
        };

        Ok(Listing {
            folder,
            path,
            folders: folders.list_children(user_id, folder_id).await?,
            files: files.list_children(user_id, folder_id).await?,
        })
    }

    /// Breadcrumb from the root down to one of the user's folders.
    pub async fn folder_path(&self, user_id: i64, folder_id: i64) -> Result<Vec<Folder>> {
        let path = FolderRepository::new(self.db.pool())
            .get_path(user_id, folder_id)
            .await?;
        if path.is_empty() {
            return Err(FileboxError::NotFound("folder".to_string()));
        }
        Ok(path)
    }

    /// Find one of the user's folders by name. The lowest id wins.
    pub async fn resolve_by_name(&self, user_id: i64, name: &str) -> Result<Folder> {
        FolderRepository::new(self.db.pool())
            .find_by_name(user_id, name.trim())
            .await?
            .ok_or_else(|| FileboxError::NotFound("folder".to_string()))
    }

    /// Create a folder at the root level or under one of the user's folders.
    pub async fn create_folder(
        &self,
        user_id: i64,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<Folder> {
        let name = validate_folder_name(name)?;
        let repo = FolderRepository::new(self.db.pool());

        if let Some(parent_id) = parent_id {
            self.get_folder(user_id, parent_id).await?;
        }

        if repo.name_exists(user_id, parent_id, name).await? {
            return Err(FileboxError::DuplicateName("folder".to_string()));
        }

        // A concurrent create can still slip past the check; the unique
        // index reports it as DuplicateName.
        let folder = repo
            .create(&NewFolder::new(user_id, name).in_parent(parent_id))
            .await?;

        info!(
            user_id,
            folder_id = folder.id,
            parent_id = ?folder.parent_id,
            name = %folder.name,
            "Folder created"
        );

        Ok(folder)
    }

    /// Delete a folder with everything below it.
    ///
    /// Rows are removed in one transaction, children before parents. Stored
    /// objects are removed after commit; a failure there is logged and
    /// leaves the object behind.
    pub async fn delete_folder(&self, user_id: i64, folder_id: i64) -> Result<FolderDeletion> {
        let mut tx = self.db.pool().begin().await?;

        // Writing first takes the database write lock up front, so a
        // concurrent delete waits for this one instead of failing.
        if !FolderRepository::claim_on(&mut tx, user_id, folder_id).await? {
            return Err(FileboxError::NotFound("folder".to_string()));
        }
        let target = FolderRepository::get_owned_on(&mut tx, user_id, folder_id)
            .await?
            .ok_or_else(|| FileboxError::NotFound("folder".to_string()))?;

        let mut tally = DeleteTally::default();
        delete_subtree(&mut tx, user_id, target.id, &mut tally).await?;
        tx.commit().await?;

        let objects_removed = self.remove_objects(&tally.storage_keys).await;

        info!(
            user_id,
            folder_id,
            folders = tally.folders,
            files = tally.files,
            objects = objects_removed,
            "Folder deleted"
        );

        Ok(FolderDeletion {
            parent_id: target.parent_id,
            folders_deleted: tally.folders,
            files_deleted: tally.files,
            objects_removed,
        })
    }

    /// Register an upload: stage the bytes, then record them.
    pub async fn upload(&self, user_id: i64, request: &UploadRequest) -> Result<FileRecord> {
        let size = request.content.len() as u64;
        if size > self.max_file_size {
            return Err(FileboxError::TooLarge {
                max_bytes: self.max_file_size,
            });
        }

        let name = sanitize_file_name(&request.name)?;

        if let Some(folder_id) = request.folder_id {
            self.get_folder(user_id, folder_id).await?;
        }

        let mime_type = request
            .mime_type
            .as_deref()
            .map(str::trim)
            // Clients fall back to octet-stream; let the extension decide instead
            .filter(|m| !m.is_empty() && *m != OCTET_STREAM)
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });

        let storage_key = self.storage.save(&request.content, &name).await?;
        let path = self.storage.get_file_path(&storage_key);

        let new_file = NewFile::new(user_id, &name, &storage_key, size as i64)
            .in_folder(request.folder_id)
            .with_mime_type(mime_type)
            .with_path(path.to_string_lossy());

        let file = match FileRepository::new(self.db.pool()).create(&new_file).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&storage_key).await {
                    warn!(
                        storage_key = %storage_key,
                        error = %cleanup,
                        "Failed to remove staged object"
                    );
                }
                return Err(e);
            }
        };

        info!(
            user_id,
            file_id = file.id,
            folder_id = ?file.folder_id,
            size = file.size,
            "File uploaded"
        );

        Ok(file)
    }

    /// Get one of the user's files (metadata only).
    pub async fn get_file(&self, user_id: i64, file_id: i64) -> Result<FileRecord> {
        FileRepository::new(self.db.pool())
            .get_owned(user_id, file_id)
            .await?
            .ok_or_else(|| FileboxError::NotFound("file".to_string()))
    }

    /// Download one of the user's files.
    pub async fn download(&self, user_id: i64, file_id: i64) -> Result<DownloadResult> {
        let file = self.get_file(user_id, file_id).await?;
        let content = self.storage.load(&file.storage_key).await?;

        Ok(DownloadResult { file, content })
    }

    /// Delete one of the user's files, then its stored object.
    pub async fn delete_file(&self, user_id: i64, file_id: i64) -> Result<FileDeletion> {
        let repo = FileRepository::new(self.db.pool());
        let file = self.get_file(user_id, file_id).await?;

        if !repo.delete_owned(user_id, file_id).await? {
            // Removed by a concurrent request
            return Err(FileboxError::NotFound("file".to_string()));
        }

        let object_removed = self.remove_objects(&[file.storage_key]).await == 1;

        info!(user_id, file_id, "File deleted");

        Ok(FileDeletion {
            folder_id: file.folder_id,
            object_removed,
        })
    }

    /// Remove stored objects, logging failures. Returns how many are gone.
    async fn remove_objects(&self, keys: &[String]) -> usize {
        let mut removed = 0;
        for key in keys {
            match self.storage.delete(key).await {
                Ok(_) => removed += 1,
                Err(e) => warn!(storage_key = %key, error = %e, "Failed to remove stored object"),
            }
        }
        removed
    }
}

/// Depth-first removal of a folder's rows: child folders, then files, then
/// the folder itself. Rows already gone are skipped.
fn delete_subtree<'c>(
    conn: &'c mut SqliteConnection,
    user_id: i64,
    folder_id: i64,
    tally: &'c mut DeleteTally,
) -> BoxFuture<'c, Result<()>> {
    Box::pin(async move {
        for child_id in FolderRepository::child_ids_on(conn, user_id, folder_id).await? {
            delete_subtree(&mut *conn, user_id, child_id, &mut *tally).await?;
        }

        for (file_id, storage_key) in
            FileRepository::keys_in_folder_on(conn, user_id, folder_id).await?
        {
            if FileRepository::delete_on(conn, user_id, file_id).await? {
                tally.files += 1;
                tally.storage_keys.push(storage_key);
            }
        }

        if FolderRepository::delete_on(conn, user_id, folder_id).await? {
            tally.folders += 1;
        }

        Ok(())
    })
}
