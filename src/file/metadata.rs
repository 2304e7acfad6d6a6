//! File records and repository for Filebox.

use sqlx::{SqliteConnection, SqlitePool};

use crate::{FileboxError, Result};

const FILE_COLUMNS: &str =
    "id, name, user_id, folder_id, size, mime_type, storage_key, path, uploaded_at, updated_at";

/// Metadata for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID.
    pub id: i64,
    /// Display name (not unique).
    pub name: String,
    /// Owning user.
    pub user_id: i64,
    /// Containing folder (None for root-level files).
    pub folder_id: Option<i64>,
    /// Size in bytes.
    pub size: i64,
    /// MIME type recorded at upload.
    pub mime_type: String,
    /// Object storage key (UUID.ext).
    pub storage_key: String,
    /// Location of the stored object.
    pub path: String,
    /// When the file was uploaded.
    pub uploaded_at: String,
    /// When the record was last changed.
    pub updated_at: String,
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Owning user.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// Containing folder (None for root-level files).
    pub folder_id: Option<i64>,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    pub mime_type: String,
    /// Object storage key.
    pub storage_key: String,
    /// Location of the stored object.
    pub path: String,
}

impl NewFile {
    /// Create a new root-level file record.
    pub fn new(
        user_id: i64,
        name: impl Into<String>,
        storage_key: impl Into<String>,
        size: i64,
    ) -> Self {
        Self {
            user_id,
            name: name.into(),
            folder_id: None,
            size,
            mime_type: "application/octet-stream".to_string(),
            storage_key: storage_key.into(),
            path: String::new(),
        }
    }

    /// Set the containing folder.
    pub fn in_folder(mut self, folder_id: Option<i64>) -> Self {
        self.folder_id = folder_id;
        self
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Set the storage path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

/// Repository for file record operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a file record.
    pub async fn create(&self, file: &NewFile) -> Result<FileRecord> {
        let result = sqlx::query(
            "INSERT INTO files (name, user_id, folder_id, size, mime_type, storage_key, path)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&file.name)
        .bind(file.user_id)
        .bind(file.folder_id)
        .bind(file.size)
        .bind(&file.mime_type)
        .bind(&file.storage_key)
        .bind(&file.path)
        .execute(self.pool)
        .await
        .map_err(|e| {
            // The folder was deleted after the caller checked it
            let folder_gone = e
                .as_database_error()
                .is_some_and(|db_err| db_err.is_foreign_key_violation());
            if folder_gone {
                FileboxError::NotFound("folder".to_string())
            } else {
                FileboxError::from_sqlx_unique(e, "storage key")
            }
        })?;

        let id = result.last_insert_rowid();
        self.get_owned(file.user_id, id)
            .await?
            .ok_or_else(|| FileboxError::NotFound("file".to_string()))
    }

    /// Get a file by ID, only if owned by `user_id`.
    pub async fn get_owned(&self, user_id: i64, id: i64) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(file)
    }

    /// List a user's files directly in `folder_id` (root when None).
    pub async fn list_children(
        &self,
        user_id: i64,
        folder_id: Option<i64>,
    ) -> Result<Vec<FileRecord>> {
        let files = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files
             WHERE user_id = ? AND folder_id IS ?
             ORDER BY name, id"
        ))
        .bind(user_id)
        .bind(folder_id)
        .fetch_all(self.pool)
        .await?;

        Ok(files)
    }

    /// Delete a user's file record. False if it was already gone.
    pub async fn delete_owned(&self, user_id: i64, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all files owned by a user.
    pub async fn count_for_user(&self, user_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count.0)
    }

    /// `(id, storage_key)` of a user's files in one folder, on an open connection.
    pub(crate) async fn keys_in_folder_on(
        conn: &mut SqliteConnection,
        user_id: i64,
        folder_id: i64,
    ) -> Result<Vec<(i64, String)>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT id, storage_key FROM files WHERE user_id = ? AND folder_id = ? ORDER BY id",
        )
        .bind(user_id)
        .bind(folder_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }

    /// Delete one file row on an open connection. False if already gone.
    pub(crate) async fn delete_on(
        conn: &mut SqliteConnection,
        user_id: i64,
        id: i64,
    ) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
