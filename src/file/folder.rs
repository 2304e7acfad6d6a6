//! Folder types and repository for Filebox.
//!
//! Every query is scoped by the owning user's id. A folder id that belongs
//! to someone else behaves exactly like an id that does not exist.

use sqlx::{SqliteConnection, SqlitePool};

use crate::{FileboxError, Result};

const FOLDER_COLUMNS: &str = "id, name, user_id, parent_id, created_at";

/// A folder in a user's tree.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID.
    pub id: i64,
    /// Folder name, unique among its siblings.
    pub name: String,
    /// Owning user.
    pub user_id: i64,
    /// Parent folder ID (None for root-level folders).
    pub parent_id: Option<i64>,
    /// When the folder was created.
    pub created_at: String,
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Owning user.
    pub user_id: i64,
    /// Folder name.
    pub name: String,
    /// Parent folder ID (None for root-level folders).
    pub parent_id: Option<i64>,
}

impl NewFolder {
    /// Create a root-level folder for the given user.
    pub fn new(user_id: i64, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            parent_id: None,
        }
    }

    /// Set the parent folder.
    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set or clear the parent folder.
    pub fn in_parent(mut self, parent_id: Option<i64>) -> Self {
        self.parent_id = parent_id;
        self
    }
}

/// Repository for folder operations.
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new folder.
    ///
    /// A sibling with the same name yields `DuplicateName`. The caller is
    /// responsible for checking that the parent belongs to the same user.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        let result =
            sqlx::query("INSERT INTO folders (name, user_id, parent_id) VALUES (?, ?, ?)")
                .bind(&folder.name)
                .bind(folder.user_id)
                .bind(folder.parent_id)
                .execute(self.pool)
                .await
                .map_err(|e| {
                    // The parent was deleted after the caller checked it
                    let parent_gone = e
                        .as_database_error()
                        .is_some_and(|db_err| db_err.is_foreign_key_violation());
                    if parent_gone {
                        FileboxError::NotFound("folder".to_string())
                    } else {
                        FileboxError::from_sqlx_unique(e, "folder")
                    }
                })?;

        let id = result.last_insert_rowid();
        self.get_owned(folder.user_id, id)
            .await?
            .ok_or_else(|| FileboxError::NotFound("folder".to_string()))
    }

    /// Get a folder by ID, only if owned by `user_id`.
    pub async fn get_owned(&self, user_id: i64, id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(folder)
    }

    /// List a user's folders directly under `parent_id` (root when None).
    pub async fn list_children(&self, user_id: i64, parent_id: Option<i64>) -> Result<Vec<Folder>> {
        // `IS` compares NULL as equal, so one statement covers root and nested.
        let folders = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders
             WHERE user_id = ? AND parent_id IS ?
             ORDER BY name, id"
        ))
        .bind(user_id)
        .bind(parent_id)
        .fetch_all(self.pool)
        .await?;

        Ok(folders)
    }

    /// Find a user's folder by name anywhere in their tree.
    ///
    /// Names repeat across scopes, so the lowest id wins.
    pub async fn find_by_name(&self, user_id: i64, name: &str) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders
             WHERE user_id = ? AND name = ?
             ORDER BY id LIMIT 1"
        ))
        .bind(user_id)
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(folder)
    }

    /// Check whether the scope `(user_id, parent_id)` already holds `name`.
    pub async fn name_exists(
        &self,
        user_id: i64,
        parent_id: Option<i64>,
        name: &str,
    ) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM folders WHERE user_id = ? AND parent_id IS ? AND name = ?)",
        )
        .bind(user_id)
        .bind(parent_id)
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        Ok(exists.0)
    }

    /// Get the path from the root down to a folder.
    ///
    /// Empty when the folder is missing or belongs to someone else.
    pub async fn get_path(&self, user_id: i64, id: i64) -> Result<Vec<Folder>> {
        let mut path = Vec::new();
        let mut current_id = Some(id);

        while let Some(folder_id) = current_id {
            if let Some(folder) = self.get_owned(user_id, folder_id).await? {
                current_id = folder.parent_id;
                path.push(folder);
            } else {
                break;
            }
        }

        path.reverse();
        Ok(path)
    }

    /// Count all folders owned by a user.
    pub async fn count_for_user(&self, user_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM folders WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count.0)
    }

    /// Touch a user's folder row on an open connection, taking the write lock.
    ///
    /// Returns false when the folder is missing or owned by someone else.
    pub(crate) async fn claim_on(
        conn: &mut SqliteConnection,
        user_id: i64,
        id: i64,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE folders SET name = name WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Owner-scoped lookup on an open connection (used inside transactions).
    pub(crate) async fn get_owned_on(
        conn: &mut SqliteConnection,
        user_id: i64,
        id: i64,
    ) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(folder)
    }

    /// Ids of a user's folders directly under `parent_id`, on an open connection.
    pub(crate) async fn child_ids_on(
        conn: &mut SqliteConnection,
        user_id: i64,
        parent_id: i64,
    ) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM folders WHERE user_id = ? AND parent_id = ? ORDER BY id")
                .bind(user_id)
                .bind(parent_id)
                .fetch_all(&mut *conn)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Delete one folder row on an open connection. False if already gone.
    pub(crate) async fn delete_on(
        conn: &mut SqliteConnection,
        user_id: i64,
        id: i64,
    ) -> Result<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
