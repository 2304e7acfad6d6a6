//! Database schema and migrations for Filebox.
//!
//! Migrations are applied in order when the database is opened; the
//! schema_version table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL,
    password    TEXT NOT NULL,           -- Argon2 hash
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX idx_users_username_nocase ON users(username COLLATE NOCASE);
"#,
    // v2: folders, one tree per user
    r#"
CREATE TABLE folders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    parent_id   INTEGER REFERENCES folders(id),   -- NULL for root-level folders
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Names are unique per (owner, parent). COALESCE folds root-level folders
-- into one scope, since UNIQUE treats NULLs as distinct.
CREATE UNIQUE INDEX idx_folders_scope_name ON folders(user_id, COALESCE(parent_id, 0), name);
CREATE INDEX idx_folders_parent_id ON folders(parent_id);
"#,
    // v3: files
    r#"
CREATE TABLE files (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,                    -- display name
    user_id      INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    folder_id    INTEGER REFERENCES folders(id),   -- NULL for root-level files
    size         INTEGER NOT NULL,
    mime_type    TEXT NOT NULL,
    storage_key  TEXT NOT NULL UNIQUE,
    path         TEXT NOT NULL,
    uploaded_at  TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at   TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_user_folder ON files(user_id, folder_id);
CREATE INDEX idx_files_folder_id ON files(folder_id);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_first_migration_contains_users_table() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE users"));
        assert!(first.contains("username"));
        assert!(first.contains("password"));
    }

    #[test]
    fn test_folders_migration_scopes_names() {
        let folders = MIGRATIONS[1];
        assert!(folders.contains("CREATE TABLE folders"));
        assert!(folders.contains("parent_id"));
        assert!(folders.contains("user_id, COALESCE(parent_id, 0), name"));
    }

    #[test]
    fn test_files_migration_has_unique_storage_key() {
        let files = MIGRATIONS[2];
        assert!(files.contains("CREATE TABLE files"));
        assert!(files.contains("storage_key  TEXT NOT NULL UNIQUE"));
        assert!(files.contains("mime_type"));
    }
}
