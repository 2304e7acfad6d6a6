//! Object storage for Filebox.
//!
//! Physical bytes live on disk under a root directory, addressed only by
//! storage key (`UUID.ext`) and sharded by the key's first two characters.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::{FileboxError, Result};

/// Longest extension carried over from the uploaded name.
const MAX_EXTENSION_LENGTH: usize = 16;

/// File storage service for managing physical objects.
///
/// Objects are stored in a sharded directory structure:
/// ```text
/// {base_path}/
/// ├── ab/
/// │   └── ab12cd34-5678-90ab-cdef-123456789012.txt
/// ├── cd/
/// │   └── cd90ab12-3456-7890-abcd-ef1234567890.bin
/// └── ...
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Base directory for object storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)
            .map_err(|e| FileboxError::Storage(format!("cannot create {:?}: {}", base_path, e)))?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Save content under a fresh storage key.
    ///
    /// The key keeps the extension of `original_name` and is returned on
    /// success.
    pub async fn save(&self, content: &[u8], original_name: &str) -> Result<String> {
        let key = Self::generate_key(original_name);
        self.save_with_key(content, &key).await?;
        Ok(key)
    }

    /// Save content under a specific storage key.
    pub async fn save_with_key(&self, content: &[u8], key: &str) -> Result<()> {
        let file_path = self.object_path(key)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create shard for", key, e))?;
        }

        fs::write(&file_path, content)
            .await
            .map_err(|e| storage_error("write", key, e))
    }

    /// Load an object's content.
    ///
    /// A missing object yields `NotFound`.
    pub async fn load(&self, key: &str) -> Result<Vec<u8>> {
        let file_path = self.object_path(key)?;

        match fs::read(&file_path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FileboxError::NotFound("file".to_string()))
            }
            Err(e) => Err(storage_error("read", key, e)),
        }
    }

    /// Delete an object.
    ///
    /// Returns `true` if it was deleted, `false` if it didn't exist.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let file_path = self.object_path(key)?;

        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_error("delete", key, e)),
        }
    }

    /// Check if an object exists.
    pub async fn exists(&self, key: &str) -> bool {
        match self.object_path(key) {
            Ok(path) => fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Get the full path for a storage key.
    ///
    /// The path is `{base_path}/{shard}/{key}` where shard is the first two
    /// characters of the key.
    pub fn get_file_path(&self, key: &str) -> PathBuf {
        self.base_path.join(Self::get_shard(key)).join(key)
    }

    /// Count stored objects across all shards.
    pub async fn count_objects(&self) -> Result<usize> {
        let mut count = 0;
        let mut shards = fs::read_dir(&self.base_path).await?;

        while let Some(shard) = shards.next_entry().await? {
            if !shard.file_type().await?.is_dir() {
                continue;
            }
            let mut entries = fs::read_dir(shard.path()).await?;
            while let Some(entry) = entries.next_entry().await? {
                if entry.file_type().await?.is_file() {
                    count += 1;
                }
            }
        }

        Ok(count)
    }

    /// Generate a new UUID-based storage key with the extension of `original_name`.
    pub fn generate_key(original_name: &str) -> String {
        let uuid = Uuid::new_v4();
        let ext = Self::extract_extension(original_name);
        format!("{uuid}.{ext}")
    }

    /// Resolve a key to its path, refusing keys that could leave the root.
    fn object_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(FileboxError::Storage(format!("invalid storage key: {key:?}")));
        }
        Ok(self.get_file_path(key))
    }

    fn get_shard(key: &str) -> &str {
        key.get(..2).unwrap_or(key)
    }

    /// Extract a safe file extension; "bin" when there is none.
    fn extract_extension(filename: &str) -> &str {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .filter(|ext| {
                !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LENGTH
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .unwrap_or("bin")
    }
}

fn storage_error(action: &str, key: &str, e: io::Error) -> FileboxError {
    FileboxError::Storage(format!("failed to {action} object {key}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_storage() -> (TempDir, FileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_new_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let storage_path = temp_dir.path().join("objects");

        assert!(!storage_path.exists());

        let storage = FileStorage::new(&storage_path).unwrap();

        assert!(storage_path.exists());
        assert_eq!(storage.base_path(), storage_path);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (_temp_dir, storage) = setup_storage();
        let content = b"Hello, World!";

        let key = storage.save(content, "test.txt").await.unwrap();
        assert!(key.ends_with(".txt"));

        let loaded = storage.load(&key).await.unwrap();
        assert_eq!(loaded, content);
    }

    #[tokio::test]
    async fn test_save_creates_shard_directory() {
        let (_temp_dir, storage) = setup_storage();

        let key = storage.save(b"data", "test.txt").await.unwrap();

        let shard_dir = storage.base_path().join(&key[..2]);
        assert!(shard_dir.is_dir());
        assert!(storage.get_file_path(&key).is_file());
    }

    #[tokio::test]
    async fn test_load_not_found() {
        let (_temp_dir, storage) = setup_storage();

        let result = storage.load("nonexistent.txt").await;
        assert!(matches!(result, Err(FileboxError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let (_temp_dir, storage) = setup_storage();

        let key = storage.save(b"to delete", "delete.txt").await.unwrap();
        assert!(storage.exists(&key).await);

        assert!(storage.delete(&key).await.unwrap());
        assert!(!storage.exists(&key).await);

        // Second delete finds nothing
        assert!(!storage.delete(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let (_temp_dir, storage) = setup_storage();

        assert!(matches!(
            storage.load("../secret").await,
            Err(FileboxError::Storage(_))
        ));
        assert!(matches!(
            storage.delete("ab/../../x").await,
            Err(FileboxError::Storage(_))
        ));
        assert!(!storage.exists("").await);
    }

    #[tokio::test]
    async fn test_count_objects() {
        let (_temp_dir, storage) = setup_storage();

        assert_eq!(storage.count_objects().await.unwrap(), 0);
        storage.save(b"a", "a.txt").await.unwrap();
        let key = storage.save(b"b", "b.txt").await.unwrap();
        assert_eq!(storage.count_objects().await.unwrap(), 2);

        storage.delete(&key).await.unwrap();
        assert_eq!(storage.count_objects().await.unwrap(), 1);
    }

    #[test]
    fn test_get_file_path() {
        let (_temp_dir, storage) = setup_storage();

        let key = "ab12cd34-5678-90ab-cdef-123456789012.txt";
        let path = storage.get_file_path(key);

        assert_eq!(path, storage.base_path().join("ab").join(key));
    }

    #[test]
    fn test_get_shard() {
        assert_eq!(FileStorage::get_shard("abcdef.txt"), "ab");
        assert_eq!(FileStorage::get_shard("x"), "x");
        assert_eq!(FileStorage::get_shard(""), "");
    }

    #[test]
    fn test_extract_extension() {
        assert_eq!(FileStorage::extract_extension("test.txt"), "txt");
        assert_eq!(FileStorage::extract_extension("document.PDF"), "PDF");
        assert_eq!(FileStorage::extract_extension("no_ext"), "bin");
        assert_eq!(FileStorage::extract_extension("file.tar.gz"), "gz");
        assert_eq!(FileStorage::extract_extension(".hidden"), "bin");
        assert_eq!(FileStorage::extract_extension("weird.ex t"), "bin");
    }

    #[test]
    fn test_generate_key() {
        let key1 = FileStorage::generate_key("test.txt");
        let key2 = FileStorage::generate_key("test.txt");

        assert_ne!(key1, key2);
        assert!(key1.ends_with(".txt"));
        // UUID (36 chars) + "." + extension
        assert_eq!(key1.len(), 36 + 4);
    }
}
