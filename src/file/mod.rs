//! File management module for Filebox.
//!
//! This module provides the per-user file tree:
//! - Nested folders, names unique per (owner, parent)
//! - File records and their stored objects
//! - Recursive folder deletion
//! - Object storage with UUID keys

mod folder;
mod metadata;
mod service;
mod storage;

pub use folder::{Folder, FolderRepository, NewFolder};
pub use metadata::{FileRecord, FileRepository, NewFile};
pub use service::{
    DownloadResult, FileDeletion, FileService, FolderDeletion, Listing, UploadRequest,
};
pub use storage::FileStorage;

/// Default maximum upload size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
