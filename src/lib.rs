//! Filebox - multi-user file and folder storage
//!
//! Each user owns a private tree of folders and files. Folders nest, file
//! bytes live in an object store on disk, and every lookup is scoped to the
//! signed-in user.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use auth::{
    hash_password, register, validate_password, verify_password, Authenticator, Credentials,
    PasswordAuthenticator, PasswordError, RegistrationError, RegistrationRequest,
    ValidationError,
};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{FileboxError, Result};
pub use file::{
    FileRecord, FileService, FileStorage, Folder, FolderDeletion, Listing, UploadRequest,
};
pub use web::{create_router, AppState, WebServer};
