//! Error types for Filebox.

use thiserror::Error;

/// Common error type for Filebox.
#[derive(Error, Debug)]
pub enum FileboxError {
    /// Database error.
    ///
    /// Wraps errors from the sqlx backend. Unique-constraint violations are
    /// mapped to [`FileboxError::DuplicateName`] by the repositories instead.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad credentials.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Upload larger than the configured ceiling.
    #[error("file too large (max {max_bytes} bytes)")]
    TooLarge {
        /// The configured ceiling in bytes.
        max_bytes: u64,
    },

    /// Resource missing, or owned by someone else.
    #[error("{0} not found")]
    NotFound(String),

    /// Name already used in the same scope.
    #[error("{0} already exists")]
    DuplicateName(String),

    /// Physical object read/write/delete failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FileboxError {
    /// Map a sqlx error, turning unique violations into `DuplicateName`.
    pub(crate) fn from_sqlx_unique(e: sqlx::Error, what: &str) -> Self {
        match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                FileboxError::DuplicateName(what.to_string())
            }
            _ => FileboxError::Database(e.to_string()),
        }
    }
}

// Conversion from sqlx errors
impl From<sqlx::Error> for FileboxError {
    fn from(e: sqlx::Error) -> Self {
        FileboxError::Database(e.to_string())
    }
}

/// Result type alias for Filebox operations.
pub type Result<T> = std::result::Result<T, FileboxError>;
