//! User signup for Filebox.

use thiserror::Error;
use tracing::info;

use crate::auth::validation::{validate_registration_password, validate_username, ValidationError};
use crate::auth::{hash_password, PasswordError};
use crate::db::{NewUser, User, UserRepository};
use crate::FileboxError;

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Username already exists.
    #[error("Username already exists")]
    UsernameExists,

    /// Password hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

impl From<RegistrationError> for FileboxError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::Validation(v) => v.into(),
            RegistrationError::UsernameExists => FileboxError::DuplicateName("username".into()),
            RegistrationError::Password(p) => FileboxError::Validation(p.to_string()),
            RegistrationError::Database(msg) => FileboxError::Database(msg),
        }
    }
}

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Desired username.
    pub username: String,
    /// Plain-text password (8-255 characters).
    pub password: String,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Register a new user.
///
/// Validates the fields, rejects a taken username, hashes the password and
/// inserts the user. A racing signup for the same name is caught by the
/// unique index and also reported as `UsernameExists`.
///
/// # Examples
///
/// ```ignore
/// use filebox::auth::{register, RegistrationRequest};
/// use filebox::db::{Database, UserRepository};
///
/// let db = Database::open_in_memory().await?;
/// let repo = UserRepository::new(db.pool());
///
/// let user = register(&repo, RegistrationRequest::new("alice", "longenough1")).await?;
/// println!("Registered user: {}", user.username);
/// ```
pub async fn register(
    repo: &UserRepository<'_>,
    request: RegistrationRequest,
) -> std::result::Result<User, RegistrationError> {
    let username = validate_username(&request.username)?;
    let password = validate_registration_password(&request.password)?;

    if repo
        .username_exists(username)
        .await
        .map_err(|e| RegistrationError::Database(e.to_string()))?
    {
        return Err(RegistrationError::UsernameExists);
    }

    let password_hash = hash_password(password)?;

    let user = repo
        .create(&NewUser::new(username, password_hash))
        .await
        .map_err(|e| match e {
            FileboxError::DuplicateName(_) => RegistrationError::UsernameExists,
            other => RegistrationError::Database(other.to_string()),
        })?;

    info!(
        username = %user.username,
        user_id = user.id,
        "New user registered"
    );

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::Database;

    #[tokio::test]
    async fn test_register_success() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let user = register(&repo, RegistrationRequest::new("alice", "longenough1"))
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert!(user.password.starts_with("$argon2id$"));
        assert!(verify_password("longenough1", &user.password).is_ok());
    }

    #[tokio::test]
    async fn test_register_trims_fields() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let user = register(&repo, RegistrationRequest::new("  bob ", " longenough1 "))
            .await
            .unwrap();

        assert_eq!(user.username, "bob");
        assert!(verify_password("longenough1", &user.password).is_ok());
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        register(&repo, RegistrationRequest::new("alice", "longenough1"))
            .await
            .unwrap();
        let result = register(&repo, RegistrationRequest::new("Alice", "longenough2")).await;

        assert!(matches!(result, Err(RegistrationError::UsernameExists)));
    }

    #[tokio::test]
    async fn test_register_validation_errors() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let result = register(&repo, RegistrationRequest::new("bad name", "longenough1")).await;
        assert!(matches!(
            result,
            Err(RegistrationError::Validation(
                ValidationError::UsernameInvalidChars
            ))
        ));

        let result = register(&repo, RegistrationRequest::new("alice", "short")).await;
        assert!(matches!(
            result,
            Err(RegistrationError::Validation(
                ValidationError::PasswordTooShort
            ))
        ));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[test]
    fn test_registration_error_into_filebox_error() {
        let err: FileboxError = RegistrationError::UsernameExists.into();
        assert!(matches!(err, FileboxError::DuplicateName(_)));

        let err: FileboxError =
            RegistrationError::Validation(ValidationError::UsernameEmpty).into();
        assert!(matches!(err, FileboxError::Validation(_)));
    }
}
