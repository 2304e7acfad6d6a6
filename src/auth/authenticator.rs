//! Credential verification.
//!
//! Handlers only see the [`Authenticator`] trait, so the password check can be
//! swapped for another provider without touching the web layer.

use async_trait::async_trait;
use tracing::debug;

use crate::auth::verify_password;
use crate::db::{Database, User, UserRepository};
use crate::{FileboxError, Result};

/// Message returned for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Incorrect username or password";

/// Login credentials as submitted by the client.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username (matched case-insensitively).
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

impl Credentials {
    /// Create a new set of credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Resolves credentials to a user.
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Verify the credentials and return the matching user.
    ///
    /// Fails with [`FileboxError::Auth`] for an unknown user and for a wrong
    /// password alike.
    async fn authenticate(&self, credentials: &Credentials) -> Result<User>;

    /// Look up a user by id, for resolving an existing session.
    async fn user_by_id(&self, id: i64) -> Result<Option<User>>;
}

/// Username/password authenticator backed by the users table.
#[derive(Debug, Clone)]
pub struct PasswordAuthenticator {
    db: Database,
}

impl PasswordAuthenticator {
    /// Create an authenticator over the given database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Authenticator for PasswordAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<User> {
        let username = credentials.username.trim();
        let password = credentials.password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(FileboxError::Auth(INVALID_CREDENTIALS.to_string()));
        }

        let repo = UserRepository::new(self.db.pool());
        let Some(user) = repo.get_by_username(username).await? else {
            debug!(username = %username, "Login rejected: unknown user");
            return Err(FileboxError::Auth(INVALID_CREDENTIALS.to_string()));
        };

        // Argon2 is CPU-bound; keep it off the async workers.
        let hash = user.password.clone();
        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password verification task failed");
                FileboxError::Auth(INVALID_CREDENTIALS.to_string())
            })?;

        if verified.is_err() {
            debug!(username = %username, "Login rejected: wrong password");
            return Err(FileboxError::Auth(INVALID_CREDENTIALS.to_string()));
        }

        Ok(user)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>> {
        UserRepository::new(self.db.pool()).get_by_id(id).await
    }
}
