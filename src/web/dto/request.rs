//! Request DTOs. All mutations arrive as URL-encoded forms.

use serde::Deserialize;
use validator::Validate;

use super::validation::not_empty_trimmed;

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Username.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// Signup form.
///
/// Charset and minimum-length rules are applied by the signup service.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    /// Username.
    #[serde(default)]
    #[validate(
        length(max = 255, message = "The maximum length for the username is 255 chars"),
        custom(function = "not_empty_trimmed", message = "Please enter a username")
    )]
    pub username: String,
    /// Password.
    #[serde(default)]
    #[validate(
        length(max = 255, message = "The maximum length for the password is 255 chars"),
        custom(function = "not_empty_trimmed", message = "Please enter a password")
    )]
    pub password: String,
}

/// New folder form.
#[derive(Debug, Deserialize, Validate)]
pub struct FolderForm {
    /// Folder name.
    #[serde(default)]
    #[validate(
        length(max = 255, message = "The maximum length for the folder name is 255 chars"),
        custom(function = "not_empty_trimmed", message = "Please enter a name")
    )]
    pub name: String,
}
