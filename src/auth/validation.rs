//! Input validation for Filebox.
//!
//! Usernames and passwords for signup, folder names for the tree, and
//! display names for uploaded files.

use thiserror::Error;

/// Maximum length of any text field (username, password, folder name).
pub const MAX_TEXT_LENGTH: usize = 255;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = MAX_TEXT_LENGTH;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = MAX_TEXT_LENGTH;

/// Maximum folder name length.
pub const MAX_FOLDER_NAME_LENGTH: usize = MAX_TEXT_LENGTH;

/// Maximum display name length for uploaded files.
pub const MAX_FILE_NAME_LENGTH: usize = MAX_TEXT_LENGTH;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Username is empty.
    #[error("Please enter a username")]
    UsernameEmpty,

    /// Username is too long.
    #[error("username must be at most {MAX_USERNAME_LENGTH} characters")]
    UsernameTooLong,

    /// Username contains invalid characters.
    #[error("Username contains invalid characters")]
    UsernameInvalidChars,

    /// Password is empty.
    #[error("Please enter a password")]
    PasswordEmpty,

    /// Password is too short.
    #[error("Password should be at least {MIN_PASSWORD_LENGTH} chars long")]
    PasswordTooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    PasswordTooLong,

    /// Folder name is empty.
    #[error("Please enter a name")]
    FolderNameEmpty,

    /// Folder name is too long.
    #[error("The maximum length for the folder name is {MAX_FOLDER_NAME_LENGTH} chars")]
    FolderNameTooLong,

    /// Folder name contains invalid characters.
    #[error("Name contains invalid characters")]
    FolderNameInvalidChars,

    /// File name is empty after sanitizing.
    #[error("file name cannot be empty")]
    FileNameEmpty,

    /// File name is too long.
    #[error("file name must be at most {MAX_FILE_NAME_LENGTH} characters")]
    FileNameTooLong,
}

impl From<ValidationError> for crate::FileboxError {
    fn from(e: ValidationError) -> Self {
        crate::FileboxError::Validation(e.to_string())
    }
}

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ',' | '!')
}

fn is_folder_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-')
}

/// Validate a username and return it trimmed.
///
/// Allowed characters: ASCII letters, digits and `. _ - , !`.
///
/// # Examples
///
/// ```
/// use filebox::auth::validation::validate_username;
///
/// assert_eq!(validate_username("  alice ").unwrap(), "alice");
/// assert!(validate_username("").is_err());
/// assert!(validate_username("al ice").is_err());
/// ```
pub fn validate_username(username: &str) -> Result<&str, ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::UsernameEmpty);
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong);
    }
    if !username.chars().all(is_username_char) {
        return Err(ValidationError::UsernameInvalidChars);
    }
    Ok(username)
}

/// Validate a signup password and return it trimmed.
pub fn validate_registration_password(password: &str) -> Result<&str, ValidationError> {
    let password = password.trim();
    if password.is_empty() {
        return Err(ValidationError::PasswordEmpty);
    }
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooLong);
    }
    Ok(password)
}

/// Validate a folder name and return it trimmed.
///
/// Allowed characters: ASCII letters, digits, `_` and `-`.
///
/// # Examples
///
/// ```
/// use filebox::auth::validation::validate_folder_name;
///
/// assert_eq!(validate_folder_name(" Photos ").unwrap(), "Photos");
/// assert!(validate_folder_name("my photos").is_err());
/// assert!(validate_folder_name("../etc").is_err());
/// ```
pub fn validate_folder_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::FolderNameEmpty);
    }
    if name.chars().count() > MAX_FOLDER_NAME_LENGTH {
        return Err(ValidationError::FolderNameTooLong);
    }
    if !name.chars().all(is_folder_name_char) {
        return Err(ValidationError::FolderNameInvalidChars);
    }
    Ok(name)
}

/// Sanitize an uploaded file's display name.
///
/// Any directory part sent by the client is dropped, control characters are
/// removed, and the result must be non-empty and within length limits.
pub fn sanitize_file_name(name: &str) -> Result<String, ValidationError> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return Err(ValidationError::FileNameEmpty);
    }
    if cleaned.chars().count() > MAX_FILE_NAME_LENGTH {
        return Err(ValidationError::FileNameTooLong);
    }
    Ok(cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert_eq!(validate_username("alice").unwrap(), "alice");
        assert_eq!(validate_username("a.b_c-d,e!").unwrap(), "a.b_c-d,e!");
        assert_eq!(validate_username("  bob  ").unwrap(), "bob");
    }

    #[test]
    fn test_validate_username_invalid() {
        assert_eq!(validate_username("   "), Err(ValidationError::UsernameEmpty));
        assert_eq!(
            validate_username("al ice"),
            Err(ValidationError::UsernameInvalidChars)
        );
        assert_eq!(
            validate_username("ユーザー"),
            Err(ValidationError::UsernameInvalidChars)
        );
        assert_eq!(
            validate_username(&"a".repeat(256)),
            Err(ValidationError::UsernameTooLong)
        );
    }

    #[test]
    fn test_validate_registration_password() {
        assert_eq!(
            validate_registration_password("longenough1").unwrap(),
            "longenough1"
        );
        assert_eq!(
            validate_registration_password(""),
            Err(ValidationError::PasswordEmpty)
        );
        assert_eq!(
            validate_registration_password("  short  "),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_registration_password(&"a".repeat(256)),
            Err(ValidationError::PasswordTooLong)
        );
    }

    #[test]
    fn test_validate_folder_name() {
        assert_eq!(validate_folder_name("Photos").unwrap(), "Photos");
        assert_eq!(validate_folder_name("2024_trip-a").unwrap(), "2024_trip-a");
        assert_eq!(
            validate_folder_name(""),
            Err(ValidationError::FolderNameEmpty)
        );
        assert_eq!(
            validate_folder_name("a/b"),
            Err(ValidationError::FolderNameInvalidChars)
        );
        assert_eq!(
            validate_folder_name("a.b"),
            Err(ValidationError::FolderNameInvalidChars)
        );
        assert_eq!(
            validate_folder_name(&"a".repeat(256)),
            Err(ValidationError::FolderNameTooLong)
        );
        assert!(validate_folder_name(&"a".repeat(255)).is_ok());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("photo.jpg").unwrap(), "photo.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_file_name("C:\\temp\\a.txt").unwrap(), "a.txt");
        assert_eq!(sanitize_file_name("a\r\nb.txt").unwrap(), "ab.txt");
        assert_eq!(sanitize_file_name("dir/"), Err(ValidationError::FileNameEmpty));
        assert_eq!(sanitize_file_name(".."), Err(ValidationError::FileNameEmpty));
        assert_eq!(
            sanitize_file_name(&"a".repeat(256)),
            Err(ValidationError::FileNameTooLong)
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::PasswordTooShort.to_string(),
            "Password should be at least 8 chars long"
        );
        assert_eq!(
            ValidationError::FolderNameInvalidChars.to_string(),
            "Name contains invalid characters"
        );
    }
}
