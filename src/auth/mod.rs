//! Authentication module for Filebox.
//!
//! Password hashing, signup, input validation, and the pluggable
//! credential check used by the login route.

mod authenticator;
mod password;
mod registration;
pub mod validation;

pub use authenticator::{Authenticator, Credentials, PasswordAuthenticator, INVALID_CREDENTIALS};
pub use password::{hash_password, validate_password, verify_password, PasswordError};
pub use registration::{register, RegistrationError, RegistrationRequest};
pub use validation::ValidationError;
