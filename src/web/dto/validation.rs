//! Validation utilities for request DTOs.

use axum::{
    async_trait,
    extract::{rejection::FormRejection, FromRequest, Request},
    Form,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A form extractor that validates the request body.
///
/// Deserializes a URL-encoded body and runs its `validator` rules. Failures
/// answer 422 with field-level details.
///
/// # Example
///
/// ```ignore
/// use filebox::web::dto::{FolderForm, ValidatedForm};
///
/// async fn create_folder(
///     ValidatedForm(form): ValidatedForm<FolderForm>,
/// ) -> Result<Redirect, ApiError> {
///     // form is already validated
///     // ...
/// }
/// ```
pub struct ValidatedForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Form<T>: FromRequest<S, Rejection = FormRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedForm(value))
    }
}

/// Validate that a string is not empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_empty_trimmed")
            .with_message("Must not be empty".into()));
    }
    Ok(())
}
