//! Authentication handlers and shared application state.

use axum::{extract::State, response::Redirect, Form, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::auth::{
    register, Authenticator, Credentials, PasswordAuthenticator, RegistrationError,
    RegistrationRequest, ValidationError,
};
use crate::db::{Database, UserRepository};
use crate::file::{FileService, FileStorage, DEFAULT_MAX_FILE_SIZE};
use crate::web::dto::{ApiResponse, AuthEntryResponse, LoginForm, SignupForm, ValidatedForm};
use crate::web::error::ApiError;
use crate::web::middleware::{JwtState, OptionalAuthUser, LOGIN_PATH, SESSION_COOKIE};
use crate::FileboxError;

const CREDENTIAL_FIELDS: &[&str] = &["username", "password"];

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database pool.
    pub db: Database,
    /// Object storage.
    pub storage: FileStorage,
    /// Credential check used by the login route.
    pub authenticator: Arc<dyn Authenticator>,
    /// Session token keys.
    pub jwt: Arc<JwtState>,
    /// Upload ceiling in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new application state with password authentication.
    pub fn new(
        db: Database,
        storage: FileStorage,
        jwt_secret: &str,
        session_expiry_secs: u64,
    ) -> Self {
        Self {
            authenticator: Arc::new(PasswordAuthenticator::new(db.clone())),
            db,
            storage,
            jwt: Arc::new(JwtState::new(jwt_secret, session_expiry_secs)),
            max_upload_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Replace the credential check.
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Set the upload ceiling in bytes.
    pub fn with_max_upload_size(mut self, max_upload_size: u64) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }

    /// File service bound to this state.
    pub fn file_service(&self) -> FileService<'_> {
        FileService::new(&self.db, &self.storage).with_max_file_size(self.max_upload_size)
    }
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// GET /login - Describe the login form.
pub async fn login_page(
    OptionalAuthUser(claims): OptionalAuthUser,
) -> Json<ApiResponse<AuthEntryResponse>> {
    Json(ApiResponse::new(AuthEntryResponse {
        action: LOGIN_PATH,
        method: "POST",
        fields: CREDENTIAL_FIELDS,
        user: claims.map(Into::into),
    }))
}

/// GET /sign-up - Describe the signup form.
pub async fn signup_page(
    OptionalAuthUser(claims): OptionalAuthUser,
) -> Json<ApiResponse<AuthEntryResponse>> {
    Json(ApiResponse::new(AuthEntryResponse {
        action: "/sign-up",
        method: "POST",
        fields: CREDENTIAL_FIELDS,
        user: claims.map(Into::into),
    }))
}

/// POST /login - Check credentials and start a session.
///
/// Bad credentials send the client back to the login page.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let credentials = Credentials::new(form.username, form.password);

    let user = match state.authenticator.authenticate(&credentials).await {
        Ok(user) => user,
        Err(FileboxError::Auth(_)) => return Ok((jar, Redirect::to(LOGIN_PATH))),
        Err(e) => return Err(e.into()),
    };

    let token = state.jwt.issue(user.id, &user.username)?;
    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    Ok((jar.add(session_cookie(token)), Redirect::to("/")))
}

/// POST /sign-up - Create an account.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ValidatedForm(form): ValidatedForm<SignupForm>,
) -> Result<Redirect, ApiError> {
    let repo = UserRepository::new(state.db.pool());

    register(&repo, RegistrationRequest::new(form.username, form.password))
        .await
        .map_err(registration_error)?;

    Ok(Redirect::to("/"))
}

/// POST /logout - End the session.
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/"))
}

fn registration_error(err: RegistrationError) -> ApiError {
    match err {
        RegistrationError::Validation(v) => {
            let field = match v {
                ValidationError::PasswordEmpty
                | ValidationError::PasswordTooShort
                | ValidationError::PasswordTooLong => "password",
                _ => "username",
            };
            ApiError::field(field, v.to_string())
        }
        RegistrationError::UsernameExists => {
            ApiError::field("username", RegistrationError::UsernameExists.to_string())
        }
        RegistrationError::Password(p) => ApiError::field("password", p.to_string()),
        RegistrationError::Database(msg) => FileboxError::Database(msg).into(),
    }
}
