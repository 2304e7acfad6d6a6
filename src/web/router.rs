//! Router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::error::not_found_fallback;
use super::handlers::{
    create_folder, create_root_folder, delete_file, delete_folder, download_file, file_details,
    folder_by_name, list_folder, list_root, login, login_page, logout, root_redirect, signup,
    signup_page, upload_root, upload_to_folder, AppState,
};
use super::middleware::jwt_auth;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the application router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/login", get(login_page).post(login))
        .route("/sign-up", get(signup_page).post(signup))
        .route("/logout", post(logout));

    let body_limit = usize::try_from(app_state.max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let upload_routes = Router::new()
        .route("/files/upload/file", post(upload_root))
        .route("/files/:folder/upload/file", post(upload_to_folder))
        .layer(DefaultBodyLimit::max(body_limit));

    let file_routes = Router::new()
        .route("/files", get(list_root))
        .route("/files/:folder", get(list_folder))
        .route("/files/by-name/:name", get(folder_by_name))
        .route("/files/new/folder", post(create_root_folder))
        .route("/files/:folder/new/folder", post(create_folder))
        .route("/files/delete/folder/:folder", post(delete_folder))
        .route("/files/delete/file/:file", post(delete_file))
        .route("/files/download/:file", get(download_file).post(download_file))
        .route("/files/details/file/:file", get(file_details))
        .merge(upload_routes);

    let jwt_state = app_state.jwt.clone();

    Router::new()
        .route("/", get(root_redirect))
        .route("/health", get(health_check))
        .merge(auth_routes)
        .merge(file_routes)
        .fallback(not_found_fallback)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
