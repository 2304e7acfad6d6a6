//! Test helpers for the HTTP integration tests.
//!
//! Builds the real router over an in-memory database and a temporary object
//! store, plus helpers for signing up and logging in.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use filebox::db::Database;
use filebox::file::FileStorage;
use filebox::web::handlers::AppState;
use filebox::web::middleware::SESSION_COOKIE;
use filebox::web::router::create_router;
use serde_json::Value;
use tempfile::TempDir;

/// Secret used to sign test sessions.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// Password that passes signup validation.
pub const TEST_PASSWORD: &str = "longenough1";

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub storage: FileStorage,
    _storage_dir: TempDir,
}

impl TestApp {
    /// Create a test app with the default upload ceiling.
    pub async fn new() -> Self {
        Self::with_max_upload_size(10 * 1024 * 1024).await
    }

    /// Create a test app with a custom upload ceiling in bytes.
    pub async fn with_max_upload_size(max_upload_size: u64) -> Self {
        let db = Database::open_in_memory()
            .await
            .expect("Failed to create test database");
        let storage_dir = TempDir::new().expect("Failed to create storage dir");
        let storage = FileStorage::new(storage_dir.path()).expect("Failed to create storage");

        let app_state = AppState::new(db.clone(), storage.clone(), TEST_SECRET, 3600)
            .with_max_upload_size(max_upload_size);
        let router = create_router(Arc::new(app_state));
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            db,
            storage,
            _storage_dir: storage_dir,
        }
    }

    /// Sign up a user through the HTTP surface.
    pub async fn signup(&self, username: &str, password: &str) {
        self.server
            .post("/sign-up")
            .form(&[("username", username), ("password", password)])
            .await
            .assert_status(StatusCode::SEE_OTHER);
    }

    /// Log in and return the session token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .server
            .post("/login")
            .form(&[("username", username), ("password", password)])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        response.cookie(SESSION_COOKIE).value().to_string()
    }

    /// Sign up and log in, returning the session token.
    pub async fn user(&self, username: &str) -> String {
        self.signup(username, TEST_PASSWORD).await;
        self.login(username, TEST_PASSWORD).await
    }

    /// Fetch a listing JSON (`/files` or `/files/:id`).
    pub async fn listing(&self, token: &str, path: &str) -> Value {
        let response = self
            .server
            .get(path)
            .add_header(AUTHORIZATION, bearer(token))
            .await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    /// Create a folder and return its id.
    pub async fn create_folder(&self, token: &str, parent: Option<i64>, name: &str) -> i64 {
        let path = match parent {
            Some(id) => format!("/files/{}/new/folder", id),
            None => "/files/new/folder".to_string(),
        };
        self.server
            .post(&path)
            .add_header(AUTHORIZATION, bearer(token))
            .form(&[("name", name)])
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let listing = match parent {
            Some(id) => self.listing(token, &format!("/files/{}", id)).await,
            None => self.listing(token, "/files").await,
        };
        listing["data"]["folders"]
            .as_array()
            .expect("folders array")
            .iter()
            .find(|f| f["name"] == name)
            .and_then(|f| f["id"].as_i64())
            .expect("created folder in listing")
    }

    /// Count folder and file rows owned by a user.
    pub async fn row_counts(&self, username: &str) -> (i64, i64) {
        let user = filebox::db::UserRepository::new(self.db.pool())
            .get_by_username(username)
            .await
            .unwrap()
            .expect("user exists");
        let folders = filebox::file::FolderRepository::new(self.db.pool())
            .count_for_user(user.id)
            .await
            .unwrap();
        let files = filebox::file::FileRepository::new(self.db.pool())
            .count_for_user(user.id)
            .await
            .unwrap();
        (folders, files)
    }
}

/// `Authorization` header value for a session token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
