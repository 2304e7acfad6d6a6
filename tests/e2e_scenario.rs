//! End-to-end scenario through the HTTP surface.

mod common;

use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use common::{TestApp, TEST_PASSWORD};
use filebox::web::middleware::SESSION_COOKIE;
use serde_json::Value;

fn find_id(listing: &Value, key: &str, name: &str) -> i64 {
    listing["data"][key]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["name"] == name)
        .and_then(|entry| entry["id"].as_i64())
        .unwrap()
}

/// Signup, login, build a small tree, upload into it, then delete it all.
#[tokio::test]
async fn test_signup_to_recursive_delete() {
    let app = TestApp::new().await;

    // Signup
    let response = app
        .server
        .post("/sign-up")
        .form(&[("username", "alice"), ("password", TEST_PASSWORD)])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);

    // Login with the cookie, the way a browser would
    let response = app
        .server
        .post("/login")
        .form(&[("username", "alice"), ("password", TEST_PASSWORD)])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    let cookie = response.cookie(SESSION_COOKIE);

    // Create "Photos"
    app.server
        .post("/files/new/folder")
        .add_cookie(cookie.clone())
        .form(&[("name", "Photos")])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let root: Value = app.server.get("/files").add_cookie(cookie.clone()).await.json();
    let photos = find_id(&root, "folders", "Photos");

    // Create "2024" under it
    app.server
        .post(&format!("/files/{}/new/folder", photos))
        .add_cookie(cookie.clone())
        .form(&[("name", "2024")])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let photos_listing: Value = app
        .server
        .get(&format!("/files/{}", photos))
        .add_cookie(cookie.clone())
        .await
        .json();
    let year = find_id(&photos_listing, "folders", "2024");

    // Upload into "2024"
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"PNG bytes".to_vec())
            .file_name("beach.png")
            .mime_type("image/png"),
    );
    let response = app
        .server
        .post(&format!("/files/{}/upload/file", year))
        .add_cookie(cookie.clone())
        .multipart(form)
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header(LOCATION), format!("/files/{}", year).as_str());

    assert_eq!(app.row_counts("alice").await, (2, 1));
    assert_eq!(app.storage.count_objects().await.unwrap(), 1);

    // Delete "Photos"
    let response = app
        .server
        .post(&format!("/files/delete/folder/{}", photos))
        .add_cookie(cookie.clone())
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header(LOCATION), "/files");

    assert_eq!(app.row_counts("alice").await, (0, 0));
    assert_eq!(app.storage.count_objects().await.unwrap(), 0);

    let root: Value = app.server.get("/files").add_cookie(cookie.clone()).await.json();
    assert_eq!(root["data"]["folders"].as_array().unwrap().len(), 0);

    // Logout, then the tree is behind the login page again
    app.server
        .post("/logout")
        .add_cookie(cookie)
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let response = app.server.get("/files").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header(LOCATION), "/login");
}
