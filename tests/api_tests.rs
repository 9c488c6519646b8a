//! Integration tests for login, the dashboard and QR code management.

mod common;

use axum::http::{StatusCode, header};
use common::spawn_app;

#[tokio::test]
async fn test_login_page_reports_anonymous() {
    let app = spawn_app().await;

    let response = app.get("/login", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"]["authenticated"], false);
}

#[tokio::test]
async fn test_login_redirects_when_already_authenticated() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app.get("/login", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), Some("/"));
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let app = spawn_app().await;

    let response = app
        .post_form(
            "/login",
            None,
            "email=admin%40example.com&password=wrong-password",
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "Invalid login");
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let app = spawn_app().await;

    let response = app
        .post_form(
            "/login",
            None,
            "email=%20Admin%40Example.com%20&password=admin-pass",
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_dashboard_requires_login() {
    let app = spawn_app().await;

    let response = app.get("/", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), Some("/login"));

    let response = app.get("/", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_qr_starts_active_without_destination() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app
        .post_form("/qr/new", Some(&cookie), "code=QR-001&description=Front+door")
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let data = &response.json()["data"];
    assert_eq!(data["code"], "QR-001");
    assert_eq!(data["status"], "active");
    assert_eq!(data["description"], "Front door");
    assert!(data["current_url"].is_null());
    assert_eq!(data["public_url"], "http://127.0.0.1:5000/r/QR-001");
}

#[tokio::test]
async fn test_create_qr_requires_code() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app
        .post_form("/qr/new", Some(&cookie), "code=++&description=x")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["success"], false);
}

#[tokio::test]
async fn test_duplicate_code_is_rejected_and_original_untouched() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;
    let id = app.create_qr(&cookie, "QR-001").await;

    let response = app
        .post_form("/qr/new", Some(&cookie), "code=QR-001&description=Other")
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(
        response.json()["error"]
            .as_str()
            .unwrap()
            .contains("already exists")
    );

    let original = app.get(&format!("/qr/{id}/edit"), Some(&cookie)).await;
    assert_eq!(original.json()["data"]["description"], "Test");
}

#[tokio::test]
async fn test_edit_updates_destination_and_status() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;
    let id = app.create_qr(&cookie, "QR-002").await;

    let response = app
        .edit_qr(&cookie, id, "https://example.com/x", "inactive")
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let data = &response.json()["data"];
    assert_eq!(data["current_url"], "https://example.com/x");
    assert_eq!(data["status"], "inactive");
    assert_eq!(data["description"], "Edited");

    // Blank URL clears the destination.
    let response = app.edit_qr(&cookie, id, "", "active").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["data"]["current_url"].is_null());
}

#[tokio::test]
async fn test_edit_rejects_invalid_url_and_status() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;
    let id = app.create_qr(&cookie, "QR-003").await;

    for bad in ["ftp://x", "not-a-url", "http://"] {
        let response = app.edit_qr(&cookie, id, bad, "active").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{bad}");
    }

    let response = app
        .edit_qr(&cookie, id, "https://example.com", "paused")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let stored = app.get(&format!("/qr/{id}/edit"), Some(&cookie)).await;
    assert!(stored.json()["data"]["current_url"].is_null());
}

#[tokio::test]
async fn test_unknown_qr_is_not_found() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app.get("/qr/999/edit", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_admin_cannot_see_other_users_code() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let admin_qr = app.create_qr(&admin, "ADMIN-ONLY").await;

    let (_, user) = app.login_new_user(&admin, "user@example.com").await;

    for uri in [
        format!("/qr/{admin_qr}/edit"),
        format!("/qr/{admin_qr}/stats"),
        "/qr/ADMIN-ONLY/png".to_string(),
    ] {
        let response = app.get(&uri, Some(&user)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
    }

    let response = app
        .edit_qr(&user, admin_qr, "https://evil.example.com", "active")
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_is_scoped_per_principal() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    app.create_qr(&admin, "ADMIN-QR").await;

    let (_, user) = app.login_new_user(&admin, "owner@example.com").await;
    app.create_qr(&user, "USER-QR").await;

    let response = app.get("/", Some(&user)).await;
    assert_eq!(response.status, StatusCode::OK);
    let data = &response.json()["data"];
    assert_eq!(data["scope_label"], "Your QR codes");
    let items = data["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["code"], "USER-QR");

    let response = app.get("/", Some(&admin)).await;
    let data = &response.json()["data"];
    assert_eq!(data["scope_label"], "All QR codes (admin)");
    let items = data["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    // Newest first, with the owner joined in.
    assert_eq!(items[0]["code"], "USER-QR");
    assert_eq!(items[0]["owner_email"], "owner@example.com");
    assert_eq!(items[1]["owner_email"], "admin@example.com");
    assert_eq!(items[0]["scans"], 0);
}

#[tokio::test]
async fn test_png_download() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;
    app.create_qr(&cookie, "QR-PNG").await;

    let response = app.get("/qr/QR-PNG/png", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        Some(mime::IMAGE_PNG.as_ref())
    );
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        Some("attachment; filename=\"QR-PNG.png\"")
    );
    assert!(response.body.starts_with(b"\x89PNG"));
}
