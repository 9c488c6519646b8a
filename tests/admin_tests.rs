//! Integration tests for admin-only user management and metrics.

mod common;

use axum::http::StatusCode;
use common::spawn_app;

#[tokio::test]
async fn test_admin_lists_users_without_hashes() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app.get("/admin/users", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);

    let users = response.json()["data"].as_array().unwrap().clone();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "admin@example.com");
    assert_eq!(users[0]["role"], "admin");
    assert!(users[0].get("password_hash").is_none());
}

#[tokio::test]
async fn test_create_user_validation() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app
        .post_form("/admin/users", Some(&cookie), "email=&password=x")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post_form(
            "/admin/users",
            Some(&cookie),
            "email=New%40Example.com&password=pw&role=superuser",
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let data = &response.json()["data"];
    assert_eq!(data["email"], "new@example.com");
    assert_eq!(data["role"], "user");

    let response = app
        .post_form(
            "/admin/users",
            Some(&cookie),
            "email=new%40example.com&password=other",
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_non_admin_is_forbidden() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (_, user) = app.login_new_user(&admin, "user@example.com").await;

    for uri in ["/admin/users", "/metrics"] {
        let response = app.get(uri, Some(&user)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{uri}");
    }

    let response = app.get("/admin/users", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_disabled_user_loses_access() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (user_id, user) = app.login_new_user(&admin, "temp@example.com").await;

    let response = app
        .post_form(
            &format!("/admin/users/{user_id}/active"),
            Some(&admin),
            "is_active=0",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"]["is_active"], false);

    let response = app.get("/", Some(&user)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .post_form(
            "/login",
            None,
            "email=temp%40example.com&password=user-pass",
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_cannot_disable_self() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;

    let users = app.get("/admin/users", Some(&admin)).await.json();
    let admin_id = users["data"][0]["id"].as_i64().unwrap();

    let response = app
        .post_form(
            &format!("/admin/users/{admin_id}/active"),
            Some(&admin),
            "is_active=0",
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;

    let response = app.get("/metrics", Some(&admin)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("Metrics not enabled"));
}
