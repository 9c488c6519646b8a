#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use qrlink::api::AppState;
use qrlink::config::Config;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-pass";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub fn temp_db_path() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("qrlink-test-{}.db", uuid::Uuid::new_v4()))
}

pub fn test_config(db_path: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;
    config.bootstrap.admin_email = ADMIN_EMAIL.to_string();
    config.bootstrap.admin_password = ADMIN_PASSWORD.to_string();
    config.bootstrap.admin_name = "Admin".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_at(&temp_db_path()).await
}

/// Starts the app on `db_path`, which may already hold data.
pub async fn spawn_app_at(db_path: &std::path::Path) -> TestApp {
    let state = qrlink::api::create_app_state_from_config(test_config(db_path), None)
        .await
        .expect("Failed to create app state");

    let router = qrlink::api::router(state.clone())
        .await
        .expect("Failed to build router");

    TestApp { router, state }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, body: &str) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Logs in and returns the `name=value` pair to send back as `Cookie`.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = format!(
            "email={}&password={}",
            email.replace('@', "%40"),
            password
        );
        let response = self.post_form("/login", None, &body).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "login failed");

        let set_cookie = response
            .header(header::SET_COOKIE)
            .expect("login should set a session cookie");
        set_cookie.split(';').next().unwrap().to_string()
    }

    pub async fn login_admin(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Creates a regular user through the admin API and logs them in.
    pub async fn login_new_user(&self, admin_cookie: &str, email: &str) -> (i64, String) {
        let body = format!(
            "name=Tester&email={}&password=user-pass&role=user",
            email.replace('@', "%40")
        );
        let response = self
            .post_form("/admin/users", Some(admin_cookie), &body)
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        let id = response.json()["data"]["id"].as_i64().unwrap();

        (id, self.login(email, "user-pass").await)
    }

    /// Creates a code and returns its id.
    pub async fn create_qr(&self, cookie: &str, code: &str) -> i32 {
        let response = self
            .post_form("/qr/new", Some(cookie), &format!("code={code}&description=Test"))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        i32::try_from(response.json()["data"]["id"].as_i64().unwrap()).unwrap()
    }

    pub async fn edit_qr(&self, cookie: &str, id: i32, url: &str, status: &str) -> TestResponse {
        let body = format!(
            "current_url={}&description=Edited&status={status}",
            url.replace(':', "%3A").replace('/', "%2F")
        );
        self.post_form(&format!("/qr/{id}/edit"), Some(cookie), &body)
            .await
    }
}
