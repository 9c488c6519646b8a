//! Integration tests for adopting a database created before migrations and
//! ownership existed.

mod common;

use axum::http::{StatusCode, header};
use chrono::{Duration, Utc};
use common::{ADMIN_EMAIL, spawn_app_at, temp_db_path};
use qrlink::services::Granularity;
use sea_orm::{ConnectionTrait, Database};

const LEGACY_SCHEMA: &str = r"
CREATE TABLE users (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT,
  email TEXT UNIQUE NOT NULL,
  password_hash TEXT NOT NULL,
  role TEXT NOT NULL DEFAULT 'user',
  is_active INTEGER NOT NULL DEFAULT 1,
  created_at TEXT DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX idx_users_email ON users(email);

CREATE TABLE qr_codes (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  code TEXT UNIQUE NOT NULL,
  current_url TEXT,
  status TEXT NOT NULL DEFAULT 'active',
  description TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
);
CREATE INDEX idx_qr_codes_code ON qr_codes(code);

CREATE TABLE qr_access_logs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  qr_code_id INTEGER NOT NULL,
  accessed_at TEXT NOT NULL,
  ip_address TEXT,
  user_agent TEXT,
  referer TEXT,
  FOREIGN KEY(qr_code_id) REFERENCES qr_codes(id)
);
CREATE INDEX idx_logs_qr_code_id ON qr_access_logs(qr_code_id);
";

#[tokio::test]
async fn test_legacy_database_is_adopted() {
    let db_path = temp_db_path();
    std::fs::File::create(&db_path).unwrap();

    // Naive timestamps, as older deployments wrote them.
    let yesterday = Utc::now() - Duration::days(1);
    let legacy_at = yesterday.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f");

    let conn = Database::connect(format!("sqlite:{}", db_path.display()))
        .await
        .unwrap();
    conn.execute_unprepared(LEGACY_SCHEMA).await.unwrap();
    conn.execute_unprepared(&format!(
        "INSERT INTO qr_codes (code, current_url, status, description, created_at, updated_at) \
         VALUES ('QR-OLD', 'https://example.com/old', 'active', 'Legacy', '{legacy_at}', '{legacy_at}');
         INSERT INTO qr_access_logs (qr_code_id, accessed_at, ip_address, user_agent, referer) \
         VALUES (1, '{legacy_at}', '198.51.100.7', 'OldAgent', '');"
    ))
    .await
    .unwrap();
    conn.close().await.unwrap();

    let app = spawn_app_at(&db_path).await;
    let store = app.state.store();

    let admin = store.get_user_by_email(ADMIN_EMAIL).await.unwrap().unwrap();
    let qr = store.get_qr_code_by_code("QR-OLD").await.unwrap().unwrap();
    assert_eq!(qr.owner_user_id, Some(admin.id));

    let response = app.get("/r/QR-OLD", None).await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(
        response.header(header::LOCATION),
        Some("https://example.com/old")
    );

    let stats = app
        .state
        .stats_service()
        .aggregate(qr.id, Granularity::Day)
        .await
        .unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.buckets.iter().map(|b| b.count).sum::<u64>(), 2);
    assert!(
        stats
            .buckets
            .iter()
            .any(|b| b.key == Granularity::Day.bucket_key(yesterday))
    );
}

#[tokio::test]
async fn test_reopening_a_migrated_database_is_a_no_op() {
    let db_path = temp_db_path();

    let first = spawn_app_at(&db_path).await;
    let cookie = first.login_admin().await;
    first.create_qr(&cookie, "QR-KEEP").await;
    drop(first);

    let second = spawn_app_at(&db_path).await;
    let users = second.state.auth_service().list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert!(
        second
            .state
            .store()
            .get_qr_code_by_code("QR-KEEP")
            .await
            .unwrap()
            .is_some()
    );
}
