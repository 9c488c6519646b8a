//! Integration tests for per-code scan statistics.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::spawn_app;
use qrlink::db::AccessRecord;
use qrlink::domain::time::format_timestamp;
use qrlink::services::Granularity;

#[tokio::test]
async fn test_stats_endpoint_groups_by_day() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;
    let id = app.create_qr(&cookie, "QR-STATS").await;

    let store = app.state.store();
    let two_days_ago = Utc::now() - Duration::days(2);
    let yesterday = Utc::now() - Duration::days(1);
    let long_ago = Utc::now() - Duration::days(100);

    for at in [two_days_ago, two_days_ago, yesterday, long_ago] {
        store
            .append_access_log_at(id, &format_timestamp(at), &AccessRecord::default())
            .await
            .unwrap();
    }

    let response = app
        .get(&format!("/qr/{id}/stats?group=day"), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let data = &response.json()["data"];
    assert_eq!(data["total"], 4);
    assert_eq!(data["group"], "day");
    assert_eq!(data["chart_title"], "Scans per day (last 30 days)");

    let expected_labels = vec![
        Granularity::Day.bucket_key(two_days_ago),
        Granularity::Day.bucket_key(yesterday),
    ];
    let labels: Vec<String> = data["labels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(labels, expected_labels);
    assert_eq!(data["values"], serde_json::json!([2, 1]));
    assert_eq!(data["recent"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_stats_month_window_includes_older_scans() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;
    let id = app.create_qr(&cookie, "QR-MONTH").await;

    let long_ago = Utc::now() - Duration::days(100);
    app.state
        .store()
        .append_access_log_at(id, &format_timestamp(long_ago), &AccessRecord::default())
        .await
        .unwrap();

    let response = app
        .get(&format!("/qr/{id}/stats?group=month"), Some(&cookie))
        .await;
    let data = &response.json()["data"];
    assert_eq!(data["group"], "month");
    assert_eq!(
        data["labels"],
        serde_json::json!([Granularity::Month.bucket_key(long_ago)])
    );
}

#[tokio::test]
async fn test_stats_unknown_group_falls_back_to_day() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;
    let id = app.create_qr(&cookie, "QR-FALLBACK").await;

    let response = app
        .get(&format!("/qr/{id}/stats?group=decade"), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let data = &response.json()["data"];
    assert_eq!(data["group"], "day");
    assert_eq!(data["total"], 0);
    assert!(data["buckets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_recent_entries_are_capped_and_newest_first() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;
    let id = app.create_qr(&cookie, "QR-BUSY").await;

    for _ in 0..25 {
        app.get("/r/QR-BUSY", None).await;
    }

    let stats = app
        .state
        .stats_service()
        .aggregate(id, Granularity::Week)
        .await
        .unwrap();

    assert_eq!(stats.total, 25);
    assert_eq!(stats.recent.len(), 20);
    assert!(stats.recent[0].id > stats.recent[19].id);
    assert_eq!(stats.buckets.iter().map(|b| b.count).sum::<u64>(), 25);
}
