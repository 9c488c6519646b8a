//! Per-code scan statistics.
//!
//! Buckets are computed in Rust from the raw timestamps inside the window, so
//! the grouping does not depend on SQLite date functions.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;
use tracing::warn;

use crate::db::Store;
use crate::domain::time::parse_timestamp;
use crate::entities::qr_access_logs;

pub const RECENT_LIMIT: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Unknown or missing values fall back to `Day`.
    #[must_use]
    pub fn parse_or_day(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("week") => Self::Week,
            Some("month") => Self::Month,
            _ => Self::Day,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    #[must_use]
    pub const fn window_days(self) -> i64 {
        match self {
            Self::Day => 30,
            Self::Week => 84,
            Self::Month => 365,
        }
    }

    /// `YYYY-MM-DD` for days, the Monday of the ISO week for weeks, and
    /// `YYYY-MM` for months.
    #[must_use]
    pub fn bucket_key(self, at: DateTime<Utc>) -> String {
        let date = at.date_naive();
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let monday =
                    date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
                monday.format("%Y-%m-%d").to_string()
            }
            Self::Month => date.format("%Y-%m").to_string(),
        }
    }

    #[must_use]
    pub const fn chart_title(self) -> &'static str {
        match self {
            Self::Day => "Scans per day (last 30 days)",
            Self::Week => "Scans per week (last 12 weeks)",
            Self::Month => "Scans per month (last 12 months)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub key: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QrStats {
    pub total: u64,
    pub granularity: Granularity,
    pub chart_title: &'static str,
    pub buckets: Vec<Bucket>,
    pub recent: Vec<qr_access_logs::Model>,
}

/// Counts timestamps at or after `since` per bucket. Empty buckets are
/// omitted and keys come out ascending.
pub fn bucket_counts<'a>(
    timestamps: impl IntoIterator<Item = &'a str>,
    granularity: Granularity,
    since: DateTime<Utc>,
) -> Vec<Bucket> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();

    for raw in timestamps {
        let Some(at) = parse_timestamp(raw) else {
            warn!(accessed_at = raw, "Skipping unparseable access timestamp");
            continue;
        };
        if at < since {
            continue;
        }
        *counts.entry(granularity.bucket_key(at)).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(key, count)| Bucket { key, count })
        .collect()
}

#[derive(Clone)]
pub struct StatsService {
    store: Store,
}

impl StatsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn aggregate(&self, qr_code_id: i32, granularity: Granularity) -> Result<QrStats> {
        self.aggregate_at(qr_code_id, granularity, Utc::now()).await
    }

    /// Window ends at `now`.
    pub async fn aggregate_at(
        &self,
        qr_code_id: i32,
        granularity: Granularity,
        now: DateTime<Utc>,
    ) -> Result<QrStats> {
        let since = now - Duration::days(granularity.window_days());

        // Day prefix keeps legacy space-separated rows from the first day in
        // the candidate set; the exact cutoff is applied after parsing.
        let since_day = since.format("%Y-%m-%d").to_string();

        let total = self.store.count_access_logs(qr_code_id).await?;
        let timestamps = self
            .store
            .access_timestamps_since(qr_code_id, &since_day)
            .await?;
        let recent = self
            .store
            .recent_access_logs(qr_code_id, RECENT_LIMIT)
            .await?;

        Ok(QrStats {
            total,
            granularity,
            chart_title: granularity.chart_title(),
            buckets: bucket_counts(timestamps.iter().map(String::as_str), granularity, since),
            recent,
        })
    }
}
