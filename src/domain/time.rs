use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 so stored timestamps sort lexically.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[must_use]
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Accepts our own format plus the naive layouts older databases contain
/// (`2024-01-01T10:00:00.123456` and SQLite's `2024-01-01 10:00:00`), all UTC.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}
