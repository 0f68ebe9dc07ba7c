use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

/// SQLite stores default timestamps as "YYYY-MM-DD HH:MM:SS" without a
/// timezone; caller-supplied dates round-trip as RFC3339. Accept both,
/// treating the naive form as UTC.
pub(crate) fn parse_db_time(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

pub(crate) fn parse_db_uuid(raw: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt id '{}': {}", raw, e);
        Uuid::default()
    })
}
