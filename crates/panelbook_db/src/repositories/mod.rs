//! SQL repositories backing the Panelbook service traits.
//!
//! Timestamps are stored as RFC3339 TEXT and converted at the edges:
//! `DateTime<Utc>` does not decode through `sqlx::Any`, and a fixed
//! `Z`-suffixed second-precision rendering keeps lexicographic ordering
//! aligned with chronological ordering for SQL comparisons.

pub mod booking;
pub mod slot;
pub mod template;

pub use booking::SqlBookingRepository;
pub use slot::SqlSlotRepository;
pub use template::SqlTemplateRepository;

use crate::error::DbError;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::any::AnyRow;
use sqlx::{Row, ValueRef};

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Read a nullable TEXT column from an `AnyRow`.
///
/// `try_get::<Option<String>, _>` refuses to decode SQL NULL through the
/// `Any` driver ("Rust type `Option<String>` is not compatible with SQL type
/// `NULL`"), so nullability is checked on the raw value first.
pub(crate) fn opt_text(row: &AnyRow, column: &str) -> Result<Option<String>, DbError> {
    let raw = row
        .try_get_raw(column)
        .map_err(|e| DbError::RowError(e.to_string()))?;
    if raw.is_null() {
        return Ok(None);
    }
    row.try_get::<String, _>(column)
        .map(Some)
        .map_err(|e| DbError::RowError(e.to_string()))
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::RowError(format!("invalid timestamp '{raw}': {e}")))
}

#[cfg(all(test, feature = "sqlite"))]
pub(crate) mod testutil {
    use crate::DbClient;

    /// Fresh file-backed SQLite database; `sqlite::memory:` gives every
    /// pooled connection its own database, so schema and data would not be
    /// shared across queries.
    pub(crate) async fn temp_client() -> DbClient {
        let path = std::env::temp_dir().join(format!("panelbook-test-{}.db", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}", path.display());
        DbClient::from_url(&url).await.unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_round_trip_is_lossless_at_second_precision() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        let raw = format_timestamp(&ts);
        assert_eq!(raw, "2026-03-02T09:30:00Z");
        assert_eq!(parse_timestamp(&raw).unwrap(), ts);
    }

    #[test]
    fn timestamp_ordering_matches_string_ordering() {
        let earlier = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }

    #[test]
    fn garbage_timestamps_are_rejected() {
        assert!(parse_timestamp("next tuesday").is_err());
    }
}
