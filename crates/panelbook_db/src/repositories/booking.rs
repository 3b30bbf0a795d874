//! SQL implementation of the booking store.
//!
//! `additional_slot_ids` is stored as a JSON array in a TEXT column so the
//! schema stays portable across the `sqlx::Any` backends.

use crate::error::DbError;
use crate::repositories::{format_timestamp, opt_text};
use crate::DbClient;
use chrono::Utc;
use panelbook_common::models::{Booking, BookingStatus};
use panelbook_common::services::{BookingStore, BoxFuture, ConfirmBooking};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of the booking store
#[derive(Debug, Clone)]
pub struct SqlBookingRepository {
    /// The database client
    db_client: DbClient,
}

const BOOKING_COLUMNS: &str = "id, template_id, candidate_name, candidate_email, candidate_phone, \
     status, token, slot_id, additional_slot_ids, timezone, meeting_link, meeting_platform";

impl SqlBookingRepository {
    /// Create a new SQL booking repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the bookings table if it doesn't exist.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing booking schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                template_id TEXT,
                candidate_name TEXT NOT NULL,
                candidate_email TEXT NOT NULL,
                candidate_phone TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                token TEXT NOT NULL UNIQUE,
                slot_id TEXT,
                additional_slot_ids TEXT NOT NULL DEFAULT '[]',
                timezone TEXT,
                meeting_link TEXT,
                meeting_platform TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#;

        self.db_client.execute(query).await?;

        info!("Booking schema initialized successfully");
        Ok(())
    }

    fn booking_from_row(row: &AnyRow) -> Result<Booking, DbError> {
        let status: String = row
            .try_get("status")
            .map_err(|e| DbError::RowError(e.to_string()))?;
        let additional_raw: String = row
            .try_get("additional_slot_ids")
            .map_err(|e| DbError::RowError(e.to_string()))?;
        let additional_slot_ids: Vec<String> = serde_json::from_str(&additional_raw)
            .map_err(|e| DbError::RowError(format!("invalid additional_slot_ids: {e}")))?;

        Ok(Booking {
            id: row
                .try_get("id")
                .map_err(|e| DbError::RowError(e.to_string()))?,
            template_id: opt_text(row, "template_id")?,
            candidate_name: row
                .try_get("candidate_name")
                .map_err(|e| DbError::RowError(e.to_string()))?,
            candidate_email: row
                .try_get("candidate_email")
                .map_err(|e| DbError::RowError(e.to_string()))?,
            candidate_phone: opt_text(row, "candidate_phone")?,
            status: status.parse().map_err(DbError::RowError)?,
            token: row
                .try_get("token")
                .map_err(|e| DbError::RowError(e.to_string()))?,
            slot_id: opt_text(row, "slot_id")?,
            additional_slot_ids,
            timezone: opt_text(row, "timezone")?,
            meeting_link: opt_text(row, "meeting_link")?,
            meeting_platform: opt_text(row, "meeting_platform")?,
        })
    }

    async fn fetch_one(&self, column: &str, value: &str) -> Result<Option<Booking>, DbError> {
        let query = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE {column} = $1");

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to fetch booking by {}: {}", column, e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(Self::booking_from_row).transpose()
    }
}

impl BookingStore for SqlBookingRepository {
    type Error = DbError;

    fn find_by_token(&self, token: &str) -> BoxFuture<'_, Option<Booking>, DbError> {
        let token = token.to_string();
        Box::pin(async move { self.fetch_one("token", &token).await })
    }

    fn find_by_id(&self, booking_id: &str) -> BoxFuture<'_, Option<Booking>, DbError> {
        let booking_id = booking_id.to_string();
        Box::pin(async move { self.fetch_one("id", &booking_id).await })
    }

    fn create(&self, booking: Booking) -> BoxFuture<'_, Booking, DbError> {
        Box::pin(async move {
            debug!("Creating booking {}", booking.id);

            let query = r#"
                INSERT INTO bookings (
                    id, template_id, candidate_name, candidate_email, candidate_phone,
                    status, token, slot_id, additional_slot_ids, timezone,
                    meeting_link, meeting_platform, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#;

            let additional = serde_json::to_string(&booking.additional_slot_ids)
                .map_err(|e| DbError::QueryError(e.to_string()))?;
            let now = format_timestamp(&Utc::now());

            sqlx::query(query)
                .bind(&booking.id)
                .bind(&booking.template_id)
                .bind(&booking.candidate_name)
                .bind(&booking.candidate_email)
                .bind(&booking.candidate_phone)
                .bind(booking.status.as_str())
                .bind(&booking.token)
                .bind(&booking.slot_id)
                .bind(&additional)
                .bind(&booking.timezone)
                .bind(&booking.meeting_link)
                .bind(&booking.meeting_platform)
                .bind(&now)
                .bind(&now)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to create booking: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            info!("Created booking {} ({})", booking.id, booking.status);
            Ok(booking)
        })
    }

    fn confirm(
        &self,
        booking_id: &str,
        update: ConfirmBooking,
    ) -> BoxFuture<'_, Booking, DbError> {
        let booking_id = booking_id.to_string();
        Box::pin(async move {
            debug!("Confirming booking {}", booking_id);

            let query = r#"
                UPDATE bookings
                SET status = 'confirmed',
                    slot_id = $1,
                    additional_slot_ids = $2,
                    candidate_name = $3,
                    candidate_email = $4,
                    candidate_phone = $5,
                    timezone = $6,
                    updated_at = $7
                WHERE id = $8
            "#;

            let additional = serde_json::to_string(&update.additional_slot_ids)
                .map_err(|e| DbError::QueryError(e.to_string()))?;

            let result = sqlx::query(query)
                .bind(&update.slot_id)
                .bind(&additional)
                .bind(&update.candidate_name)
                .bind(&update.candidate_email)
                .bind(&update.candidate_phone)
                .bind(&update.timezone)
                .bind(format_timestamp(&Utc::now()))
                .bind(&booking_id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to confirm booking {}: {}", booking_id, e);
                    DbError::QueryError(e.to_string())
                })?;

            if result.rows_affected() == 0 {
                return Err(DbError::QueryError(format!(
                    "booking {booking_id} not found"
                )));
            }

            let booking = self
                .fetch_one("id", &booking_id)
                .await?
                .ok_or_else(|| {
                    DbError::QueryError(format!("booking {booking_id} vanished after update"))
                })?;

            info!("Confirmed booking {}", booking_id);
            Ok(booking)
        })
    }

    fn set_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
    ) -> BoxFuture<'_, bool, DbError> {
        let booking_id = booking_id.to_string();
        Box::pin(async move {
            debug!("Setting booking {} status to {}", booking_id, status);

            let query = r#"
                UPDATE bookings
                SET status = $1, updated_at = $2
                WHERE id = $3
            "#;

            let result = sqlx::query(query)
                .bind(status.as_str())
                .bind(format_timestamp(&Utc::now()))
                .bind(&booking_id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to update booking {} status: {}", booking_id, e);
                    DbError::QueryError(e.to_string())
                })?;

            Ok(result.rows_affected() > 0)
        })
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::repositories::testutil::temp_client;

    fn pending_invite() -> Booking {
        Booking {
            id: "b1".to_string(),
            template_id: Some("tpl1".to_string()),
            candidate_name: "Pending Invite".to_string(),
            candidate_email: "candidate@example.com".to_string(),
            candidate_phone: None,
            status: BookingStatus::Pending,
            token: "tok1".to_string(),
            slot_id: None,
            additional_slot_ids: Vec::new(),
            timezone: None,
            meeting_link: None,
            meeting_platform: None,
        }
    }

    async fn repository() -> SqlBookingRepository {
        let repo = SqlBookingRepository::new(temp_client().await);
        repo.init_schema().await.unwrap();
        repo
    }

    // A freshly-created invite has NULL candidate_phone, slot_id, timezone,
    // meeting_link and meeting_platform; reading it back must not fail on
    // the Any driver's NULL decoding.
    #[tokio::test]
    async fn pending_invite_with_null_fields_round_trips() {
        let repo = repository().await;
        repo.create(pending_invite()).await.unwrap();

        let found = repo.find_by_token("tok1").await.unwrap().unwrap();
        assert_eq!(found.id, "b1");
        assert_eq!(found.template_id.as_deref(), Some("tpl1"));
        assert_eq!(found.status, BookingStatus::Pending);
        assert_eq!(found.candidate_phone, None);
        assert_eq!(found.slot_id, None);
        assert_eq!(found.timezone, None);
        assert_eq!(found.meeting_link, None);
        assert!(found.additional_slot_ids.is_empty());
    }

    #[tokio::test]
    async fn confirm_fills_the_invite_and_flips_its_status() {
        let repo = repository().await;
        repo.create(pending_invite()).await.unwrap();

        let confirmed = repo
            .confirm(
                "b1",
                ConfirmBooking {
                    slot_id: "s1".to_string(),
                    additional_slot_ids: vec!["s2".to_string()],
                    candidate_name: "Ada Candidate".to_string(),
                    candidate_email: "ada@example.com".to_string(),
                    candidate_phone: None,
                    timezone: Some("Europe/Zurich".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert_eq!(confirmed.slot_id.as_deref(), Some("s1"));
        assert_eq!(confirmed.additional_slot_ids, vec!["s2".to_string()]);
        assert_eq!(confirmed.timezone.as_deref(), Some("Europe/Zurich"));
        assert_eq!(confirmed.candidate_phone, None);
    }

    #[tokio::test]
    async fn missing_token_yields_none() {
        let repo = repository().await;
        assert!(repo.find_by_token("nope").await.unwrap().is_none());
    }
}
