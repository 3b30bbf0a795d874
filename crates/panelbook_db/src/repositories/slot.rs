//! SQL implementation of the slot store (the Availability Store).
//!
//! Slot status is the concurrency-control mechanism itself: the only status
//! mutation is [`SlotStore::transition_status`], a conditional UPDATE that
//! succeeds for exactly one writer when committers race on a slot.

use crate::error::DbError;
use crate::repositories::{format_timestamp, opt_text, parse_timestamp};
use crate::DbClient;
use chrono::{DateTime, Utc};
use panelbook_common::models::{NewSlot, Slot, SlotStatus};
use panelbook_common::services::{BoxFuture, SlotStore};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of the slot store
#[derive(Debug, Clone)]
pub struct SqlSlotRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlSlotRepository {
    /// Create a new SQL slot repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the slots table if it doesn't exist.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing slot schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS slots (
                id TEXT PRIMARY KEY,
                template_id TEXT,
                hiring_manager_id TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'open',
                source TEXT NOT NULL DEFAULT 'calendar',
                created_at TEXT NOT NULL
            )
        "#;

        self.db_client.execute(query).await?;

        info!("Slot schema initialized successfully");
        Ok(())
    }

    fn slot_from_row(row: &AnyRow) -> Result<Slot, DbError> {
        let status: String = row
            .try_get("status")
            .map_err(|e| DbError::RowError(e.to_string()))?;
        let source: String = row
            .try_get("source")
            .map_err(|e| DbError::RowError(e.to_string()))?;
        let start_time: String = row
            .try_get("start_time")
            .map_err(|e| DbError::RowError(e.to_string()))?;
        let end_time: String = row
            .try_get("end_time")
            .map_err(|e| DbError::RowError(e.to_string()))?;

        Ok(Slot {
            id: row
                .try_get("id")
                .map_err(|e| DbError::RowError(e.to_string()))?,
            template_id: opt_text(row, "template_id")?,
            hiring_manager_id: row
                .try_get("hiring_manager_id")
                .map_err(|e| DbError::RowError(e.to_string()))?,
            start_time: parse_timestamp(&start_time)?,
            end_time: parse_timestamp(&end_time)?,
            status: status.parse().map_err(DbError::RowError)?,
            source: source.parse().map_err(DbError::RowError)?,
        })
    }
}

impl SlotStore for SqlSlotRepository {
    type Error = DbError;

    fn get_slot(&self, slot_id: &str) -> BoxFuture<'_, Option<Slot>, DbError> {
        let slot_id = slot_id.to_string();
        Box::pin(async move {
            let query = r#"
                SELECT id, template_id, hiring_manager_id, start_time, end_time, status, source
                FROM slots
                WHERE id = $1
            "#;

            let row = sqlx::query(query)
                .bind(&slot_id)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to fetch slot {}: {}", slot_id, e);
                    DbError::QueryError(e.to_string())
                })?;

            row.as_ref().map(Self::slot_from_row).transpose()
        })
    }

    fn list_open_slots(
        &self,
        template_id: &str,
        from_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<Slot>, DbError> {
        let template_id = template_id.to_string();
        let from_time = format_timestamp(&from_time);
        Box::pin(async move {
            debug!(
                "Listing open slots for template {} from {}",
                template_id, from_time
            );

            // Template-scoped slots, plus manager-wide slots of managers
            // assigned to this template.
            let query = r#"
                SELECT id, template_id, hiring_manager_id, start_time, end_time, status, source
                FROM slots
                WHERE status = 'open'
                  AND start_time >= $2
                  AND (
                      template_id = $1
                      OR (template_id IS NULL AND hiring_manager_id IN (
                          SELECT hiring_manager_id
                          FROM template_hiring_managers
                          WHERE template_id = $1
                      ))
                  )
                ORDER BY start_time ASC
            "#;

            let rows = sqlx::query(query)
                .bind(&template_id)
                .bind(&from_time)
                .fetch_all(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to list open slots: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            rows.iter().map(Self::slot_from_row).collect()
        })
    }

    fn list_manager_slots(
        &self,
        manager_id: &str,
        from_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<Slot>, DbError> {
        let manager_id = manager_id.to_string();
        let from_time = format_timestamp(&from_time);
        Box::pin(async move {
            let query = r#"
                SELECT id, template_id, hiring_manager_id, start_time, end_time, status, source
                FROM slots
                WHERE hiring_manager_id = $1 AND start_time >= $2
                ORDER BY start_time ASC
            "#;

            let rows = sqlx::query(query)
                .bind(&manager_id)
                .bind(&from_time)
                .fetch_all(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to list manager slots: {}", e);
                    DbError::QueryError(e.to_string())
                })?;

            rows.iter().map(Self::slot_from_row).collect()
        })
    }

    fn insert_slots(&self, slots: Vec<NewSlot>) -> BoxFuture<'_, Vec<Slot>, DbError> {
        Box::pin(async move {
            debug!("Inserting {} slots", slots.len());

            let query = r#"
                INSERT INTO slots (id, template_id, hiring_manager_id, start_time, end_time, status, source, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#;

            let created_at = format_timestamp(&Utc::now());
            let mut inserted = Vec::with_capacity(slots.len());
            for new_slot in slots {
                let id = uuid::Uuid::new_v4().to_string();
                sqlx::query(query)
                    .bind(&id)
                    .bind(&new_slot.template_id)
                    .bind(&new_slot.hiring_manager_id)
                    .bind(format_timestamp(&new_slot.start_time))
                    .bind(format_timestamp(&new_slot.end_time))
                    .bind(new_slot.status.as_str())
                    .bind(new_slot.source.as_str())
                    .bind(&created_at)
                    .execute(self.db_client.pool())
                    .await
                    .map_err(|e| {
                        error!("Failed to insert slot: {}", e);
                        DbError::QueryError(e.to_string())
                    })?;

                inserted.push(Slot {
                    id,
                    template_id: new_slot.template_id,
                    hiring_manager_id: new_slot.hiring_manager_id,
                    start_time: new_slot.start_time,
                    end_time: new_slot.end_time,
                    status: new_slot.status,
                    source: new_slot.source,
                });
            }

            info!("Inserted {} slots", inserted.len());
            Ok(inserted)
        })
    }

    fn transition_status(
        &self,
        slot_id: &str,
        expected: SlotStatus,
        new_status: SlotStatus,
    ) -> BoxFuture<'_, bool, DbError> {
        let slot_id = slot_id.to_string();
        Box::pin(async move {
            debug!(
                "Transitioning slot {} from {} to {}",
                slot_id, expected, new_status
            );

            // Conditional write: the WHERE clause on the current status makes
            // this a compare-and-swap, so concurrent committers cannot both
            // win the same slot.
            let query = r#"
                UPDATE slots
                SET status = $1
                WHERE id = $2 AND status = $3
            "#;

            let result = sqlx::query(query)
                .bind(new_status.as_str())
                .bind(&slot_id)
                .bind(expected.as_str())
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to transition slot {}: {}", slot_id, e);
                    DbError::QueryError(e.to_string())
                })?;

            let won = result.rows_affected() == 1;
            if !won {
                info!(
                    "Slot {} transition {} -> {} lost: status changed concurrently",
                    slot_id, expected, new_status
                );
            }
            Ok(won)
        })
    }
}
