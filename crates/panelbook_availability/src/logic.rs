//! Availability grid mutations.
//!
//! Managers edit their grid locally and submit the result as one explicit
//! batch of status updates and new slots. Every status update goes through
//! the store's conditional transition, so edits that raced with a booking
//! are rejected individually instead of failing the whole batch.

use chrono::{DateTime, Utc};
use panelbook_common::models::{NewSlot, Slot, SlotSource, SlotStatus};
use panelbook_common::services::SlotStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum AvailabilityError {
    /// The batch itself is malformed; nothing was applied.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The underlying store failed.
    #[error("Store error: {0}")]
    Store(String),
}

/// Whether a manager- or booking-driven status transition is permitted.
///
/// Open slots may be booked or blocked; blocked slots may be reopened.
/// Booked slots are immutable: releasing one is a recruiter decision, not
/// a grid edit.
pub fn transition_allowed(from: SlotStatus, to: SlotStatus) -> bool {
    matches!(
        (from, to),
        (SlotStatus::Open, SlotStatus::Booked)
            | (SlotStatus::Open, SlotStatus::Blocked)
            | (SlotStatus::Blocked, SlotStatus::Open)
    )
}

/// One pending status edit from the grid.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotUpdate {
    pub slot_id: String,
    pub status: SlotStatus,
}

/// One new slot drawn on the grid.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotInsert {
    pub template_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default = "default_insert_status")]
    pub status: SlotStatus,
}

fn default_insert_status() -> SlotStatus {
    SlotStatus::Open
}

/// A manager's batch of pending grid mutations.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityBatch {
    #[serde(default)]
    pub updates: Vec<SlotUpdate>,
    #[serde(default)]
    pub inserts: Vec<SlotInsert>,
}

/// Result of applying a batch. Rejected ids are edits that lost a race or
/// targeted a slot the manager may not touch; the rest of the batch still
/// applied.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub updated: Vec<String>,
    pub rejected: Vec<String>,
    pub inserted: Vec<Slot>,
}

/// Apply one manager's availability batch.
///
/// Inserts are validated up front (start before end, status open or
/// blocked); a malformed insert rejects the whole batch before anything is
/// written. Updates are then applied one by one through the conditional
/// transition and report per-slot rejection.
pub async fn apply_batch<S: SlotStore>(
    slots: &S,
    manager_id: &str,
    batch: AvailabilityBatch,
) -> Result<BatchOutcome, AvailabilityError> {
    for insert in &batch.inserts {
        if insert.end_time <= insert.start_time {
            return Err(AvailabilityError::Validation(format!(
                "slot ending {} does not start before it ends",
                insert.end_time
            )));
        }
        if insert.status == SlotStatus::Booked {
            return Err(AvailabilityError::Validation(
                "new grid slots cannot be created as booked".to_string(),
            ));
        }
    }

    let mut updated = Vec::new();
    let mut rejected = Vec::new();

    for update in batch.updates {
        let slot = slots
            .get_slot(&update.slot_id)
            .await
            .map_err(|e| AvailabilityError::Store(e.to_string()))?;

        let Some(slot) = slot else {
            debug!("Rejecting update of unknown slot {}", update.slot_id);
            rejected.push(update.slot_id);
            continue;
        };
        if slot.hiring_manager_id != manager_id {
            debug!(
                "Rejecting update of slot {} owned by another manager",
                update.slot_id
            );
            rejected.push(update.slot_id);
            continue;
        }
        if update.status == SlotStatus::Booked || !transition_allowed(slot.status, update.status) {
            debug!(
                "Rejecting forbidden transition {} -> {} on slot {}",
                slot.status, update.status, update.slot_id
            );
            rejected.push(update.slot_id);
            continue;
        }

        let won = slots
            .transition_status(&update.slot_id, slot.status, update.status)
            .await
            .map_err(|e| AvailabilityError::Store(e.to_string()))?;
        if won {
            updated.push(update.slot_id);
        } else {
            // Raced with a booking or another grid session.
            rejected.push(update.slot_id);
        }
    }

    let new_slots: Vec<NewSlot> = batch
        .inserts
        .into_iter()
        .map(|insert| NewSlot {
            template_id: insert.template_id,
            hiring_manager_id: manager_id.to_string(),
            start_time: insert.start_time,
            end_time: insert.end_time,
            status: insert.status,
            source: SlotSource::Override,
        })
        .collect();

    let inserted = if new_slots.is_empty() {
        Vec::new()
    } else {
        slots
            .insert_slots(new_slots)
            .await
            .map_err(|e| AvailabilityError::Store(e.to_string()))?
    };

    info!(
        "Applied availability batch for {}: {} updated, {} rejected, {} inserted",
        manager_id,
        updated.len(),
        rejected.len(),
        inserted.len()
    );

    Ok(BatchOutcome {
        updated,
        rejected,
        inserted,
    })
}
