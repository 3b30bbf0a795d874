//! Booking commitment: atomically turning a resolved window into a
//! confirmed booking.
//!
//! The serialization point is the slot store's conditional status
//! transition: claiming a slot means winning its open->booked compare-and-
//! swap, so at most one concurrent commit can succeed per slot id. Every
//! failure after a partial claim releases the claimed slots again, making
//! the commit all-or-nothing.

use chrono_tz::Tz;
use panelbook_common::models::{Booking, SlotStatus};
use panelbook_common::services::{BookingStore, ConfirmBooking, SlotStore};
use panelbook_common::HttpStatusCode;
use std::str::FromStr;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors from booking commitment.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The candidate's input is unusable; nothing was written.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A slot in the selected window was claimed by someone else (or
    /// blocked) between resolution and commit. The window is stale and the
    /// candidate must pick again; any partially claimed slots were released.
    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),

    /// The underlying store failed.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl HttpStatusCode for CommitError {
    fn status_code(&self) -> u16 {
        match self {
            CommitError::Validation(_) => 400,
            CommitError::SlotUnavailable(_) => 409,
            CommitError::Persistence(_) => 500,
        }
    }
}

pub(crate) fn validate_request(request: &ConfirmBooking) -> Result<(), CommitError> {
    if request.candidate_name.trim().is_empty() {
        return Err(CommitError::Validation(
            "candidate name must not be empty".to_string(),
        ));
    }
    if request.candidate_email.trim().is_empty() || !request.candidate_email.contains('@') {
        return Err(CommitError::Validation(
            "candidate email is missing or malformed".to_string(),
        ));
    }
    if request.slot_id.is_empty() {
        return Err(CommitError::Validation(
            "a slot must be selected".to_string(),
        ));
    }
    if request
        .additional_slot_ids
        .iter()
        .any(|id| *id == request.slot_id)
    {
        return Err(CommitError::Validation(
            "additional slots must not repeat the primary slot".to_string(),
        ));
    }
    if let Some(tz) = request.timezone.as_deref() {
        Tz::from_str(tz).map_err(|_| {
            CommitError::Validation(format!("unknown timezone: {tz}"))
        })?;
    }
    Ok(())
}

/// Release claimed slots after a failed commit. Best effort: a slot that
/// cannot be released is logged and left for manual cleanup rather than
/// masking the original failure.
pub(crate) async fn release_claims<S: SlotStore>(slots: &S, claimed: &[String]) {
    for slot_id in claimed {
        match slots
            .transition_status(slot_id, SlotStatus::Booked, SlotStatus::Open)
            .await
        {
            Ok(true) => {}
            Ok(false) => warn!("Slot {} was not booked during release", slot_id),
            Err(e) => error!("Failed to release claimed slot {}: {}", slot_id, e),
        }
    }
}

/// Commit a candidate's selected window against the booking identified by
/// `booking_id` (a pending invite, or a freshly inserted pending row for a
/// public submission).
///
/// Claims the primary slot first, then the additional slots, each through
/// the open->booked transition; only after every claim succeeds is the
/// booking row confirmed. Returns the confirmed booking.
pub async fn commit_booking<S, B>(
    slots: &S,
    bookings: &B,
    booking_id: &str,
    request: ConfirmBooking,
) -> Result<Booking, CommitError>
where
    S: SlotStore,
    B: BookingStore,
{
    validate_request(&request)?;

    let mut claimed: Vec<String> = Vec::with_capacity(1 + request.additional_slot_ids.len());

    let won = slots
        .transition_status(&request.slot_id, SlotStatus::Open, SlotStatus::Booked)
        .await
        .map_err(|e| CommitError::Persistence(e.to_string()))?;
    if !won {
        info!(
            "Commit for booking {} lost the primary slot {}",
            booking_id, request.slot_id
        );
        return Err(CommitError::SlotUnavailable(format!(
            "slot {} is no longer available",
            request.slot_id
        )));
    }
    claimed.push(request.slot_id.clone());

    for slot_id in &request.additional_slot_ids {
        let won = match slots
            .transition_status(slot_id, SlotStatus::Open, SlotStatus::Booked)
            .await
        {
            Ok(won) => won,
            Err(e) => {
                release_claims(slots, &claimed).await;
                return Err(CommitError::Persistence(e.to_string()));
            }
        };
        if !won {
            info!(
                "Commit for booking {} lost additional slot {}; releasing {} claimed slots",
                booking_id,
                slot_id,
                claimed.len()
            );
            release_claims(slots, &claimed).await;
            return Err(CommitError::SlotUnavailable(format!(
                "slot {slot_id} is no longer available"
            )));
        }
        claimed.push(slot_id.clone());
    }

    match bookings.confirm(booking_id, request).await {
        Ok(booking) => {
            info!(
                "Booking {} confirmed with {} slots",
                booking.id,
                claimed.len()
            );
            Ok(booking)
        }
        Err(e) => {
            error!(
                "Failed to persist confirmation of booking {}: {}; releasing claims",
                booking_id, e
            );
            release_claims(slots, &claimed).await;
            Err(CommitError::Persistence(e.to_string()))
        }
    }
}
