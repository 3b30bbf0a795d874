//! HTTP handlers for the candidate booking page and the recruiter booking
//! operations.

use crate::commit::{commit_booking, release_claims, validate_request, CommitError};
use crate::logic::{resolve_panel_windows, OfferedWindow, ResolveError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Duration, Utc};
use panelbook_common::models::{
    Booking, BookingStatus, NewSlot, Slot, SlotSource, SlotStatus, TemplateSummary,
};
use panelbook_common::services::{BookingStore, ConfirmBooking, SlotStore, TemplateStore};
use panelbook_common::{not_found, HttpStatusCode, PanelbookError};
use panelbook_config::AppConfig;
use panelbook_db::{SqlBookingRepository, SqlSlotRepository, SqlTemplateRepository};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Shared state for the booking handlers.
#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub slots: Arc<SqlSlotRepository>,
    pub bookings: Arc<SqlBookingRepository>,
    pub templates: Arc<SqlTemplateRepository>,
}

/// Payload rendered by the candidate booking page.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingPageResponse {
    pub template: TemplateSummary,
    /// Bookable composite windows, ascending by start time. Empty when no
    /// panel can currently be assembled; that is not an error.
    pub windows: Vec<OfferedWindow>,
    /// The booking the token points at, when it points at one.
    pub booking: Option<Booking>,
}

/// Body of the candidate confirmation request.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub slot_id: String,
    #[serde(default)]
    pub additional_slot_ids: Vec<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub timezone: Option<String>,
}

/// Recruiter request to create a pending invite for a candidate.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct InviteRequest {
    pub template_id: String,
    pub candidate_name: String,
    pub candidate_email: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct InviteResponse {
    pub booking_id: String,
    pub token: String,
    /// Full candidate-facing link when a base URL is configured.
    pub booking_url: Option<String>,
}

/// Recruiter manual-override booking: books the given managers at the given
/// time directly, without going through resolution.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct ManualBookingRequest {
    pub template_id: String,
    pub hiring_manager_ids: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_phone: Option<String>,
    pub timezone: Option<String>,
    pub meeting_link: Option<String>,
    pub meeting_platform: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawResponse {
    pub booking_id: String,
    pub status: BookingStatus,
}

fn commit_error_response(err: CommitError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(err.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

fn error_response(err: PanelbookError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(err.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

fn internal_error<E: std::fmt::Display>(context: &str) -> impl Fn(E) -> (StatusCode, String) + '_ {
    move |e| {
        error!("{}: {}", context, e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("{context}."))
    }
}

fn ensure_booking_enabled(config: &AppConfig) -> Result<(), (StatusCode, String)> {
    if !config.use_booking {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Booking service is disabled.".to_string(),
        ));
    }
    Ok(())
}

/// Earliest bookable instant: now plus the configured minimum notice.
fn booking_horizon(config: &AppConfig) -> DateTime<Utc> {
    let notice = config
        .booking
        .as_ref()
        .and_then(|b| b.min_notice_minutes)
        .unwrap_or(0);
    Utc::now() + Duration::minutes(notice)
}

/// Attach interviewer display names to the resolved windows.
async fn name_windows(
    templates: &SqlTemplateRepository,
    slots: &[Slot],
    windows: Vec<panelbook_common::models::CompositeWindow>,
) -> Result<Vec<OfferedWindow>, (StatusCode, String)> {
    let slot_managers: HashMap<&str, &str> = slots
        .iter()
        .map(|slot| (slot.id.as_str(), slot.hiring_manager_id.as_str()))
        .collect();

    let mut manager_ids: Vec<String> = slots
        .iter()
        .map(|slot| slot.hiring_manager_id.clone())
        .collect();
    manager_ids.sort();
    manager_ids.dedup();

    let names: HashMap<String, String> = templates
        .manager_names(&manager_ids)
        .await
        .map_err(internal_error("Failed to load interviewer names"))?
        .into_iter()
        .map(|m| (m.id, m.name))
        .collect();

    Ok(windows
        .into_iter()
        .map(|window| {
            let interviewer_names = std::iter::once(&window.slot_id)
                .chain(window.additional_slot_ids.iter())
                .filter_map(|slot_id| slot_managers.get(slot_id.as_str()))
                .filter_map(|manager_id| names.get(*manager_id).cloned())
                .collect();
            OfferedWindow {
                window,
                interviewer_names,
            }
        })
        .collect())
}

/// Handler for the candidate booking page.
///
/// The token resolves to a booking when one carries it (invite or earlier
/// submission); otherwise it is treated as a template id, which is how
/// shared template links work.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/booking/{token}",
    params(("token" = String, Path, description = "Booking link token or template id")),
    responses(
        (status = 200, description = "Template, bookable windows and any existing booking", body = BookingPageResponse),
        (status = 404, description = "Unknown token / inactive template"),
        (status = 500, description = "Panel rules are unsatisfiable or a store failed")
    ),
    tag = "Booking"
))]
pub async fn get_booking_page_handler(
    State(state): State<Arc<BookingState>>,
    Path(token): Path<String>,
) -> Result<Json<BookingPageResponse>, (StatusCode, String)> {
    ensure_booking_enabled(&state.config)?;

    let booking = state
        .bookings
        .find_by_token(&token)
        .await
        .map_err(internal_error("Failed to look up booking"))?;

    let template_id = booking
        .as_ref()
        .and_then(|b| b.template_id.clone())
        .unwrap_or_else(|| token.clone());

    let template = state
        .templates
        .template(&template_id)
        .await
        .map_err(internal_error("Failed to load template"))?
        .filter(|t| t.active)
        .ok_or_else(|| error_response(not_found("this booking link is not valid")))?;

    let rules = state
        .templates
        .panel_rules(&template_id)
        .await
        .map_err(internal_error("Failed to load panel rules"))?
        .ok_or_else(|| error_response(not_found("this booking link is not valid")))?;

    let open_slots = state
        .slots
        .list_open_slots(&template_id, booking_horizon(&state.config))
        .await
        .map_err(internal_error("Failed to load availability"))?;

    let windows = resolve_panel_windows(&open_slots, &rules).map_err(|e| {
        // A rule set no slot snapshot can satisfy is a setup problem on the
        // recruiter side; surface it as a server error, not as emptiness.
        error!("Panel resolution failed for template {}: {}", template_id, e);
        match e {
            ResolveError::InvalidRules(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "This interview is misconfigured. Please contact the recruiter.".to_string(),
            ),
        }
    })?;

    let windows = name_windows(&state.templates, &open_slots, windows).await?;

    Ok(Json(BookingPageResponse {
        template,
        windows,
        booking,
    }))
}

/// Handler for the candidate confirmation submit.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/booking/{token}/confirm",
    params(("token" = String, Path, description = "Booking link token or template id")),
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Booking confirmed", body = Booking),
        (status = 400, description = "Invalid candidate input"),
        (status = 404, description = "Unknown token"),
        (status = 409, description = "The selected window was taken; pick another"),
        (status = 500, description = "Persistence failure")
    ),
    tag = "Booking"
))]
pub async fn confirm_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path(token): Path<String>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<Booking>, (StatusCode, String)> {
    ensure_booking_enabled(&state.config)?;

    let confirm = ConfirmBooking {
        slot_id: request.slot_id,
        additional_slot_ids: request.additional_slot_ids,
        candidate_name: request.name,
        candidate_email: request.email,
        candidate_phone: request.phone,
        timezone: request.timezone,
    };
    // Reject unusable input before anything is written: a shared-template
    // submission must not leave a pending row behind on a 400.
    validate_request(&confirm).map_err(commit_error_response)?;

    let existing = state
        .bookings
        .find_by_token(&token)
        .await
        .map_err(internal_error("Failed to look up booking"))?;

    let (booking_id, created_here) = match existing {
        Some(booking) if booking.status == BookingStatus::Pending => (booking.id, false),
        Some(booking) => {
            return Err((
                StatusCode::CONFLICT,
                format!("This booking is already {}.", booking.status),
            ));
        }
        None => {
            // Shared template link: insert the pending row first so the
            // commit has a booking to confirm.
            let template = state
                .templates
                .template(&token)
                .await
                .map_err(internal_error("Failed to load template"))?
                .filter(|t| t.active)
                .ok_or_else(|| error_response(not_found("this booking link is not valid")))?;

            let booking = state
                .bookings
                .create(Booking {
                    id: Uuid::new_v4().to_string(),
                    template_id: Some(template.id),
                    candidate_name: confirm.candidate_name.clone(),
                    candidate_email: confirm.candidate_email.clone(),
                    candidate_phone: confirm.candidate_phone.clone(),
                    status: BookingStatus::Pending,
                    token: Uuid::new_v4().to_string(),
                    slot_id: None,
                    additional_slot_ids: Vec::new(),
                    timezone: confirm.timezone.clone(),
                    meeting_link: None,
                    meeting_platform: None,
                })
                .await
                .map_err(internal_error("Failed to create booking"))?;
            (booking.id, true)
        }
    };

    match commit_booking(
        state.slots.as_ref(),
        state.bookings.as_ref(),
        &booking_id,
        confirm,
    )
    .await
    {
        Ok(confirmed) => Ok(Json(confirmed)),
        Err(e) => {
            // A row inserted for this very submission must not survive a
            // failed commit as a live pending booking; each retry would
            // otherwise mint another one.
            if created_here {
                match state
                    .bookings
                    .set_status(&booking_id, BookingStatus::Cancelled)
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => warn!("Booking {} vanished before cleanup", booking_id),
                    Err(cleanup) => {
                        error!("Failed to cancel booking {}: {}", booking_id, cleanup)
                    }
                }
            }
            Err(commit_error_response(e))
        }
    }
}

/// Handler for recruiter-created pending invites.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/bookings/invite",
    request_body = InviteRequest,
    responses(
        (status = 200, description = "Pending invite created", body = InviteResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Unknown template")
    ),
    tag = "Booking"
))]
pub async fn create_invite_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<InviteRequest>,
) -> Result<Json<InviteResponse>, (StatusCode, String)> {
    ensure_booking_enabled(&state.config)?;

    if request.candidate_name.trim().is_empty() || request.candidate_email.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Candidate name and email are required.".to_string(),
        ));
    }

    let template = state
        .templates
        .template(&request.template_id)
        .await
        .map_err(internal_error("Failed to load template"))?
        .filter(|t| t.active)
        .ok_or_else(|| error_response(not_found("unknown template")))?;

    let token = Uuid::new_v4().to_string();
    let booking = state
        .bookings
        .create(Booking {
            id: Uuid::new_v4().to_string(),
            template_id: Some(template.id),
            candidate_name: request.candidate_name,
            candidate_email: request.candidate_email,
            candidate_phone: None,
            status: BookingStatus::Pending,
            token: token.clone(),
            slot_id: None,
            additional_slot_ids: Vec::new(),
            timezone: None,
            meeting_link: None,
            meeting_platform: None,
        })
        .await
        .map_err(internal_error("Failed to create invite"))?;

    let booking_url = state
        .config
        .booking
        .as_ref()
        .and_then(|b| b.link_base_url.as_ref())
        .map(|base| format!("{}/{}", base.trim_end_matches('/'), token));

    info!("Created pending invite {} for template {:?}", booking.id, booking.template_id);
    Ok(Json(InviteResponse {
        booking_id: booking.id,
        token,
        booking_url,
    }))
}

/// Handler for recruiter manual-override bookings. The slots are created
/// already booked (source = override), so no claim race is possible.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/bookings/manual",
    request_body = ManualBookingRequest,
    responses(
        (status = 200, description = "Booking created", body = Booking),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Unknown template")
    ),
    tag = "Booking"
))]
pub async fn manual_booking_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<ManualBookingRequest>,
) -> Result<Json<Booking>, (StatusCode, String)> {
    ensure_booking_enabled(&state.config)?;

    if request.hiring_manager_ids.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "At least one interviewer is required.".to_string(),
        ));
    }
    if request.end_time <= request.start_time {
        return Err((
            StatusCode::BAD_REQUEST,
            "end_time must be after start_time.".to_string(),
        ));
    }
    if request.candidate_name.trim().is_empty() || request.candidate_email.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Candidate name and email are required.".to_string(),
        ));
    }

    let template = state
        .templates
        .template(&request.template_id)
        .await
        .map_err(internal_error("Failed to load template"))?
        .ok_or_else(|| error_response(not_found("unknown template")))?;

    let new_slots: Vec<NewSlot> = request
        .hiring_manager_ids
        .iter()
        .map(|manager_id| NewSlot {
            template_id: Some(template.id.clone()),
            hiring_manager_id: manager_id.clone(),
            start_time: request.start_time,
            end_time: request.end_time,
            status: SlotStatus::Booked,
            source: SlotSource::Override,
        })
        .collect();

    let inserted = state
        .slots
        .insert_slots(new_slots)
        .await
        .map_err(internal_error("Failed to create override slots"))?;

    let slot_ids: Vec<String> = inserted.into_iter().map(|slot| slot.id).collect();
    let Some((primary, additional)) = slot_ids.split_first() else {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create override slots.".to_string(),
        ));
    };

    let created = state
        .bookings
        .create(Booking {
            id: Uuid::new_v4().to_string(),
            template_id: Some(template.id),
            candidate_name: request.candidate_name,
            candidate_email: request.candidate_email,
            candidate_phone: request.candidate_phone,
            status: BookingStatus::Confirmed,
            token: Uuid::new_v4().to_string(),
            slot_id: Some(primary.clone()),
            additional_slot_ids: additional.to_vec(),
            timezone: request.timezone,
            meeting_link: request.meeting_link,
            meeting_platform: request.meeting_platform,
        })
        .await;

    let booking = match created {
        Ok(booking) => booking,
        Err(e) => {
            // The override slots were born booked; free them again so a
            // failed booking insert does not strand them with no booking
            // referencing them.
            release_claims(state.slots.as_ref(), &slot_ids).await;
            return Err(internal_error("Failed to create booking")(e));
        }
    };

    info!("Created manual booking {}", booking.id);
    Ok(Json(booking))
}

/// Handler for withdrawing a booking. Slots stay booked; releasing them is
/// a separate recruiter decision.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/bookings/{id}/withdraw",
    params(("id" = String, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking withdrawn", body = WithdrawResponse),
        (status = 404, description = "Unknown booking")
    ),
    tag = "Booking"
))]
pub async fn withdraw_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<WithdrawResponse>, (StatusCode, String)> {
    ensure_booking_enabled(&state.config)?;

    let updated = state
        .bookings
        .set_status(&booking_id, BookingStatus::Withdrawn)
        .await
        .map_err(internal_error("Failed to withdraw booking"))?;

    if !updated {
        return Err(error_response(not_found("unknown booking")));
    }

    info!("Withdrew booking {}", booking_id);
    Ok(Json(WithdrawResponse {
        booking_id,
        status: BookingStatus::Withdrawn,
    }))
}
