//! HTTP handlers for the manager availability grid.

use crate::logic::{apply_batch, AvailabilityBatch, AvailabilityError, BatchOutcome};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use panelbook_common::models::Slot;
use panelbook_common::services::{SlotStore, TemplateStore};
use panelbook_common::{validation_error, HttpStatusCode};
use panelbook_config::AppConfig;
use panelbook_db::{SqlSlotRepository, SqlTemplateRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Shared state for the availability handlers.
#[derive(Clone)]
pub struct AvailabilityState {
    pub config: Arc<AppConfig>,
    pub slots: Arc<SqlSlotRepository>,
    pub templates: Arc<SqlTemplateRepository>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Deserialize)]
pub struct ManagerSlotsQuery {
    pub manager_id: String,
    /// Lower bound on slot start times; defaults to now.
    pub from: Option<DateTime<Utc>>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct ManagerSlotsResponse {
    pub slots: Vec<Slot>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchRequest {
    pub manager_id: String,
    #[serde(flatten)]
    pub batch: AvailabilityBatch,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct ProvidedRequest {
    pub manager_id: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct ProvidedResponse {
    /// Number of availability requests flipped to provided.
    pub updated: u64,
}

fn ensure_availability_enabled(config: &AppConfig) -> Result<(), (StatusCode, String)> {
    if !config.use_availability {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Availability service is disabled.".to_string(),
        ));
    }
    Ok(())
}

/// Handler returning a manager's slots for grid rendering.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability/slots",
    params(ManagerSlotsQuery),
    responses(
        (status = 200, description = "The manager's slots, ascending by start time", body = ManagerSlotsResponse),
        (status = 500, description = "Store failure")
    ),
    tag = "Availability"
))]
pub async fn get_manager_slots_handler(
    State(state): State<Arc<AvailabilityState>>,
    Query(query): Query<ManagerSlotsQuery>,
) -> Result<Json<ManagerSlotsResponse>, (StatusCode, String)> {
    ensure_availability_enabled(&state.config)?;

    let from = query.from.unwrap_or_else(Utc::now);
    let slots = state
        .slots
        .list_manager_slots(&query.manager_id, from)
        .await
        .map_err(|e| {
            error!("Failed to load slots for {}: {}", query.manager_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load availability.".to_string(),
            )
        })?;

    Ok(Json(ManagerSlotsResponse { slots }))
}

/// Handler applying a manager's batch of grid mutations.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/availability/batch",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "Batch outcome with per-slot rejections", body = BatchOutcome),
        (status = 400, description = "Malformed batch; nothing applied"),
        (status = 500, description = "Store failure")
    ),
    tag = "Availability"
))]
pub async fn apply_batch_handler(
    State(state): State<Arc<AvailabilityState>>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchOutcome>, (StatusCode, String)> {
    ensure_availability_enabled(&state.config)?;

    if request.manager_id.trim().is_empty() {
        let err = validation_error("manager_id is required");
        return Err((
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST),
            err.to_string(),
        ));
    }

    let outcome = apply_batch(state.slots.as_ref(), &request.manager_id, request.batch)
        .await
        .map_err(|e| match e {
            AvailabilityError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AvailabilityError::Store(msg) => {
                error!("Availability batch failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to apply availability changes.".to_string(),
                )
            }
        })?;

    Ok(Json(outcome))
}

/// Handler marking all of a manager's availability requests as provided.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/availability/provided",
    request_body = ProvidedRequest,
    responses(
        (status = 200, description = "Requests marked provided", body = ProvidedResponse),
        (status = 500, description = "Store failure")
    ),
    tag = "Availability"
))]
pub async fn mark_provided_handler(
    State(state): State<Arc<AvailabilityState>>,
    Json(request): Json<ProvidedRequest>,
) -> Result<Json<ProvidedResponse>, (StatusCode, String)> {
    ensure_availability_enabled(&state.config)?;

    let updated = state
        .templates
        .mark_availability_provided(&request.manager_id)
        .await
        .map_err(|e| {
            error!(
                "Failed to mark availability provided for {}: {}",
                request.manager_id, e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update availability requests.".to_string(),
            )
        })?;

    info!(
        "Marked {} availability requests provided for {}",
        updated, request.manager_id
    );
    Ok(Json(ProvidedResponse { updated }))
}
