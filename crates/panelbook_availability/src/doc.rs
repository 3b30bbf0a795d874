#![allow(dead_code)]
#![cfg(feature = "openapi")]

use crate::handlers::{
    BatchRequest, ManagerSlotsResponse, ProvidedRequest, ProvidedResponse,
};
use crate::logic::{AvailabilityBatch, BatchOutcome, SlotInsert, SlotUpdate};
use panelbook_common::models::{Slot, SlotSource, SlotStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_manager_slots_handler,
        crate::handlers::apply_batch_handler,
        crate::handlers::mark_provided_handler
    ),
    components(
        schemas(
            ManagerSlotsResponse,
            BatchRequest,
            AvailabilityBatch,
            SlotUpdate,
            SlotInsert,
            BatchOutcome,
            ProvidedRequest,
            ProvidedResponse,
            Slot,
            SlotStatus,
            SlotSource
        )
    ),
    tags(
        (name = "Availability", description = "Manager availability grid API")
    ),
    servers(
        (url = "/api", description = "Panelbook API server")
    )
)]
pub struct AvailabilityApiDoc;
