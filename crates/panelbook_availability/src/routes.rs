use crate::handlers::{
    apply_batch_handler, get_manager_slots_handler, mark_provided_handler, AvailabilityState,
};
use axum::{
    routing::{get, post},
    Router,
};
use panelbook_config::AppConfig;
use panelbook_db::{SqlSlotRepository, SqlTemplateRepository};
use std::sync::Arc;

pub fn routes(
    config: Arc<AppConfig>,
    slots: Arc<SqlSlotRepository>,
    templates: Arc<SqlTemplateRepository>,
) -> Router {
    let availability_state = Arc::new(AvailabilityState {
        config,
        slots,
        templates,
    });

    Router::new()
        .route("/availability/slots", get(get_manager_slots_handler))
        .route("/availability/batch", post(apply_batch_handler))
        .route("/availability/provided", post(mark_provided_handler))
        .with_state(availability_state)
}
