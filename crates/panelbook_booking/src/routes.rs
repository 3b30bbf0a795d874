use crate::handlers::{
    confirm_booking_handler, create_invite_handler, get_booking_page_handler,
    manual_booking_handler, withdraw_booking_handler, BookingState,
};
use axum::{
    routing::{get, patch, post},
    Router,
};
use panelbook_config::AppConfig;
use panelbook_db::{SqlBookingRepository, SqlSlotRepository, SqlTemplateRepository};
use std::sync::Arc;

pub fn routes(
    config: Arc<AppConfig>,
    slots: Arc<SqlSlotRepository>,
    bookings: Arc<SqlBookingRepository>,
    templates: Arc<SqlTemplateRepository>,
) -> Router {
    let booking_state = Arc::new(BookingState {
        config,
        slots,
        bookings,
        templates,
    });

    Router::new()
        .route("/booking/{token}", get(get_booking_page_handler))
        .route("/booking/{token}/confirm", post(confirm_booking_handler))
        .route("/bookings/invite", post(create_invite_handler))
        .route("/bookings/manual", post(manual_booking_handler))
        .route("/bookings/{id}/withdraw", patch(withdraw_booking_handler))
        .with_state(booking_state)
}
