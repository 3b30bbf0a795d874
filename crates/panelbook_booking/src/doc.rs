#![allow(dead_code)]
#![cfg(feature = "openapi")]

use crate::handlers::{
    BookingPageResponse, ConfirmRequest, InviteRequest, InviteResponse, ManualBookingRequest,
    WithdrawResponse,
};
use crate::logic::OfferedWindow;
use panelbook_common::models::{Booking, BookingStatus, CompositeWindow, TemplateSummary};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_booking_page_handler,
        crate::handlers::confirm_booking_handler,
        crate::handlers::create_invite_handler,
        crate::handlers::manual_booking_handler,
        crate::handlers::withdraw_booking_handler
    ),
    components(
        schemas(
            BookingPageResponse,
            ConfirmRequest,
            InviteRequest,
            InviteResponse,
            ManualBookingRequest,
            WithdrawResponse,
            Booking,
            BookingStatus,
            CompositeWindow,
            OfferedWindow,
            TemplateSummary
        )
    ),
    tags(
        (name = "Booking", description = "Candidate booking and recruiter booking management")
    ),
    servers(
        (url = "/api", description = "Panelbook API server")
    )
)]
pub struct BookingApiDoc;
