//! Service abstractions for the persistence collaborators.
//!
//! These traits decouple the resolver and committer logic from the SQL
//! repositories so that logic can be exercised against in-memory stores in
//! tests. Implementations clone borrowed arguments into the returned future.

use crate::models::{
    Booking, BookingStatus, ManagerName, NewSlot, PanelRuleSet, Slot, SlotStatus, TemplateSummary,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// The Availability Store: owns slot rows and the conditional status
/// transition that serialises concurrent bookings.
pub trait SlotStore: Send + Sync {
    /// Error type returned by slot store operations.
    type Error: StdError + Send + Sync + 'static;

    /// Fetch a single slot by id.
    fn get_slot(&self, slot_id: &str) -> BoxFuture<'_, Option<Slot>, Self::Error>;

    /// All open slots for a template with start time >= `from_time`,
    /// ascending by start time. The sole read path of the panel resolver.
    fn list_open_slots(
        &self,
        template_id: &str,
        from_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<Slot>, Self::Error>;

    /// All slots belonging to one manager with start time >= `from_time`,
    /// any status; used to render the availability grid.
    fn list_manager_slots(
        &self,
        manager_id: &str,
        from_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<Slot>, Self::Error>;

    /// Insert new slots, returning them with assigned ids.
    fn insert_slots(&self, slots: Vec<NewSlot>) -> BoxFuture<'_, Vec<Slot>, Self::Error>;

    /// Compare-and-swap status transition: succeeds (returns true) only if
    /// the slot's current status still equals `expected`. This conditional
    /// write is the only mutation discipline for slot status.
    fn transition_status(
        &self,
        slot_id: &str,
        expected: SlotStatus,
        new_status: SlotStatus,
    ) -> BoxFuture<'_, bool, Self::Error>;
}

/// Fields applied to a booking row when a candidate confirms a window.
/// The recipient of a pending invite may correct their contact details here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmBooking {
    pub slot_id: String,
    pub additional_slot_ids: Vec<String>,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_phone: Option<String>,
    pub timezone: Option<String>,
}

/// Persistence operations on the Booking entity.
pub trait BookingStore: Send + Sync {
    /// Error type returned by booking store operations.
    type Error: StdError + Send + Sync + 'static;

    /// Look a booking up by its opaque link token.
    fn find_by_token(&self, token: &str) -> BoxFuture<'_, Option<Booking>, Self::Error>;

    /// Look a booking up by id.
    fn find_by_id(&self, booking_id: &str) -> BoxFuture<'_, Option<Booking>, Self::Error>;

    /// Insert a new booking row as given (used for public self-serve
    /// bookings, invites, and manual-override bookings).
    fn create(&self, booking: Booking) -> BoxFuture<'_, Booking, Self::Error>;

    /// Update an existing row in place with the confirmation fields and set
    /// its status to confirmed.
    fn confirm(
        &self,
        booking_id: &str,
        update: ConfirmBooking,
    ) -> BoxFuture<'_, Booking, Self::Error>;

    /// Set the booking status (withdraw, cancel, complete). Returns false
    /// when no such booking exists.
    fn set_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
    ) -> BoxFuture<'_, bool, Self::Error>;
}

/// Read-only access to templates, their panel rules and manager metadata.
pub trait TemplateStore: Send + Sync {
    /// Error type returned by template store operations.
    type Error: StdError + Send + Sync + 'static;

    /// Template summary for the booking page; None when unknown or inactive.
    fn template(&self, template_id: &str) -> BoxFuture<'_, Option<TemplateSummary>, Self::Error>;

    /// The panel rule set of a template (required headcount plus role
    /// assignments); None when the template is unknown.
    fn panel_rules(&self, template_id: &str)
        -> BoxFuture<'_, Option<PanelRuleSet>, Self::Error>;

    /// Display names for a set of managers; unknown ids are skipped.
    fn manager_names(
        &self,
        manager_ids: &[String],
    ) -> BoxFuture<'_, Vec<ManagerName>, Self::Error>;

    /// Mark every availability request of one manager as provided.
    /// Returns the number of rows updated.
    fn mark_availability_provided(&self, manager_id: &str) -> BoxFuture<'_, u64, Self::Error>;
}
