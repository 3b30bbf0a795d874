//! Domain models shared across the Panelbook crates.
//!
//! Status enums carry `as_str`/`FromStr` conversions because slot and
//! booking rows are stored with TEXT status columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a single interviewer time slot.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Open,
    Booked,
    Blocked,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Open => "open",
            SlotStatus::Booked => "booked",
            SlotStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(SlotStatus::Open),
            "booked" => Ok(SlotStatus::Booked),
            "blocked" => Ok(SlotStatus::Blocked),
            other => Err(format!("unknown slot status: {other}")),
        }
    }
}

/// Where a slot came from: synced from the manager's calendar, or a
/// manual grid/recruiter override.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSource {
    Calendar,
    Override,
}

impl SlotSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotSource::Calendar => "calendar",
            SlotSource::Override => "override",
        }
    }
}

impl FromStr for SlotSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calendar" => Ok(SlotSource::Calendar),
            "override" => Ok(SlotSource::Override),
            other => Err(format!("unknown slot source: {other}")),
        }
    }
}

/// One hiring manager's bookable time window.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    /// Slots may be manager-wide (None) or scoped to a template.
    pub template_id: Option<String>,
    pub hiring_manager_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: SlotStatus,
    pub source: SlotSource,
}

/// Payload for inserting a slot; the store assigns the id.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSlot {
    pub template_id: Option<String>,
    pub hiring_manager_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: SlotStatus,
    pub source: SlotSource,
}

/// Lifecycle state of a candidate booking.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Withdrawn,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Withdrawn => "withdrawn",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "withdrawn" => Ok(BookingStatus::Withdrawn),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// A candidate's interview request or confirmed appointment.
///
/// Invariant: status == Confirmed implies `slot_id` is set and every
/// referenced slot is `booked`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub template_id: Option<String>,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_phone: Option<String>,
    pub status: BookingStatus,
    /// Opaque link identifier used in the candidate-facing booking URL.
    pub token: String,
    /// Primary slot; None while the booking is a pending invite.
    pub slot_id: Option<String>,
    /// Linked secondary slots booked alongside the primary.
    #[serde(default)]
    pub additional_slot_ids: Vec<String>,
    pub timezone: Option<String>,
    pub meeting_link: Option<String>,
    pub meeting_platform: Option<String>,
}

/// Panel-membership role a manager holds for one template.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerRole {
    Mandatory,
    AtLeastOne,
    Optional,
}

impl ManagerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManagerRole::Mandatory => "mandatory",
            ManagerRole::AtLeastOne => "at_least_one",
            ManagerRole::Optional => "optional",
        }
    }
}

impl FromStr for ManagerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mandatory" => Ok(ManagerRole::Mandatory),
            "at_least_one" => Ok(ManagerRole::AtLeastOne),
            "optional" => Ok(ManagerRole::Optional),
            other => Err(format!("unknown manager role: {other}")),
        }
    }
}

/// Per-template interviewer composition rules.
///
/// Mandatory and at-least-one sets are disjoint by construction: a manager
/// holds exactly one role per template. Managers with the Optional role are
/// implicit and not listed here.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelRuleSet {
    /// Total interviewer headcount a composite window must contain.
    pub required_count: usize,
    /// Managers who must ALL be present.
    pub mandatory: Vec<String>,
    /// Managers of whom at least one must be present (when non-empty).
    pub at_least_one: Vec<String>,
}

impl PanelRuleSet {
    /// Builds a rule set from the (manager id, role) assignments of a template.
    pub fn from_assignments(
        required_count: usize,
        assignments: &[(String, ManagerRole)],
    ) -> Self {
        let mandatory = assignments
            .iter()
            .filter(|(_, role)| *role == ManagerRole::Mandatory)
            .map(|(id, _)| id.clone())
            .collect();
        let at_least_one = assignments
            .iter()
            .filter(|(_, role)| *role == ManagerRole::AtLeastOne)
            .map(|(id, _)| id.clone())
            .collect();
        PanelRuleSet {
            required_count,
            mandatory,
            at_least_one,
        }
    }

    pub fn role_of(&self, manager_id: &str) -> ManagerRole {
        if self.mandatory.iter().any(|id| id == manager_id) {
            ManagerRole::Mandatory
        } else if self.at_least_one.iter().any(|id| id == manager_id) {
            ManagerRole::AtLeastOne
        } else {
            ManagerRole::Optional
        }
    }
}

/// A derived, not-yet-committed candidate time offer spanning one primary
/// slot plus the linked secondary slots that complete the panel.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeWindow {
    /// Primary slot id; the booking row links to this one.
    pub slot_id: String,
    pub additional_slot_ids: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Recruiter-defined interview configuration, as exposed to the booking page.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub interview_length_minutes: i64,
    pub location_type: String,
    pub online_link: Option<String>,
    pub in_person_location: Option<String>,
    pub candidate_briefing_text: Option<String>,
    pub required_interviewers_count: i64,
    pub active: bool,
}

/// Display metadata for a hiring manager.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerName {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [SlotStatus::Open, SlotStatus::Booked, SlotStatus::Blocked] {
            assert_eq!(status.as_str().parse::<SlotStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<SlotStatus>().is_err());
    }

    #[test]
    fn rule_set_splits_assignments_by_role() {
        let assignments = vec![
            ("m1".to_string(), ManagerRole::Mandatory),
            ("m2".to_string(), ManagerRole::AtLeastOne),
            ("m3".to_string(), ManagerRole::Optional),
            ("m4".to_string(), ManagerRole::Mandatory),
        ];
        let rules = PanelRuleSet::from_assignments(3, &assignments);
        assert_eq!(rules.mandatory, vec!["m1", "m4"]);
        assert_eq!(rules.at_least_one, vec!["m2"]);
        assert_eq!(rules.role_of("m3"), ManagerRole::Optional);
        assert_eq!(rules.role_of("unknown"), ManagerRole::Optional);
    }
}
