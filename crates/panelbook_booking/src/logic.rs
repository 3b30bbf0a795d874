//! Panel resolution: turning raw open slots into bookable composite windows.
//!
//! A composite window is a set of individually-owned slots that share one
//! start time and together satisfy a template's panel rules. Resolution is a
//! pure function over a snapshot of open slots; it never writes anything, so
//! a window it emits is an offer that the committer re-validates.

use chrono::{DateTime, Utc};
use panelbook_common::models::{CompositeWindow, ManagerRole, PanelRuleSet, Slot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Errors from panel resolution. Data-driven emptiness is not an error:
/// an empty slot snapshot resolves to an empty window list.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The template's panel rules cannot be satisfied by any slot set.
    /// This is a recruiter setup problem, not a candidate-facing condition.
    #[error("Invalid panel rules: {0}")]
    InvalidRules(String),
}

/// Resolve the open-slot snapshot of one template into the composite windows
/// a candidate may book.
///
/// Slots are grouped by exact start time. A group becomes a window when it
/// holds at least `required_count` slots, every mandatory manager is present,
/// and (when the at-least-one set is non-empty) at least one of its members
/// is present. Within a qualifying group, slots are kept in
/// priority order (mandatory, then at-least-one, then optional) and truncated
/// to `required_count`; the first selected slot becomes the primary.
///
/// The output is ascending by start time and deterministic for a given
/// snapshot, so resolving twice yields identical windows.
pub fn resolve_panel_windows(
    open_slots: &[Slot],
    rules: &PanelRuleSet,
) -> Result<Vec<CompositeWindow>, ResolveError> {
    if rules.required_count == 0 {
        return Err(ResolveError::InvalidRules(
            "required interviewer count must be at least 1".to_string(),
        ));
    }
    if rules.required_count < rules.mandatory.len() {
        return Err(ResolveError::InvalidRules(format!(
            "required interviewer count {} is below the {} mandatory interviewers",
            rules.required_count,
            rules.mandatory.len()
        )));
    }

    // BTreeMap keys keep the windows ascending by start time.
    let mut groups: BTreeMap<DateTime<Utc>, Vec<&Slot>> = BTreeMap::new();
    for slot in open_slots {
        groups.entry(slot.start_time).or_default().push(slot);
    }

    let mut windows = Vec::new();
    for (start_time, group) in groups {
        // Headcount counts slots; the role checks below are judged on the
        // distinct managers present.
        if group.len() < rules.required_count {
            debug!(
                "Window {} rejected: {} slots present, {} required",
                start_time,
                group.len(),
                rules.required_count
            );
            continue;
        }

        let present: HashSet<&str> = group
            .iter()
            .map(|slot| slot.hiring_manager_id.as_str())
            .collect();
        if !rules
            .mandatory
            .iter()
            .all(|id| present.contains(id.as_str()))
        {
            debug!("Window {} rejected: mandatory interviewer absent", start_time);
            continue;
        }
        if !rules.at_least_one.is_empty()
            && !rules
                .at_least_one
                .iter()
                .any(|id| present.contains(id.as_str()))
        {
            debug!(
                "Window {} rejected: no interviewer from the at-least-one group",
                start_time
            );
            continue;
        }

        // Stable sort keeps the store's ordering within equal priorities,
        // then the group is truncated to the required headcount.
        let mut selected = group;
        selected.sort_by_key(|slot| match rules.role_of(&slot.hiring_manager_id) {
            ManagerRole::Mandatory => 0u8,
            ManagerRole::AtLeastOne => 1,
            ManagerRole::Optional => 2,
        });
        selected.truncate(rules.required_count);

        let primary = selected[0];
        windows.push(CompositeWindow {
            slot_id: primary.id.clone(),
            additional_slot_ids: selected[1..].iter().map(|slot| slot.id.clone()).collect(),
            start_time,
            end_time: primary.end_time,
        });
    }

    debug!(
        "Resolved {} windows from {} open slots",
        windows.len(),
        open_slots.len()
    );
    Ok(windows)
}

/// A composite window enriched with the display names of its interviewers,
/// as rendered on the candidate booking page.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferedWindow {
    #[serde(flatten)]
    pub window: CompositeWindow,
    /// Display names of the managers owning the window's slots.
    pub interviewer_names: Vec<String>,
}
