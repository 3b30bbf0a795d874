#[cfg(test)]
mod proptests {
    use crate::logic::resolve_panel_windows;
    use chrono::{Duration, TimeZone, Utc};
    use panelbook_common::models::{PanelRuleSet, Slot, SlotSource, SlotStatus};
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// Rule sets that are structurally valid: at least one seat and never
    /// fewer seats than mandatory interviewers.
    fn rules_strategy() -> impl Strategy<Value = PanelRuleSet> {
        (0usize..=2, 0usize..=2)
            .prop_flat_map(|(mandatory_count, alo_count)| {
                (
                    Just(mandatory_count),
                    Just(alo_count),
                    mandatory_count.max(1)..=4usize,
                )
            })
            .prop_map(|(mandatory_count, alo_count, required)| PanelRuleSet {
                required_count: required,
                mandatory: (0..mandatory_count).map(|i| format!("m{i}")).collect(),
                at_least_one: (mandatory_count..mandatory_count + alo_count)
                    .map(|i| format!("m{i}"))
                    .collect(),
            })
    }

    /// Open slots over eight managers and a day of hourly start times, at
    /// most one slot per manager per start time.
    fn slots_strategy() -> impl Strategy<Value = Vec<Slot>> {
        prop::collection::vec((0usize..8, 0u32..24), 0..48).prop_map(|pairs| {
            let mut seen = HashSet::new();
            pairs
                .into_iter()
                .filter(|pair| seen.insert(*pair))
                .enumerate()
                .map(|(i, (manager, hour))| {
                    let start = Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap();
                    Slot {
                        id: format!("s{i}"),
                        template_id: Some("tpl".to_string()),
                        hiring_manager_id: format!("m{manager}"),
                        start_time: start,
                        end_time: start + Duration::minutes(60),
                        status: SlotStatus::Open,
                        source: SlotSource::Calendar,
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn windows_hold_exactly_required_count_distinct_input_slots(
            slots in slots_strategy(),
            rules in rules_strategy(),
        ) {
            let windows = resolve_panel_windows(&slots, &rules).unwrap();
            for window in &windows {
                let mut ids: Vec<&str> = std::iter::once(window.slot_id.as_str())
                    .chain(window.additional_slot_ids.iter().map(String::as_str))
                    .collect();
                prop_assert_eq!(ids.len(), rules.required_count);

                let unique: HashSet<&str> = ids.drain(..).collect();
                prop_assert_eq!(unique.len(), rules.required_count);

                for id in unique {
                    let slot = slots.iter().find(|s| s.id == id);
                    prop_assert!(slot.is_some());
                    prop_assert_eq!(slot.unwrap().start_time, window.start_time);
                }
            }
        }

        #[test]
        fn windows_contain_every_mandatory_manager(
            slots in slots_strategy(),
            rules in rules_strategy(),
        ) {
            let windows = resolve_panel_windows(&slots, &rules).unwrap();
            for window in &windows {
                let selected_managers: HashSet<&str> = std::iter::once(&window.slot_id)
                    .chain(window.additional_slot_ids.iter())
                    .filter_map(|id| slots.iter().find(|s| &s.id == id))
                    .map(|s| s.hiring_manager_id.as_str())
                    .collect();
                for mandatory in &rules.mandatory {
                    prop_assert!(selected_managers.contains(mandatory.as_str()));
                }
            }
        }

        #[test]
        fn windows_only_form_where_an_at_least_one_manager_was_available(
            slots in slots_strategy(),
            rules in rules_strategy(),
        ) {
            let windows = resolve_panel_windows(&slots, &rules).unwrap();
            if rules.at_least_one.is_empty() {
                return Ok(());
            }
            for window in &windows {
                let group_managers: HashSet<&str> = slots
                    .iter()
                    .filter(|s| s.start_time == window.start_time)
                    .map(|s| s.hiring_manager_id.as_str())
                    .collect();
                prop_assert!(rules
                    .at_least_one
                    .iter()
                    .any(|id| group_managers.contains(id.as_str())));
            }
        }

        #[test]
        fn windows_ascend_strictly_by_start_time(
            slots in slots_strategy(),
            rules in rules_strategy(),
        ) {
            let windows = resolve_panel_windows(&slots, &rules).unwrap();
            for pair in windows.windows(2) {
                prop_assert!(pair[0].start_time < pair[1].start_time);
            }
        }

        #[test]
        fn resolution_is_deterministic(
            slots in slots_strategy(),
            rules in rules_strategy(),
        ) {
            let first = resolve_panel_windows(&slots, &rules).unwrap();
            let second = resolve_panel_windows(&slots, &rules).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
