#[cfg(test)]
mod tests {
    use crate::logic::{resolve_panel_windows, ResolveError};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use panelbook_common::models::{PanelRuleSet, Slot, SlotSource, SlotStatus};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap()
    }

    fn slot(id: &str, manager: &str, hour: u32) -> Slot {
        Slot {
            id: id.to_string(),
            template_id: Some("tpl".to_string()),
            hiring_manager_id: manager.to_string(),
            start_time: at(hour),
            end_time: at(hour) + Duration::minutes(60),
            status: SlotStatus::Open,
            source: SlotSource::Calendar,
        }
    }

    fn rules(required: usize, mandatory: &[&str], at_least_one: &[&str]) -> PanelRuleSet {
        PanelRuleSet {
            required_count: required,
            mandatory: mandatory.iter().map(|s| s.to_string()).collect(),
            at_least_one: at_least_one.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn emits_window_when_group_satisfies_rules() {
        let slots = vec![slot("s1", "alice", 9), slot("s2", "bob", 9)];
        let windows = resolve_panel_windows(&slots, &rules(2, &["alice"], &[])).unwrap();

        assert_eq!(windows.len(), 1);
        let window = &windows[0];
        assert_eq!(window.start_time, at(9));
        assert_eq!(window.end_time, at(9) + Duration::minutes(60));
        // alice is mandatory so her slot sorts first and becomes primary
        assert_eq!(window.slot_id, "s1");
        assert_eq!(window.additional_slot_ids, vec!["s2"]);
    }

    #[test]
    fn rejects_group_missing_a_mandatory_manager() {
        let slots = vec![
            slot("s1", "bob", 9),
            slot("s2", "carol", 9),
            // 10:00 has alice, so only this group qualifies
            slot("s3", "alice", 10),
            slot("s4", "bob", 10),
        ];
        let windows = resolve_panel_windows(&slots, &rules(2, &["alice"], &[])).unwrap();

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start_time, at(10));
    }

    #[test]
    fn rejects_group_below_required_headcount() {
        let slots = vec![slot("s1", "alice", 9)];
        let windows = resolve_panel_windows(&slots, &rules(2, &[], &[])).unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn truncates_to_required_count_by_priority() {
        // Four managers available; only two seats. Mandatory beats
        // at-least-one beats optional, regardless of input order.
        let slots = vec![
            slot("s1", "opt1", 9),
            slot("s2", "alo1", 9),
            slot("s3", "mand1", 9),
            slot("s4", "opt2", 9),
        ];
        let windows = resolve_panel_windows(&slots, &rules(2, &["mand1"], &["alo1"])).unwrap();

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].slot_id, "s3");
        assert_eq!(windows[0].additional_slot_ids, vec!["s2"]);
    }

    #[test]
    fn truncation_seats_at_least_one_managers_before_optional_ones() {
        // Three seats, four managers at 9:00: the mandatory manager and both
        // at-least-one managers are seated, the optional manager is the one
        // truncation drops.
        let slots = vec![
            slot("s1", "mand1", 9),
            slot("s2", "alo1", 9),
            slot("s3", "alo2", 9),
            slot("s4", "opt1", 9),
        ];
        let windows =
            resolve_panel_windows(&slots, &rules(3, &["mand1"], &["alo1", "alo2"])).unwrap();

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].slot_id, "s1");
        assert_eq!(
            windows[0].additional_slot_ids,
            vec!["s2".to_string(), "s3".to_string()]
        );
    }

    #[test]
    fn rejects_group_without_any_at_least_one_manager() {
        let slots = vec![
            slot("s1", "opt1", 9),
            slot("s2", "opt2", 9),
            slot("s3", "alo1", 10),
            slot("s4", "opt1", 10),
        ];
        let windows = resolve_panel_windows(&slots, &rules(2, &[], &["alo1", "alo2"])).unwrap();

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start_time, at(10));
        assert_eq!(windows[0].slot_id, "s3");
    }

    #[test]
    fn headcount_only_rules_accept_any_large_enough_group() {
        let slots = vec![
            slot("s1", "a", 9),
            slot("s2", "b", 9),
            slot("s3", "c", 10),
        ];
        let windows = resolve_panel_windows(&slots, &rules(1, &[], &[])).unwrap();
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn duplicate_manager_slots_count_toward_headcount() {
        // Headcount is per slot, so bob's two 9:00 slots fill a two-seat
        // panel; role checks still see a single manager.
        let slots = vec![slot("s1", "bob", 9), slot("s2", "bob", 9)];

        let windows = resolve_panel_windows(&slots, &rules(2, &[], &[])).unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].slot_id, "s1");
        assert_eq!(windows[0].additional_slot_ids, vec!["s2".to_string()]);

        let none = resolve_panel_windows(&slots, &rules(2, &["bob", "carol"], &[])).unwrap();
        assert!(none.is_empty(), "mandatory carol is absent");
    }

    #[test]
    fn empty_input_resolves_to_no_windows() {
        let windows = resolve_panel_windows(&[], &rules(2, &["alice"], &[])).unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn windows_ascend_by_start_time() {
        let slots = vec![
            slot("s1", "a", 14),
            slot("s2", "a", 9),
            slot("s3", "a", 11),
        ];
        let windows = resolve_panel_windows(&slots, &rules(1, &[], &[])).unwrap();
        let starts: Vec<_> = windows.iter().map(|w| w.start_time).collect();
        assert_eq!(starts, vec![at(9), at(11), at(14)]);
    }

    #[test]
    fn resolution_is_idempotent() {
        let slots = vec![
            slot("s1", "alice", 9),
            slot("s2", "bob", 9),
            slot("s3", "carol", 9),
            slot("s4", "alice", 11),
            slot("s5", "bob", 11),
        ];
        let r = rules(2, &["alice"], &["bob", "carol"]);
        let first = resolve_panel_windows(&slots, &r).unwrap();
        let second = resolve_panel_windows(&slots, &r).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_required_count_is_a_configuration_error() {
        let result = resolve_panel_windows(&[slot("s1", "a", 9)], &rules(0, &[], &[]));
        assert!(matches!(result, Err(ResolveError::InvalidRules(_))));
    }

    #[test]
    fn more_mandatory_than_seats_is_a_configuration_error() {
        let result = resolve_panel_windows(
            &[slot("s1", "a", 9)],
            &rules(1, &["a", "b"], &[]),
        );
        assert!(matches!(result, Err(ResolveError::InvalidRules(_))));
    }
}
