//! Tests for slot computation against rules and the booking ledger snapshot.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use bookline_engine::conflict::BusyInterval;
use bookline_engine::rules::RuleWindow;
use bookline_engine::slots::compute_slots;
use bookline_engine::EngineError;

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn rule(day: u8, start: (u32, u32), end: (u32, u32)) -> RuleWindow {
    RuleWindow {
        day_of_week: day,
        start: hm(start.0, start.1),
        end: hm(end.0, end.1),
    }
}

fn utc() -> Tz {
    "UTC".parse().unwrap()
}

#[test]
fn monday_rule_with_one_booking_excludes_that_slot() {
    // Rule Mon 09:00-17:00, duration 30, one confirmed booking 10:00-10:30.
    // Expected: 09:00, 09:30, 10:30, 11:00, ..., 16:30, 15 slots, 10:00 gone.
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(); // a Monday
    let rules = vec![rule(1, (9, 0), (17, 0))];
    let busy = vec![BusyInterval {
        start: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap(),
    }];

    let slots = compute_slots(date, utc(), 30, &rules, &busy).unwrap();

    assert_eq!(slots.len(), 15);
    assert_eq!(slots[0].local_start, hm(9, 0));
    assert_eq!(slots[1].local_start, hm(9, 30));
    assert_eq!(slots[2].local_start, hm(10, 30));
    assert_eq!(slots.last().unwrap().local_start, hm(16, 30));
    assert!(slots.iter().all(|s| s.local_start != hm(10, 0)));
}

#[test]
fn day_without_rules_yields_empty_not_error() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(); // a Sunday
    let rules = vec![rule(1, (9, 0), (17, 0))]; // Monday only

    let slots = compute_slots(date, utc(), 30, &rules, &[]).unwrap();

    assert!(slots.is_empty());
}

#[test]
fn window_shorter_than_duration_yields_no_candidates() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let rules = vec![rule(1, (9, 0), (9, 20))];

    let slots = compute_slots(date, utc(), 30, &rules, &[]).unwrap();

    assert!(slots.is_empty());
}

#[test]
fn window_exactly_one_duration_yields_one_candidate() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let rules = vec![rule(1, (9, 0), (9, 30))];

    let slots = compute_slots(date, utc(), 30, &rules, &[]).unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].local_start, hm(9, 0));
}

#[test]
fn adjacent_booking_does_not_block_slot() {
    // Booking 09:30-10:00 must not block the 09:00 or 10:00 candidates.
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let rules = vec![rule(1, (9, 0), (11, 0))];
    let busy = vec![BusyInterval {
        start: Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
    }];

    let slots = compute_slots(date, utc(), 30, &rules, &busy).unwrap();

    let starts: Vec<NaiveTime> = slots.iter().map(|s| s.local_start).collect();
    assert_eq!(starts, vec![hm(9, 0), hm(10, 0), hm(10, 30)]);
}

#[test]
fn multiple_windows_on_one_day_are_combined_in_order() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let rules = vec![rule(1, (14, 0), (15, 0)), rule(1, (9, 0), (10, 0))];

    let slots = compute_slots(date, utc(), 30, &rules, &[]).unwrap();

    let starts: Vec<NaiveTime> = slots.iter().map(|s| s.local_start).collect();
    assert_eq!(starts, vec![hm(9, 0), hm(9, 30), hm(14, 0), hm(14, 30)]);
}

#[test]
fn overlapping_legacy_windows_deduplicate_by_start() {
    // Overlapping rules are rejected at write time, but legacy rows must not
    // crash listing or produce duplicate starts.
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let rules = vec![rule(1, (9, 0), (10, 30)), rule(1, (9, 0), (10, 0))];

    let slots = compute_slots(date, utc(), 30, &rules, &[]).unwrap();

    let starts: Vec<NaiveTime> = slots.iter().map(|s| s.local_start).collect();
    assert_eq!(starts, vec![hm(9, 0), hm(9, 30), hm(10, 0)]);
}

#[test]
fn zero_duration_is_rejected() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let rules = vec![rule(1, (9, 0), (17, 0))];

    let err = compute_slots(date, utc(), 0, &rules, &[]).unwrap_err();

    assert!(matches!(err, EngineError::InvalidDuration(0)));
}

#[test]
fn local_slots_resolve_to_utc_in_host_zone() {
    // 2026-06-01 is a Monday; New York is UTC-4 in June.
    let tz: Tz = "America/New_York".parse().unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let rules = vec![rule(1, (9, 0), (10, 0))];

    let slots = compute_slots(date, tz, 30, &rules, &[]).unwrap();

    assert_eq!(slots.len(), 2);
    assert_eq!(
        slots[0].start,
        Utc.with_ymd_and_hms(2026, 6, 1, 13, 0, 0).unwrap()
    );
    assert_eq!(
        slots[0].end,
        Utc.with_ymd_and_hms(2026, 6, 1, 13, 30, 0).unwrap()
    );
}

#[test]
fn booking_in_utc_blocks_local_slot_across_zones() {
    // A booking at 13:00-13:30 UTC occupies the 09:00 New York slot in June.
    let tz: Tz = "America/New_York".parse().unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let rules = vec![rule(1, (9, 0), (10, 0))];
    let busy = vec![BusyInterval {
        start: Utc.with_ymd_and_hms(2026, 6, 1, 13, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 6, 1, 13, 30, 0).unwrap(),
    }];

    let slots = compute_slots(date, tz, 30, &rules, &busy).unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].local_start, hm(9, 30));
}

#[test]
fn spring_forward_gap_candidates_are_skipped() {
    // US DST begins 2026-03-08 at 02:00 local; 02:00-02:59 do not exist.
    // Window 01:00-04:00 at 30 min: 01:00 survives, 01:30 ends in the gap,
    // 02:00 and 02:30 start in the gap, 03:00 and 03:30 survive.
    let tz: Tz = "America/New_York".parse().unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap(); // a Sunday
    let rules = vec![rule(0, (1, 0), (4, 0))];

    let slots = compute_slots(date, tz, 30, &rules, &[]).unwrap();

    let starts: Vec<NaiveTime> = slots.iter().map(|s| s.local_start).collect();
    assert_eq!(starts, vec![hm(1, 0), hm(3, 0), hm(3, 30)]);
}

#[test]
fn listing_is_idempotent_for_unchanged_inputs() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let rules = vec![rule(1, (9, 0), (17, 0))];
    let busy = vec![BusyInterval {
        start: Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
    }];

    let first = compute_slots(date, utc(), 45, &rules, &busy).unwrap();
    let second = compute_slots(date, utc(), 45, &rules, &busy).unwrap();

    assert_eq!(first, second);
}
