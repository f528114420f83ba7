//! Slot computation: derives bookable start times for one host-local date.
//!
//! Candidates step through each active rule window at the host's booking
//! duration; any candidate whose UTC range overlaps a confirmed booking is
//! dropped. Listing filters against raw booking bounds; buffer time is
//! enforced by the reservation path, not here, so a listed slot can still
//! lose to a buffered conflict at reservation time. Listing is advisory.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::conflict::{find_conflict, BusyInterval};
use crate::error::{EngineError, Result};
use crate::localtime;
use crate::rules::RuleWindow;

/// A bookable candidate: the local wall-clock start plus its resolved UTC range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub local_start: NaiveTime,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Compute the ordered, duplicate-free bookable slots for `date` in the
/// host's timezone.
///
/// For each rule window on the date's weekday, candidate starts step forward
/// at `duration_minutes` from the window's opening time while
/// `start + duration <= window end`. A candidate survives when its UTC range
/// overlaps no busy interval. Candidates whose start or end falls in a DST
/// spring-forward gap are unrepresentable and skipped.
///
/// A date with no rule windows yields an empty list, not an error. Output is
/// sorted ascending by start and deduplicated, so overlapping legacy rule
/// rows degrade to duplicate suppression rather than a crash.
///
/// # Errors
///
/// Returns `EngineError::InvalidDuration` when `duration_minutes` is zero.
pub fn compute_slots(
    date: NaiveDate,
    tz: Tz,
    duration_minutes: u32,
    rules: &[RuleWindow],
    busy: &[BusyInterval],
) -> Result<Vec<Slot>> {
    if duration_minutes == 0 {
        return Err(EngineError::InvalidDuration(0));
    }
    let duration = Duration::minutes(i64::from(duration_minutes));
    let weekday = localtime::weekday_index(date);

    let mut slots: Vec<Slot> = Vec::new();
    for rule in rules.iter().filter(|r| r.day_of_week == weekday) {
        let mut cursor = rule.start;
        loop {
            let (slot_end, wrapped) = cursor.overflowing_add_signed(duration);
            // Stop when the candidate would cross midnight or leave the window.
            if wrapped != 0 || slot_end > rule.end {
                break;
            }

            if let (Some(start_utc), Some(end_utc)) = (
                localtime::local_to_utc(date, cursor, tz),
                localtime::local_to_utc(date, slot_end, tz),
            ) {
                if end_utc > start_utc && find_conflict(start_utc, end_utc, 0, busy).is_none() {
                    slots.push(Slot {
                        local_start: cursor,
                        start: start_utc,
                        end: end_utc,
                    });
                }
            }

            cursor = slot_end;
        }
    }

    slots.sort_by_key(|s| s.start);
    slots.dedup_by_key(|s| s.start);

    Ok(slots)
}
