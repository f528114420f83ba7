//! Overlap detection between a candidate time range and confirmed bookings.
//!
//! All ranges are half-open `[start, end)`: two ranges overlap iff
//! `a.start < b.end && b.start < a.end`. Adjacent ranges, where one ends
//! exactly when the other starts, are NOT conflicts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A confirmed booking's occupied range, in UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Half-open overlap test between `[a_start, a_end)` and `[b_start, b_end)`.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Find the first busy interval that conflicts with `[start, end)` after the
/// candidate is expanded by `buffer_minutes` on both sides.
///
/// Buffer is the minimum gap a host requires around each booking; pass 0 for
/// a raw overlap test (slot listing filters with raw bounds, the reservation
/// path filters with the host's configured buffer).
pub fn find_conflict(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    buffer_minutes: i64,
    busy: &[BusyInterval],
) -> Option<&BusyInterval> {
    let pad = Duration::minutes(buffer_minutes.max(0));
    let padded_start = start - pad;
    let padded_end = end + pad;

    busy.iter()
        .find(|b| overlaps(padded_start, padded_end, b.start, b.end))
}
