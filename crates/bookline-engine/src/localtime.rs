//! Host-local wall clock ↔ UTC conversion with DST handling.
//!
//! Availability rules are stored as local wall-clock times; bookings are
//! stored as UTC instants. Conversion has to survive the two DST edge cases:
//! a wall-clock time inside a spring-forward gap does not exist (we skip it),
//! and a time inside a fall-back fold exists twice (we take the earlier
//! instant).

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};

/// Parse an IANA timezone name (e.g. "America/New_York").
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| EngineError::InvalidTimezone(name.to_string()))
}

/// Day-of-week index for a calendar date: 0–6 with Sunday = 0.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Convert a host-local wall-clock time on a date to a UTC instant.
///
/// Returns `None` when the wall-clock time does not exist in the zone
/// (spring-forward gap). An ambiguous time (fall-back fold) resolves to the
/// earlier of the two instants.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// UTC instants bounding the host-local calendar date:
/// `[first instant of date, first instant of the next date)`.
///
/// Used to scope ledger queries to "bookings on this local date".
pub fn day_bounds_utc(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        first_instant_on(date, tz),
        first_instant_on(date + Duration::days(1), tz),
    )
}

/// First representable instant on a local date. Local midnight itself can fall
/// in a DST gap (some zones shift at 00:00), so walk forward minute by minute
/// until a representable time is found.
fn first_instant_on(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    for minute in 0..(24 * 60) {
        let time = NaiveTime::MIN + Duration::minutes(minute);
        if let Some(dt) = local_to_utc(date, time, tz) {
            return dt;
        }
    }
    // No zone skips an entire day; fall back to treating midnight as UTC.
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
