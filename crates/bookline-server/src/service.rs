//! Service operations behind the HTTP surface.
//!
//! Handlers stay thin; these functions own validation and store access so the
//! scheduling logic is exercisable without any HTTP plumbing. Listing is a
//! pure snapshot read; a listed slot can vanish before the caller reserves
//! it, which is why [`create_booking`] defers to the reservation protocol.

use bookline_engine::conflict::BusyInterval;
use bookline_engine::localtime;
use bookline_engine::slots::{compute_slots, Slot};
use chrono::{DateTime, NaiveDate, Utc};

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::{Booking, BookingStatus, Host};
use crate::reservation::{self, ReservationRequest};

/// Result of a slot listing, alongside the host config that shaped it.
#[derive(Debug, Clone)]
pub struct SlotListing {
    pub date: NaiveDate,
    pub timezone: String,
    pub duration_minutes: i64,
    pub slots: Vec<Slot>,
}

/// Filters for the booking listing endpoint. Dates are interpreted in the
/// host's timezone and applied to the booking's start instant.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
}

/// List bookable slots for a host on one calendar date (host-local).
///
/// Read-only and safe under arbitrary concurrency.
pub async fn list_slots(
    db: &Database,
    host_id: &str,
    date: NaiveDate,
) -> Result<SlotListing> {
    let host = db.get_host(host_id).await?;
    let tz = host_timezone(&host)?;

    let rules = db
        .active_rules_for_day(host_id, localtime::weekday_index(date))
        .await?;

    let (day_start, day_end) = localtime::day_bounds_utc(date, tz);
    let busy: Vec<BusyInterval> = db
        .confirmed_bookings_between(host_id, day_start.timestamp(), day_end.timestamp())
        .await?
        .iter()
        .map(booking_interval)
        .collect();

    let duration = u32::try_from(host.duration_minutes)
        .map_err(|_| ApiError::Store(format!("host {host_id} has invalid duration")))?;
    let slots = compute_slots(date, tz, duration, &rules, &busy)?;

    Ok(SlotListing {
        date,
        timezone: host.timezone,
        duration_minutes: host.duration_minutes,
        slots,
    })
}

/// Create a confirmed booking through the atomic reservation protocol.
pub async fn create_booking(
    db: &Database,
    host_id: &str,
    req: ReservationRequest,
) -> Result<Booking> {
    let host = db.get_host(host_id).await?;
    reservation::reserve(db, &host, &req).await
}

/// List a host's bookings with optional date-range and status filters.
pub async fn list_bookings(
    db: &Database,
    host_id: &str,
    filter: &BookingFilter,
) -> Result<Vec<Booking>> {
    let host = db.get_host(host_id).await?;
    let tz = host_timezone(&host)?;

    let start_after = filter
        .start_date
        .map(|d| localtime::day_bounds_utc(d, tz).0.timestamp());
    let start_before = filter
        .end_date
        .map(|d| localtime::day_bounds_utc(d, tz).1.timestamp());

    db.list_bookings(host_id, start_after, start_before, filter.status)
        .await
        .map_err(ApiError::from)
}

/// Cancel a confirmed booking on behalf of its host. Irreversible.
///
/// A booking belonging to a different host is reported as not found rather
/// than forbidden, so the endpoint does not leak other hosts' booking IDs.
pub async fn cancel_booking(
    db: &Database,
    booking_id: &str,
    host_id: &str,
) -> Result<Booking> {
    let booking = db.get_booking(booking_id).await?;
    if booking.host_id != host_id {
        return Err(ApiError::NotFound(format!("Booking {booking_id}")));
    }
    if BookingStatus::parse(&booking.status) != Some(BookingStatus::Confirmed) {
        return Err(ApiError::Validation(format!(
            "booking {booking_id} is {}, only confirmed bookings can be cancelled",
            booking.status
        )));
    }

    let changed = db.cancel_booking(booking_id, host_id).await?;
    if changed == 0 {
        // Lost a race with another cancel between the check and the update.
        return Err(ApiError::Validation(format!(
            "booking {booking_id} is no longer confirmed"
        )));
    }
    db.get_booking(booking_id).await.map_err(ApiError::from)
}

fn host_timezone(host: &Host) -> Result<chrono_tz::Tz> {
    // A host row with an unparseable zone is corrupt config, not caller error.
    localtime::parse_timezone(&host.timezone)
        .map_err(|e| ApiError::Store(format!("host {}: {e}", host.id)))
}

fn booking_interval(b: &Booking) -> BusyInterval {
    BusyInterval {
        start: instant(b.start_time),
        end: instant(b.end_time),
    }
}

fn instant(unix: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(unix, 0).unwrap_or_default()
}
