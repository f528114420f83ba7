//! Atomic reservation protocol, the only write path into the booking ledger.
//!
//! Slot listing is advisory: a race window exists between listing and
//! reservation, so the protocol re-validates against the live ledger inside a
//! single `BEGIN IMMEDIATE` transaction. The immediate transaction takes the
//! database write lock up front, which makes the check-then-insert sequence
//! indivisible with respect to every other reservation attempt, including
//! those from other server processes sharing the database file.
//!
//! Busy/locked errors are the one legitimate retry site in the system: they
//! get up to [`MAX_ATTEMPTS`] tries with jittered backoff before surfacing as
//! transient. If the caller's request is cancelled mid-flight, dropping the
//! transaction rolls it back, leaving no orphaned locks.

use std::time::Duration;

use rand::Rng;
use sqlx::{Sqlite, Transaction};
use tracing::{debug, warn};

use crate::db::{unix_timestamp, Database, DatabaseError};
use crate::error::{ApiError, Result};
use crate::models::{Booking, BookingStatus, Host};

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 25;

/// A reservation request after transport-level parsing. Instants are Unix
/// seconds, UTC.
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub guest_name: String,
    pub guest_contact: String,
    pub start_time: i64,
    pub end_time: i64,
    pub notes: Option<String>,
}

/// Protocol phases, traced per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Validating,
    Committing,
    Committed,
    Conflicted,
    Aborted,
}

/// Outcome of one transactional attempt.
enum Outcome {
    Committed(Booking),
    Conflicted,
}

/// Attempt to create a confirmed booking for `[start_time, end_time)`.
///
/// Of any number of concurrent callers requesting overlapping ranges for the
/// same host, at most one receives `Ok`; the rest get [`ApiError::Conflict`].
/// The conflict re-check expands the requested range by the host's buffer on
/// both sides. Any positive-length range is accepted; duration is not
/// required to equal the host's configured slot length.
pub async fn reserve(
    db: &Database,
    host: &Host,
    req: &ReservationRequest,
) -> Result<Booking> {
    let mut phase = Phase::Validating;
    debug!(host_id = %host.id, phase = ?phase, "reservation attempt");

    if req.end_time <= req.start_time {
        return Err(ApiError::Validation(
            "end_time must be after start_time".to_string(),
        ));
    }
    if req.guest_name.trim().is_empty() {
        return Err(ApiError::Validation("guest_name is required".to_string()));
    }
    if req.guest_contact.trim().is_empty() {
        return Err(ApiError::Validation("guest_contact is required".to_string()));
    }

    phase = Phase::Committing;
    debug!(host_id = %host.id, phase = ?phase, start = req.start_time, end = req.end_time, "re-validating against live ledger");

    let mut attempt = 0;
    loop {
        attempt += 1;
        match try_commit(db, host, req).await {
            Ok(Outcome::Committed(booking)) => {
                phase = Phase::Committed;
                debug!(
                    host_id = %host.id,
                    booking_id = %booking.id,
                    phase = ?phase,
                    "reservation committed"
                );
                return Ok(booking);
            }
            // Expected contention outcome; not an application error.
            Ok(Outcome::Conflicted) => {
                phase = Phase::Conflicted;
                debug!(host_id = %host.id, phase = ?phase, "slot unavailable");
                return Err(ApiError::Conflict);
            }
            Err(DatabaseError::Busy(msg)) if attempt < MAX_ATTEMPTS => {
                warn!(
                    host_id = %host.id,
                    attempt,
                    error = %msg,
                    "reservation transaction busy, retrying"
                );
                tokio::time::sleep(backoff(attempt)).await;
            }
            Err(e) => {
                phase = Phase::Aborted;
                warn!(host_id = %host.id, phase = ?phase, error = %e, "reservation aborted");
                return Err(e.into());
            }
        }
    }
}

/// One indivisible check-then-insert attempt. The transaction rolls back on
/// drop unless explicitly committed.
async fn try_commit(
    db: &Database,
    host: &Host,
    req: &ReservationRequest,
) -> Result<Outcome, DatabaseError> {
    let mut tx = db.pool().begin_with("BEGIN IMMEDIATE").await?;

    if has_conflict(&mut tx, host, req).await? {
        tx.rollback().await?;
        return Ok(Outcome::Conflicted);
    }

    let id = uuid::Uuid::new_v4().to_string();
    let now = unix_timestamp();

    sqlx::query(
        r"
        INSERT INTO bookings (id, host_id, guest_name, guest_contact, start_time, end_time, status, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(&id)
    .bind(&host.id)
    .bind(&req.guest_name)
    .bind(&req.guest_contact)
    .bind(req.start_time)
    .bind(req.end_time)
    .bind(BookingStatus::Confirmed.as_str())
    .bind(&req.notes)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(&id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Outcome::Committed(booking))
}

/// Conflict re-check against the live ledger: any confirmed booking for the
/// host whose range overlaps the request expanded by the buffer on both
/// sides. Mirrors `bookline_engine::conflict::find_conflict`.
async fn has_conflict(
    tx: &mut Transaction<'_, Sqlite>,
    host: &Host,
    req: &ReservationRequest,
) -> Result<bool, DatabaseError> {
    let pad = host.buffer_minutes.max(0) * 60;

    let conflicts: i64 = sqlx::query_scalar(
        r"
        SELECT COUNT(*) FROM bookings
        WHERE host_id = ? AND status = 'confirmed' AND start_time < ? AND end_time > ?
        ",
    )
    .bind(&host.id)
    .bind(req.end_time + pad)
    .bind(req.start_time - pad)
    .fetch_one(&mut **tx)
    .await?;

    Ok(conflicts > 0)
}

fn backoff(attempt: u32) -> Duration {
    let base = BACKOFF_BASE_MS * u64::from(1u32 << attempt.min(4));
    let jitter = rand::thread_rng().gen_range(0..BACKOFF_BASE_MS);
    Duration::from_millis(base + jitter)
}
