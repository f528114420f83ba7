//! HTTP surface: router, wire types, handlers.
//!
//! Routes under `/api` are gated by the gateway middleware; `/health` stays
//! open for liveness probes. Handlers parse the wire format and delegate to
//! [`crate::service`], then fire post-commit side effects that can never roll
//! the commit back.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::gateway;
use crate::models::{ApiClient, Booking, BookingStatus};
use crate::reservation::ReservationRequest;
use crate::service::{self, BookingFilter};
use crate::webhook::WebhookSender;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub webhooks: WebhookSender,
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/availability/slots", post(list_slots))
        .route("/bookings", post(create_booking).get(list_bookings))
        .route("/bookings/{id}/cancel", post(cancel_booking))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gateway::require_api_client,
        ));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SlotsRequest {
    host_id: String,
    /// Calendar date in the host's timezone, "YYYY-MM-DD".
    date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct SlotsResponse {
    date: NaiveDate,
    timezone: String,
    duration: i64,
    /// Local wall-clock start times, "HH:MM", ascending.
    slots: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    host_id: String,
    guest_name: String,
    guest_email: String,
    /// ISO-8601 instants, e.g. "2026-03-02T10:00:00Z".
    start_time: String,
    end_time: String,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BookingListParams {
    host_id: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CancelRequest {
    host_id: String,
}

/// Success envelope for list endpoints.
#[derive(Debug, Serialize)]
struct ListEnvelope<T> {
    data: Vec<T>,
    count: usize,
}

/// Booking as presented on the wire: instants in RFC 3339 rather than the
/// ledger's Unix seconds.
#[derive(Debug, Serialize)]
struct BookingView {
    id: String,
    host_id: String,
    guest_name: String,
    guest_email: String,
    start_time: String,
    end_time: String,
    status: String,
    notes: Option<String>,
    created_at: String,
}

fn to_view(b: &Booking) -> BookingView {
    BookingView {
        id: b.id.clone(),
        host_id: b.host_id.clone(),
        guest_name: b.guest_name.clone(),
        guest_email: b.guest_contact.clone(),
        start_time: rfc3339(b.start_time),
        end_time: rfc3339(b.end_time),
        status: b.status.clone(),
        notes: b.notes.clone(),
        created_at: rfc3339(b.created_at),
    }
}

fn rfc3339(unix: i64) -> String {
    DateTime::<Utc>::from_timestamp(unix, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::Validation(format!("invalid ISO-8601 timestamp: {s:?}")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

// POST /api/availability/slots
async fn list_slots(
    State(state): State<AppState>,
    Json(req): Json<SlotsRequest>,
) -> Result<Json<SlotsResponse>> {
    let listing = service::list_slots(&state.db, &req.host_id, req.date).await?;

    Ok(Json(SlotsResponse {
        date: listing.date,
        timezone: listing.timezone,
        duration: listing.duration_minutes,
        slots: listing
            .slots
            .iter()
            .map(|s| s.local_start.format("%H:%M").to_string())
            .collect(),
    }))
}

// POST /api/bookings
async fn create_booking(
    State(state): State<AppState>,
    Extension(client): Extension<ApiClient>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingView>)> {
    let start = parse_instant(&req.start_time)?;
    let end = parse_instant(&req.end_time)?;

    let booking = service::create_booking(
        &state.db,
        &req.host_id,
        ReservationRequest {
            guest_name: req.guest_name,
            guest_contact: req.guest_email,
            start_time: start.timestamp(),
            end_time: end.timestamp(),
            notes: req.notes,
        },
    )
    .await?;

    // Post-commit side effect; failures are logged, never surfaced.
    state.webhooks.notify_booking_created(&client, &booking);

    Ok((StatusCode::CREATED, Json(to_view(&booking))))
}

// GET /api/bookings?host_id&start_date&end_date&status
async fn list_bookings(
    State(state): State<AppState>,
    Query(params): Query<BookingListParams>,
) -> Result<Json<ListEnvelope<BookingView>>> {
    let status = params
        .status
        .as_deref()
        .map(|s| {
            BookingStatus::parse(s)
                .ok_or_else(|| ApiError::Validation(format!("unknown status {s:?}")))
        })
        .transpose()?;

    let filter = BookingFilter {
        start_date: params.start_date,
        end_date: params.end_date,
        status,
    };
    let bookings = service::list_bookings(&state.db, &params.host_id, &filter).await?;

    let data: Vec<BookingView> = bookings.iter().map(to_view).collect();
    let count = data.len();
    Ok(Json(ListEnvelope { data, count }))
}

// POST /api/bookings/{id}/cancel
async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<BookingView>> {
    let booking = service::cancel_booking(&state.db, &id, &req.host_id).await?;
    Ok(Json(to_view(&booking)))
}
