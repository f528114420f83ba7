//! Error taxonomy for the booking service.
//!
//! Each failure class maps to a distinct HTTP status and machine-readable
//! code, so a caller can tell a lost slot race (409, retry with a fresh
//! listing) from bad input (400) or an exhausted quota (429). Reservation
//! conflicts are expected traffic, not application errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing fields; never touches the store.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown host, booking, or client.
    #[error("not found: {0}")]
    NotFound(String),

    /// The requested range overlaps a confirmed booking.
    #[error("slot unavailable")]
    Conflict,

    /// The client exhausted its hourly quota.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Missing, unknown, or revoked API key.
    #[error("invalid or missing API key")]
    Auth,

    /// The store is contended or unreachable; safe to retry.
    #[error("store temporarily unavailable: {0}")]
    TransientStore(String),

    /// Unexpected store failure.
    #[error("store error: {0}")]
    Store(String),
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::NotFound(what),
            DatabaseError::Busy(msg) => Self::TransientStore(msg),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<bookline_engine::EngineError> for ApiError {
    fn from(e: bookline_engine::EngineError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Auth => StatusCode::UNAUTHORIZED,
            Self::TransientStore(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Conflict => "slot_unavailable",
            Self::RateLimited => "rate_limited",
            Self::Auth => "unauthorized",
            Self::TransientStore(_) => "store_unavailable",
            Self::Store(_) => "store_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
