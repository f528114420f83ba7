//! Database models for the Bookline server.
//!
//! Instants are stored as Unix seconds (`i64`); rule times as `"HH:MM"` text
//! in the host's local wall clock.

use serde::{Deserialize, Serialize};

/// Host record: the account whose calendar is booked against. Created by
/// admin provisioning, read-only to the scheduling core.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Host {
    pub id: String,
    pub name: String,
    /// IANA timezone name, e.g. "America/New_York".
    pub timezone: String,
    pub duration_minutes: i64,
    pub buffer_minutes: i64,
    pub created_at: i64,
}

/// Weekly recurring availability window row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AvailabilityRule {
    pub id: i64,
    pub host_id: String,
    /// 0–6, Sunday = 0.
    pub day_of_week: i64,
    /// Local wall-clock "HH:MM".
    pub start_time: String,
    pub end_time: String,
    pub active: i64,
}

/// Booking ledger row. Only the reservation protocol inserts confirmed rows.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: String,
    pub host_id: String,
    pub guest_name: String,
    pub guest_contact: String,
    pub start_time: i64,
    pub end_time: i64,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: i64,
}

/// Booking lifecycle states. `confirmed → cancelled` is the only transition
/// and it is irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Pending,
}

impl BookingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Pending => "pending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// External API client record. The secret key is stored only as a SHA-256
/// hex digest; the plaintext exists solely at provisioning time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApiClient {
    pub id: String,
    pub name: String,
    pub key_hash: String,
    pub active: i64,
    /// Maximum routed requests per rolling hour.
    pub rate_limit: i64,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub last_used_at: Option<i64>,
    pub created_at: i64,
}

/// Append-only request log row; the source of truth for the rate-limit window.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApiRequestLog {
    pub id: i64,
    pub client_id: String,
    pub endpoint: String,
    pub method: String,
    pub status_code: i64,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_status_round_trips() {
        for status in [
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Pending,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("expired"), None);
    }
}
