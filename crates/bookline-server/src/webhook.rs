//! Outbound webhook delivery: best-effort notification of committed
//! bookings.
//!
//! Delivery is fire-and-forget: the POST is spawned after the reservation has
//! committed, failures are logged and never surfaced to the caller, and
//! nothing here can un-confirm a booking.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use crate::models::{ApiClient, Booking};

/// Shared-secret header attached to every delivery.
pub const SIGNATURE_HEADER: &str = "x-bookline-signature";

/// Reusable outbound HTTP sender with a bounded per-request timeout.
#[derive(Clone)]
pub struct WebhookSender {
    http: reqwest::Client,
}

impl WebhookSender {
    pub fn new(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http }
    }

    /// Spawn a delivery task for `booking` if the client has a webhook URL
    /// configured. Returns immediately.
    pub fn notify_booking_created(&self, client: &ApiClient, booking: &Booking) {
        let Some(url) = client.webhook_url.clone() else {
            return;
        };
        let secret = client.webhook_secret.clone().unwrap_or_default();
        let http = self.http.clone();
        let booking_id = booking.id.clone();
        let payload = json!({
            "event": "booking.created",
            "booking": booking,
        });

        tokio::spawn(async move {
            let result = http
                .post(&url)
                .header(SIGNATURE_HEADER, secret)
                .json(&payload)
                .send()
                .await;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    debug!(%booking_id, "webhook delivered");
                }
                Ok(resp) => {
                    warn!(%booking_id, status = %resp.status(), "webhook endpoint rejected delivery");
                }
                Err(e) => {
                    warn!(%booking_id, error = %e, "webhook delivery failed");
                }
            }
        });
    }
}
