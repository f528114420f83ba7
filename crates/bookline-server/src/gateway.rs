//! API gateway: key authentication, rolling-hour rate limiting, request
//! logging.
//!
//! Every `/api` route passes through [`require_api_client`] before any
//! scheduling logic runs. Rejected calls (401/429) are not written to the
//! request log; only routed calls count toward the rolling window. A
//! sustained flood sitting exactly at the limit can therefore undercount.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::db::{unix_timestamp, Database};
use crate::error::{ApiError, Result};
use crate::http::AppState;
use crate::models::ApiClient;

/// Rolling rate-limit window, in seconds.
pub const WINDOW_SECONDS: i64 = 3600;

/// Header carrying the caller's secret key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// SHA-256 hex digest of a presented API key. Keys are stored and compared
/// only in this form.
pub fn hash_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Resolve a presented key to an active client, or reject.
pub async fn authenticate(db: &Database, key: &str) -> Result<ApiClient> {
    db.find_client_by_key_hash(&hash_key(key))
        .await
        .map_err(ApiError::from)?
        .ok_or(ApiError::Auth)
}

/// Enforce the client's hourly quota against the trailing window of routed
/// requests.
pub async fn check_rate_limit(db: &Database, client: &ApiClient) -> Result<()> {
    let since = unix_timestamp() - WINDOW_SECONDS;
    let used = db.count_requests_since(&client.id, since).await?;

    if used >= client.rate_limit {
        warn!(
            client_id = %client.id,
            used,
            limit = client.rate_limit,
            "rate limit exceeded"
        );
        return Err(ApiError::RateLimited);
    }
    Ok(())
}

/// Axum middleware gating all programmatic access: authenticate, rate-limit,
/// route, then log the routed call and touch the client's last-used stamp.
pub async fn require_api_client(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let Some(key) = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
    else {
        return Err(ApiError::Auth);
    };

    let client = authenticate(&state.db, &key).await?;
    check_rate_limit(&state.db, &client).await?;

    let endpoint = req.uri().path().to_string();
    let method = req.method().to_string();
    let client_id = client.id.clone();
    req.extensions_mut().insert(client);

    let response = next.run(req).await;

    // Log after routing so the recorded status reflects the real outcome.
    // Log failures must not fail the already-handled request.
    let status = i64::from(response.status().as_u16());
    if let Err(e) = state.db.log_request(&client_id, &endpoint, &method, status).await {
        warn!(client_id = %client_id, error = %e, "failed to append request log");
    }
    if let Err(e) = state.db.touch_client_last_used(&client_id).await {
        warn!(client_id = %client_id, error = %e, "failed to update last-used stamp");
    }

    Ok(response)
}
