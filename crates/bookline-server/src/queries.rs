//! Database queries for the Bookline server.

use bookline_engine::rules::{validate_rules, RuleWindow};
use chrono::NaiveTime;

use crate::db::{unix_timestamp, Database, DatabaseError};
use crate::models::{ApiClient, AvailabilityRule, Booking, BookingStatus, Host};

impl Database {
    // =========================================================================
    // Host queries
    // =========================================================================

    /// Provision a host and seed the default Mon–Fri 9–5 rule set.
    pub async fn create_host(
        &self,
        id: &str,
        name: &str,
        timezone: &str,
        duration_minutes: i64,
        buffer_minutes: i64,
    ) -> Result<Host, DatabaseError> {
        if duration_minutes <= 0 {
            return Err(DatabaseError::Query(format!(
                "duration_minutes must be positive, got {duration_minutes}"
            )));
        }
        if buffer_minutes < 0 {
            return Err(DatabaseError::Query(format!(
                "buffer_minutes must be non-negative, got {buffer_minutes}"
            )));
        }
        bookline_engine::localtime::parse_timezone(timezone)
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let now = unix_timestamp();

        sqlx::query(
            r"
            INSERT INTO hosts (id, name, timezone, duration_minutes, buffer_minutes, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(id)
        .bind(name)
        .bind(timezone)
        .bind(duration_minutes)
        .bind(buffer_minutes)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.replace_host_rules(id, &bookline_engine::default_weekly_rules())
            .await?;

        self.get_host(id).await
    }

    /// Get a host by ID.
    pub async fn get_host(&self, id: &str) -> Result<Host, DatabaseError> {
        sqlx::query_as::<_, Host>("SELECT * FROM hosts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Host {id}")))
    }

    // =========================================================================
    // Availability rule queries
    // =========================================================================

    /// Active rule windows for one weekday, as engine types.
    pub async fn active_rules_for_day(
        &self,
        host_id: &str,
        day_of_week: u8,
    ) -> Result<Vec<RuleWindow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AvailabilityRule>(
            r"
            SELECT * FROM availability_rules
            WHERE host_id = ? AND day_of_week = ? AND active = 1
            ORDER BY start_time
            ",
        )
        .bind(host_id)
        .bind(i64::from(day_of_week))
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(to_window).collect()
    }

    /// Replace a host's full rule set. The new set is validated first;
    /// overlapping windows on the same day are rejected at write time.
    pub async fn replace_host_rules(
        &self,
        host_id: &str,
        rules: &[RuleWindow],
    ) -> Result<(), DatabaseError> {
        validate_rules(rules).map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM availability_rules WHERE host_id = ?")
            .bind(host_id)
            .execute(&mut *tx)
            .await?;

        for rule in rules {
            sqlx::query(
                r"
                INSERT INTO availability_rules (host_id, day_of_week, start_time, end_time, active)
                VALUES (?, ?, ?, ?, 1)
                ",
            )
            .bind(host_id)
            .bind(i64::from(rule.day_of_week))
            .bind(rule.start.format("%H:%M").to_string())
            .bind(rule.end.format("%H:%M").to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Soft-disable (or re-enable) a single rule, guarded by host ownership.
    pub async fn set_rule_active(
        &self,
        rule_id: i64,
        host_id: &str,
        active: bool,
    ) -> Result<(), DatabaseError> {
        let result =
            sqlx::query("UPDATE availability_rules SET active = ? WHERE id = ? AND host_id = ?")
                .bind(i64::from(active))
                .bind(rule_id)
                .bind(host_id)
                .execute(self.pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Rule {rule_id}")));
        }
        Ok(())
    }

    // =========================================================================
    // Booking queries
    // =========================================================================

    /// Get a booking by ID.
    pub async fn get_booking(&self, id: &str) -> Result<Booking, DatabaseError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Booking {id}")))
    }

    /// Confirmed bookings intersecting `[start, end)` (Unix seconds).
    pub async fn confirmed_bookings_between(
        &self,
        host_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<Booking>, DatabaseError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r"
            SELECT * FROM bookings
            WHERE host_id = ? AND status = 'confirmed' AND start_time < ? AND end_time > ?
            ORDER BY start_time
            ",
        )
        .bind(host_id)
        .bind(end)
        .bind(start)
        .fetch_all(self.pool())
        .await?;

        Ok(bookings)
    }

    /// List bookings for a host with optional start-bound, end-bound, and
    /// status filters (bounds apply to the booking's start time).
    pub async fn list_bookings(
        &self,
        host_id: &str,
        start_after: Option<i64>,
        start_before: Option<i64>,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, DatabaseError> {
        let status = status.map(BookingStatus::as_str);
        let bookings = sqlx::query_as::<_, Booking>(
            r"
            SELECT * FROM bookings
            WHERE host_id = ?
              AND (? IS NULL OR start_time >= ?)
              AND (? IS NULL OR start_time < ?)
              AND (? IS NULL OR status = ?)
            ORDER BY start_time
            ",
        )
        .bind(host_id)
        .bind(start_after)
        .bind(start_after)
        .bind(start_before)
        .bind(start_before)
        .bind(status)
        .bind(status)
        .fetch_all(self.pool())
        .await?;

        Ok(bookings)
    }

    /// Cancel a confirmed booking, guarded by host ownership. Returns the
    /// number of rows transitioned (0 when the booking was not confirmed).
    pub async fn cancel_booking(
        &self,
        booking_id: &str,
        host_id: &str,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r"
            UPDATE bookings SET status = 'cancelled'
            WHERE id = ? AND host_id = ? AND status = 'confirmed'
            ",
        )
        .bind(booking_id)
        .bind(host_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    // API client queries
    // =========================================================================

    /// Provision an API client keyed by the SHA-256 digest of its secret.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_api_client(
        &self,
        id: &str,
        name: &str,
        key_hash: &str,
        rate_limit: i64,
        webhook_url: Option<&str>,
        webhook_secret: Option<&str>,
    ) -> Result<ApiClient, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            r"
            INSERT INTO api_clients (id, name, key_hash, rate_limit, webhook_url, webhook_secret, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(id)
        .bind(name)
        .bind(key_hash)
        .bind(rate_limit)
        .bind(webhook_url)
        .bind(webhook_secret)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_api_client(id).await
    }

    /// Get an API client by ID.
    pub async fn get_api_client(&self, id: &str) -> Result<ApiClient, DatabaseError> {
        sqlx::query_as::<_, ApiClient>("SELECT * FROM api_clients WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("API client {id}")))
    }

    /// Look up an active client by key digest. Unknown and inactive keys are
    /// indistinguishable to the caller; both come back as `None`.
    pub async fn find_client_by_key_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiClient>, DatabaseError> {
        let client = sqlx::query_as::<_, ApiClient>(
            "SELECT * FROM api_clients WHERE key_hash = ? AND active = 1",
        )
        .bind(key_hash)
        .fetch_optional(self.pool())
        .await?;

        Ok(client)
    }

    /// Deactivate a client, revoking its key without deleting the record.
    pub async fn set_client_active(&self, id: &str, active: bool) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE api_clients SET active = ? WHERE id = ?")
            .bind(i64::from(active))
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("API client {id}")));
        }
        Ok(())
    }

    /// Record the moment a client's key last authenticated a routed call.
    pub async fn touch_client_last_used(&self, id: &str) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE api_clients SET last_used_at = ? WHERE id = ?")
            .bind(unix_timestamp())
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    // =========================================================================
    // Request log queries
    // =========================================================================

    /// Routed requests for a client since `since` (Unix seconds, exclusive).
    pub async fn count_requests_since(
        &self,
        client_id: &str,
        since: i64,
    ) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM api_request_log WHERE client_id = ? AND created_at > ?",
        )
        .bind(client_id)
        .bind(since)
        .fetch_one(self.pool())
        .await?;

        Ok(count)
    }

    /// Append one request log row. The log is never updated or pruned by the
    /// gateway; it only ever grows.
    pub async fn log_request(
        &self,
        client_id: &str,
        endpoint: &str,
        method: &str,
        status_code: i64,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            INSERT INTO api_request_log (client_id, endpoint, method, status_code, created_at)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(client_id)
        .bind(endpoint)
        .bind(method)
        .bind(status_code)
        .bind(unix_timestamp())
        .execute(self.pool())
        .await?;

        Ok(())
    }
}

/// Convert a stored rule row into the engine's window type. A row that fails
/// to parse indicates corrupt data, not caller error.
fn to_window(rule: &AvailabilityRule) -> Result<RuleWindow, DatabaseError> {
    let parse = |s: &str| -> Result<NaiveTime, DatabaseError> {
        NaiveTime::parse_from_str(s, "%H:%M")
            .map_err(|_| DatabaseError::Query(format!("malformed rule time {s:?}")))
    };

    Ok(RuleWindow {
        day_of_week: rule.day_of_week.clamp(0, 6) as u8,
        start: parse(&rule.start_time)?,
        end: parse(&rule.end_time)?,
    })
}
