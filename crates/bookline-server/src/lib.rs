//! # bookline-server
//!
//! The Bookline booking service: SQLite-backed stores, the atomic reservation
//! protocol, the API gateway (key auth + per-client rate limiting), the HTTP
//! surface, and best-effort webhook dispatch, all built around the pure slot
//! math in `bookline-engine`.
//!
//! ## Modules
//!
//! - [`db`]: connection pool, migrations, timestamp helper
//! - [`models`]: database row types and status enums
//! - [`queries`]: query methods on [`db::Database`]
//! - [`reservation`]: the atomic check-then-insert write path
//! - [`gateway`]: API key authentication and rolling-hour rate limiting
//! - [`service`]: transport-free operations behind the HTTP handlers
//! - [`http`]: router, wire types, handlers
//! - [`webhook`]: fire-and-forget booking notifications
//! - [`error`]: the API error taxonomy and its HTTP mapping

pub mod db;
pub mod error;
pub mod gateway;
pub mod http;
pub mod models;
pub mod queries;
pub mod reservation;
pub mod service;
pub mod telemetry;
pub mod webhook;
