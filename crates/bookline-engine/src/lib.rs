//! # bookline-engine
//!
//! Timezone-aware slot computation and conflict detection for the Bookline
//! scheduler.
//!
//! The engine turns a host's recurring weekly availability windows plus their
//! confirmed bookings into the list of start times a new booking could take,
//! and provides the overlap algebra the reservation path uses to keep the
//! ledger free of double-bookings. Everything here is pure: no I/O, no clocks,
//! no shared state. Callers pass rules and busy intervals in and get slots
//! out, so the same inputs always produce the same outputs.
//!
//! ## Modules
//!
//! - [`slots`]: derive bookable start times for one host-local calendar date
//! - [`rules`]: weekly availability windows and their validation
//! - [`conflict`]: half-open interval overlap tests, with optional buffer
//! - [`localtime`]: host-local wall clock ↔ UTC conversion with DST policy
//! - [`error`]: error types

pub mod conflict;
pub mod error;
pub mod localtime;
pub mod rules;
pub mod slots;

pub use conflict::{find_conflict, overlaps, BusyInterval};
pub use error::EngineError;
pub use rules::{default_weekly_rules, validate_rules, RuleWindow};
pub use slots::{compute_slots, Slot};
