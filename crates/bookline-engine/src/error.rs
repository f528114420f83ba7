//! Error types for scheduling engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid booking duration: {0} minutes")]
    InvalidDuration(i64),

    #[error("Invalid availability rule: {0}")]
    InvalidRule(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
