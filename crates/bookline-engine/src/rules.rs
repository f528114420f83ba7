//! Weekly recurring availability windows and their validation.
//!
//! A host's schedule is a set of `RuleWindow`s, open intervals of local
//! wall-clock time on a given weekday. Overlapping windows on the same day are
//! rejected at write time rather than merged at read time, so slot output is
//! well defined for any stored rule set.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A recurring weekly open window in host-local wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleWindow {
    /// Day of week, 0–6 with Sunday = 0.
    pub day_of_week: u8,
    /// Local wall-clock opening time.
    pub start: NaiveTime,
    /// Local wall-clock closing time (exclusive); must be after `start`.
    pub end: NaiveTime,
}

/// Validate a full rule set before it is persisted.
///
/// Rejects day indices above 6, empty or inverted windows, and windows that
/// overlap another window on the same day. Windows that merely touch
/// (one ends exactly when the next starts) are allowed.
pub fn validate_rules(rules: &[RuleWindow]) -> Result<()> {
    for rule in rules {
        if rule.day_of_week > 6 {
            return Err(EngineError::InvalidRule(format!(
                "day_of_week {} out of range 0-6",
                rule.day_of_week
            )));
        }
        if rule.start >= rule.end {
            return Err(EngineError::InvalidRule(format!(
                "window {}-{} on day {} is empty",
                rule.start.format("%H:%M"),
                rule.end.format("%H:%M"),
                rule.day_of_week
            )));
        }
    }

    let mut sorted: Vec<&RuleWindow> = rules.iter().collect();
    sorted.sort_by_key(|r| (r.day_of_week, r.start));
    for pair in sorted.windows(2) {
        if pair[0].day_of_week == pair[1].day_of_week && pair[1].start < pair[0].end {
            return Err(EngineError::InvalidRule(format!(
                "windows {}-{} and {}-{} overlap on day {}",
                pair[0].start.format("%H:%M"),
                pair[0].end.format("%H:%M"),
                pair[1].start.format("%H:%M"),
                pair[1].end.format("%H:%M"),
                pair[0].day_of_week
            )));
        }
    }

    Ok(())
}

/// The rule set seeded at host creation: Monday–Friday, 09:00–17:00.
pub fn default_weekly_rules() -> Vec<RuleWindow> {
    (1..=5)
        .map(|day| RuleWindow {
            day_of_week: day,
            start: hm(9, 0),
            end: hm(17, 0),
        })
        .collect()
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
