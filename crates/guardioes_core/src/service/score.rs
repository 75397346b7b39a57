//! Daily reporting streak rules.
//!
//! # Invariants
//! - The gap is counted in whole elapsed 24h periods, floored, so a report
//!   dated in the future yields a negative gap.
//! - Only a gap of exactly one day continues the streak.
//! - `lastReport` is written as epoch milliseconds; the JavaScript
//!   `Date.toString()` form written by earlier app releases is still read.

use crate::platform::clock::DAY_MS;
use chrono::DateTime;

const LEGACY_DATE_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

/// Transition applied to the streak by one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakStep {
    /// Gap of 0 days; nothing changes.
    AlreadyReported,
    /// Gap of exactly 1 day; score grows by one.
    Continued,
    /// Any other gap, or no previous report; score drops to 0.
    Reset,
}

impl StreakStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyReported => "already_reported",
            Self::Continued => "continued",
            Self::Reset => "reset",
        }
    }

    /// Score after applying this step to `score`.
    pub fn apply(self, score: u32) -> u32 {
        match self {
            Self::AlreadyReported => score,
            Self::Continued => score.saturating_add(1),
            Self::Reset => 0,
        }
    }

    /// Whether this step rewrites persisted score and timestamp.
    pub fn mutates(self) -> bool {
        !matches!(self, Self::AlreadyReported)
    }
}

/// Whole days elapsed between two epoch-millisecond instants.
pub fn day_gap(last_report_ms: i64, now_ms: i64) -> i64 {
    now_ms.saturating_sub(last_report_ms).div_euclid(DAY_MS)
}

/// Parses a stored `lastReport` value into epoch milliseconds.
///
/// Accepts `1760000000000` and
/// `Mon Oct 13 2025 14:03:12 GMT-0300 (Brasilia Standard Time)`.
pub fn parse_last_report(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(epoch_ms) = raw.parse::<i64>() {
        return Some(epoch_ms);
    }
    let without_zone_name = raw.split_once(" (").map_or(raw, |(head, _)| head);
    DateTime::parse_from_str(without_zone_name, LEGACY_DATE_FORMAT)
        .ok()
        .map(|reported_at| reported_at.timestamp_millis())
}

pub fn next_step(last_report_ms: Option<i64>, now_ms: i64) -> StreakStep {
    match last_report_ms.map(|last| day_gap(last, now_ms)) {
        Some(0) => StreakStep::AlreadyReported,
        Some(1) => StreakStep::Continued,
        _ => StreakStep::Reset,
    }
}
