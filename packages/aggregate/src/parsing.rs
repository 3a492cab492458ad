//! Date and time parsing for crash rows.
//!
//! The dataset stores the crash date as a floating timestamp at midnight
//! (`2024-01-05T00:00:00.000`) and the time separately as `H:MM`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Parses a crash date. Accepts Socrata floating timestamps with or without
/// fractional seconds, and bare `YYYY-MM-DD` dates.
#[must_use]
pub fn parse_crash_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parses a crash time of day (`9:05`, `14:30`, `14:30:00`).
#[must_use]
pub fn parse_crash_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}
