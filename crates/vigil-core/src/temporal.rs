//! # Temporal Parsing — Layout Matching
//!
//! Date/time parsing shared by the [`DateTimeFormat`](crate::rules::DateTimeFormat)
//! rule, the date bound rules, and the `date_time` / `iso_8601_date` format
//! checkers in `vigil-schema`.
//!
//! ## Layouts
//!
//! A [`Layout`] is either RFC 3339 (with or without fractional seconds) or a
//! chrono strftime pattern. A pattern is matched by trying, in order, a zoned
//! datetime, a naive datetime, a date and a time, so date-only and time-only
//! layouts work as well as full timestamps.
//!
//! All parsers are pure and return `Option`/`Result` instead of panicking.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// chrono pattern for ISO 8601 timestamps with optional fractional seconds
/// and a colon-separated offset.
pub const ISO8601_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// A datetime layout a string must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// RFC 3339, fractional seconds allowed.
    Rfc3339,
    /// A chrono strftime pattern.
    Pattern(String),
}

impl Layout {
    /// Build a layout from a user-facing name: `RFC3339` (any case) selects
    /// [`Layout::Rfc3339`], anything else is a strftime pattern.
    pub fn parse(layout: &str) -> Self {
        if layout.eq_ignore_ascii_case("rfc3339") {
            Self::Rfc3339
        } else {
            Self::Pattern(layout.to_string())
        }
    }

    /// Whether `input` parses under this layout.
    pub fn matches(&self, input: &str) -> bool {
        match self {
            Layout::Rfc3339 => parse_rfc3339(input).is_ok(),
            Layout::Pattern(pattern) => matches_pattern(input, pattern),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Rfc3339 => f.write_str("RFC3339"),
            Layout::Pattern(p) => f.write_str(p),
        }
    }
}

/// Parse an RFC 3339 timestamp, keeping its offset.
pub fn parse_rfc3339(input: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(input)
}

/// Whether `input` matches a strftime pattern at any granularity.
pub fn matches_pattern(input: &str, pattern: &str) -> bool {
    DateTime::parse_from_str(input, pattern).is_ok()
        || NaiveDateTime::parse_from_str(input, pattern).is_ok()
        || NaiveDate::parse_from_str(input, pattern).is_ok()
        || NaiveTime::parse_from_str(input, pattern).is_ok()
}

/// Parse `HH:MM:SS`.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input, "%H:%M:%S").ok()
}

/// Parse `HH:MM:SS` followed by `Z` or a `±HH:MM` offset.
pub fn parse_time_with_offset(input: &str) -> Option<(NaiveTime, FixedOffset)> {
    if let Some(time) = input.strip_suffix('Z') {
        return Some((parse_time(time)?, FixedOffset::east_opt(0)?));
    }
    let split = input.len().checked_sub(6)?;
    if !input.is_char_boundary(split) {
        return None;
    }
    let (time, offset) = input.split_at(split);
    Some((parse_time(time)?, parse_offset(offset)?))
}

/// Parse a `±HH:MM` offset.
fn parse_offset(offset: &str) -> Option<FixedOffset> {
    let (sign, rest) = match offset.as_bytes().first()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse a calendar date `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

/// Parse an ISO 8601 timestamp with exactly three fractional digits and a
/// `Z` or `±HHMM` offset (`2024-01-02T15:04:05.000+0100`).
pub fn parse_iso8601_millis(input: &str) -> Option<NaiveDateTime> {
    if let Some(naive) = input.strip_suffix('Z') {
        return NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.3f").ok();
    }
    DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.3f%z")
        .ok()
        .map(|dt| dt.naive_utc())
}
