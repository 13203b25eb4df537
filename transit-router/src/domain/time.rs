//! Transit clock handling.
//!
//! The search engine works in whole seconds relative to a per-search
//! "time zero": the start of the service day the request falls on. Using a
//! small integer keeps the per-stop arrival state compact and lets trips from
//! neighbouring service days be compared directly.
//!
//! This module converts between those offsets and real instants, and parses
//! and formats them the way timetables and itinerary summaries write them
//! ("0:14", "25:02:30", "9m", "1h2m").

use chrono::{DateTime, Duration, FixedOffset};
use std::fmt::Write as _;

/// Seconds relative to the search time zero. May be negative or exceed 24h.
pub type Seconds = i32;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a clock time written as `H:MM` or `H:MM:SS`.
///
/// Hours are not limited to 0-23: a trip running past midnight is written
/// `24:15` relative to the service day it belongs to.
///
/// # Examples
///
/// ```
/// use transit_router::domain::parse_time;
///
/// assert_eq!(parse_time("0:14").unwrap(), 14 * 60);
/// assert_eq!(parse_time("25:00:30").unwrap(), 25 * 3600 + 30);
/// assert!(parse_time("14").is_err());
/// assert!(parse_time("1:60").is_err());
/// ```
pub fn parse_time(s: &str) -> Result<Seconds, TimeError> {
    let s = s.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let mut parts = s.split(':');
    let hours = parse_number(parts.next(), 0..=999)
        .ok_or_else(|| TimeError::new("invalid hour digits"))?;
    let minutes = parse_two_digit_field(parts.next())
        .ok_or_else(|| TimeError::new("expected H:MM format"))?;
    let seconds = match parts.next() {
        Some(field) => parse_two_digit_field(Some(field))
            .ok_or_else(|| TimeError::new("invalid second digits"))?,
        None => 0,
    };
    if parts.next().is_some() {
        return Err(TimeError::new("too many fields"));
    }

    let value = hours * 3600 + minutes * 60 + seconds;
    Ok(if negative { -value } else { value })
}

/// Parse a comma separated list of clock times, e.g. a trip schedule
/// `"0:10, 0:12, 0:14"`.
pub fn parse_time_sequence(s: &str) -> Result<Vec<Seconds>, TimeError> {
    s.split(',')
        .filter(|field| !field.trim().is_empty())
        .map(parse_time)
        .collect()
}

/// Format an offset as `H:MM`, adding `:SS` only when seconds are present.
pub fn format_time(time: Seconds) -> String {
    let sign = if time < 0 { "-" } else { "" };
    let t = time.unsigned_abs();
    let (h, m, s) = (t / 3600, (t % 3600) / 60, t % 60);
    if s == 0 {
        format!("{sign}{h}:{m:02}")
    } else {
        format!("{sign}{h}:{m:02}:{s:02}")
    }
}

/// Format a duration in compact form: `9m`, `1h2m`, `1m30s`, `0s`.
pub fn format_duration(seconds: Seconds) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }
    let mut out = String::new();
    if seconds < 0 {
        out.push('-');
    }
    let t = seconds.unsigned_abs();
    let (h, m, s) = (t / 3600, (t % 3600) / 60, t % 60);
    if h > 0 {
        let _ = write!(out, "{h}h");
    }
    if m > 0 {
        let _ = write!(out, "{m}m");
    }
    if s > 0 {
        let _ = write!(out, "{s}s");
    }
    out
}

/// Start of the service day containing `date_time`, in the same offset.
///
/// All transit times of a search are stored relative to this instant.
pub fn time_zero(date_time: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    date_time
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(*date_time.offset()).single())
        .unwrap_or(date_time)
}

/// Convert an offset from `zero` into an instant.
pub fn to_instant(zero: DateTime<FixedOffset>, time: Seconds) -> DateTime<FixedOffset> {
    zero + Duration::seconds(i64::from(time))
}

/// Convert an instant into an offset from `zero`, saturating at the `i32`
/// range.
pub fn from_instant(zero: DateTime<FixedOffset>, instant: DateTime<FixedOffset>) -> Seconds {
    let secs = instant.signed_duration_since(zero).num_seconds();
    secs.clamp(i64::from(Seconds::MIN), i64::from(Seconds::MAX)) as Seconds
}

/// Convert a chrono duration into whole seconds, saturating.
pub fn duration_to_seconds(duration: Duration) -> Seconds {
    duration
        .num_seconds()
        .clamp(i64::from(Seconds::MIN), i64::from(Seconds::MAX)) as Seconds
}

fn parse_number(field: Option<&str>, range: std::ops::RangeInclusive<i32>) -> Option<i32> {
    let field = field?;
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i32 = field.parse().ok()?;
    range.contains(&value).then_some(value)
}

fn parse_two_digit_field(field: Option<&str>) -> Option<i32> {
    let field = field?;
    if field.len() != 2 {
        return None;
    }
    parse_number(Some(field), 0..=59)
}
