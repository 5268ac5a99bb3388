//! # Date Handling Utilities
//!
//! Log servers stamp records with ISO-8601 text. Some include an offset
//! (RFC 3339), others emit a naive `YYYY-MM-DDTHH:MM:SS[.ffffff]` produced
//! from a UTC clock. Both are accepted here and converted to a wall-clock
//! time for display.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use crate::text_processing::sanitize_for_terminal;

/// Formats accepted for timestamps that carry no offset. They are read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Display format for a log line's time column.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

/// Parses a record timestamp into a UTC instant.
///
/// # Example
/// ```rust
/// use logtide_util::date_handling::parse_timestamp;
///
/// assert!(parse_timestamp("2024-03-01T10:15:30Z").is_some());
/// assert!(parse_timestamp("2024-03-01T10:15:30.123456").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(date_time.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

/// Formats a record timestamp as `HH:MM:SS` in the given time zone.
///
/// Returns `None` when the text is not a recognizable timestamp.
pub fn format_time_of_day_in<Tz>(raw: &str, zone: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    parse_timestamp(raw).map(|instant| instant.with_timezone(zone).format(TIME_OF_DAY_FORMAT).to_string())
}

/// Formats a record timestamp as local wall-clock time, falling back to the
/// raw text when it cannot be parsed. The fallback is made terminal-safe.
pub fn display_time(raw: &str) -> String {
    format_time_of_day_in(raw, &Local).unwrap_or_else(|| sanitize_for_terminal(raw.trim()).into_owned())
}
