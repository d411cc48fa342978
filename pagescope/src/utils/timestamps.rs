//! Timestamp helpers for history records.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use thiserror::Error;

/// Layout used for history timestamps, e.g. `2024-03-01 14:05:09`.
pub const HISTORY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur during timestamp parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// The timestamp string is empty.
    #[error("Empty timestamp string")]
    EmptyString,

    /// The timestamp value does not follow [`HISTORY_FORMAT`].
    #[error("Invalid timestamp: {0}")]
    InvalidFormat(String),
}

/// Current local time formatted with [`HISTORY_FORMAT`].
#[must_use]
pub fn local_timestamp() -> String {
    format_timestamp(&Local::now())
}

/// Formats any zoned time with [`HISTORY_FORMAT`].
#[must_use]
pub fn format_timestamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format(HISTORY_FORMAT).to_string()
}

/// Parses a history timestamp. The result carries no zone.
///
/// # Errors
///
/// Returns `TimestampError` for blank or malformed input.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, TimestampError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimestampError::EmptyString);
    }
    NaiveDateTime::parse_from_str(trimmed, HISTORY_FORMAT)
        .map_err(|_| TimestampError::InvalidFormat(trimmed.to_string()))
}
