use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use thiserror::Error;

use crate::types::DEFAULT_TIMEZONE;

/// Errors from salat operations.
#[derive(Debug, Error, Clone)]
pub enum SalatError {
    /// Clock string did not match the two-field 24-hour pattern.
    #[error("Invalid clock time {value:?}: expected 24-hour \"HH:MM\"")]
    InvalidClockTime { value: String },

    /// Schedule carried a timezone the tz database does not know.
    #[error("Unknown timezone identifier {0:?}")]
    UnknownTimezone(String),

    /// The external notification sink rejected a request.
    #[error("Notification dispatch failed: {0}")]
    NotificationDispatch(String),
}

impl SalatError {
    /// Creates an `InvalidClockTime` error.
    pub fn invalid_clock(value: impl Into<String>) -> Self {
        Self::InvalidClockTime { value: value.into() }
    }
}

/// Parses a strict two-field 24-hour "HH:MM" clock string.
///
/// The Aladhan API may suffix a timezone abbreviation (e.g. "04:30 (WIB)");
/// anything after the first whitespace is ignored. Seconds are always zero.
///
/// # Errors
/// Returns `InvalidClockTime` if the string does not match the pattern.
pub fn parse_clock(value: &str) -> Result<NaiveTime, SalatError> {
    let token = value
        .split_whitespace()
        .next()
        .ok_or_else(|| SalatError::invalid_clock(value))?;

    let (hours, minutes) = token
        .split_once(':')
        .ok_or_else(|| SalatError::invalid_clock(value))?;

    let h: u32 = hours.parse().map_err(|_| SalatError::invalid_clock(value))?;
    let m: u32 = minutes.parse().map_err(|_| SalatError::invalid_clock(value))?;

    NaiveTime::from_hms_opt(h, m, 0).ok_or_else(|| SalatError::invalid_clock(value))
}

/// Projects a clock time onto a calendar date in a timezone, yielding the
/// absolute instant of that wall-clock moment.
///
/// Returns `None` for local times that do not exist on that date (DST
/// spring-forward gap); ambiguous times resolve to the earlier instant.
pub fn instant_on(clock: NaiveTime, date: NaiveDate, tz: Tz) -> Option<DateTime<Tz>> {
    date.and_time(clock).and_local_timezone(tz).earliest()
}

/// Resolves the schedule's timezone identifier, defaulting to
/// [`DEFAULT_TIMEZONE`] when absent.
///
/// # Errors
/// Returns `UnknownTimezone` if the identifier is not in the tz database.
pub fn resolve_timezone(identifier: Option<&str>) -> Result<Tz, SalatError> {
    let name = identifier.unwrap_or(DEFAULT_TIMEZONE);
    name.parse::<Tz>()
        .map_err(|_| SalatError::UnknownTimezone(name.to_string()))
}
