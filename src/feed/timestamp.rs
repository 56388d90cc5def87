//! Slack timestamp tokens to wall-clock time of day

use chrono::{Local, NaiveTime, TimeZone};
use serde::{Serialize, Serializer};
use std::fmt;
use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("invalid timestamp {token:?}: {source}")]
    InvalidSeconds {
        token: String,
        #[source]
        source: ParseIntError,
    },

    #[error("timestamp out of range: {0} seconds")]
    OutOfRange(i64),
}

/// Time of day rendered as zero-padded `HH:MM:SS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Shown when a message carries an unreadable timestamp
    pub fn fallback() -> Self {
        Self::default()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a token like `1530593277.000080` into local time of day
pub fn parse_timestamp(token: &str) -> Result<TimeOfDay, TimestampError> {
    parse_timestamp_in(token, &Local)
}

/// Parse a token into the time of day in `tz`.
///
/// Only the whole seconds before the first `.` are used.
pub fn parse_timestamp_in<Tz: TimeZone>(token: &str, tz: &Tz) -> Result<TimeOfDay, TimestampError> {
    let seconds = token.split('.').next().unwrap_or(token);
    let seconds: i64 = seconds
        .parse()
        .map_err(|source| TimestampError::InvalidSeconds {
            token: token.to_string(),
            source,
        })?;

    let at = tz
        .timestamp_opt(seconds, 0)
        .single()
        .ok_or(TimestampError::OutOfRange(seconds))?;

    Ok(TimeOfDay(at.time()))
}
