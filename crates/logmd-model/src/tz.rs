//! Logger timezone: an IANA zone name or a fixed UTC offset.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use crate::error::ModelError;

/// The timezone a logger's local timestamps are recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerTz {
    /// An IANA zone such as `Europe/Berlin` (DST-aware).
    Named(Tz),
    /// A fixed offset such as `-04:30`.
    Fixed(FixedOffset),
}

impl LoggerTz {
    /// Resolve a zone-less local timestamp to a UTC instant. Returns `None`
    /// for local times that do not exist in a DST-gap; ambiguous times
    /// resolve to the earlier instant.
    pub fn resolve_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            LoggerTz::Named(tz) => tz
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            LoggerTz::Fixed(offset) => offset
                .from_local_datetime(&local)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// True when this zone is UTC (by name or zero offset). Tables with
    /// zone-less timestamp columns in a non-UTC zone deserve a warning.
    pub fn is_utc(&self) -> bool {
        match self {
            LoggerTz::Named(tz) => *tz == Tz::UTC,
            LoggerTz::Fixed(offset) => offset.fix().local_minus_utc() == 0,
        }
    }
}

impl FromStr for LoggerTz {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(offset) = parse_fixed_offset(s) {
            return Ok(LoggerTz::Fixed(offset));
        }
        s.parse::<Tz>()
            .map(LoggerTz::Named)
            .map_err(|_| ModelError::InvalidTimezone(s.to_string()))
    }
}

/// Parse a `[+-]HH:MM` offset string.
fn parse_fixed_offset(s: &str) -> Option<FixedOffset> {
    let bytes = s.as_bytes();
    if bytes.len() != 6 || !(bytes[0] == b'+' || bytes[0] == b'-') || bytes[3] != b':' {
        return None;
    }
    let hours: i32 = s.get(1..3)?.parse().ok()?;
    let minutes: i32 = s.get(4..6)?.parse().ok()?;
    let seconds = hours * 3600 + minutes * 60;
    if bytes[0] == b'-' {
        FixedOffset::west_opt(seconds)
    } else {
        FixedOffset::east_opt(seconds)
    }
}

impl fmt::Display for LoggerTz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerTz::Named(tz) => write!(f, "{}", tz.name()),
            LoggerTz::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl Serialize for LoggerTz {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
