//! Timestamps and annotated time ranges.
//!
//! Logger documents write timestamps as `YYYY-MM-DD HH:MM:SS` with an
//! optional `Z` or `[+-]HH:MM` suffix. A timestamp without a suffix is local
//! to the logger's configured timezone; resolving it to an instant therefore
//! needs the [`LoggerTz`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::error::ModelError;
use crate::tz::LoggerTz;

const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A document timestamp, with or without a UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTimestamp {
    /// Carries an explicit offset (`...Z` or `...+02:00`).
    Zoned(DateTime<FixedOffset>),
    /// No offset; local to the logger's timezone.
    Local(NaiveDateTime),
}

impl LogTimestamp {
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidTimestamp(s.to_string());
        if let Some(base) = s.strip_suffix('Z') {
            let naive = NaiveDateTime::parse_from_str(base, LOCAL_FORMAT).map_err(|_| invalid())?;
            let utc = FixedOffset::east_opt(0).ok_or_else(invalid)?;
            return Ok(LogTimestamp::Zoned(
                utc.from_local_datetime(&naive).single().ok_or_else(invalid)?,
            ));
        }
        if s.len() > 19 {
            return DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z")
                .map(LogTimestamp::Zoned)
                .map_err(|_| invalid());
        }
        NaiveDateTime::parse_from_str(s, LOCAL_FORMAT)
            .map(LogTimestamp::Local)
            .map_err(|_| invalid())
    }

    /// The wall-clock part, dropping any offset.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            LogTimestamp::Zoned(dt) => dt.naive_local(),
            LogTimestamp::Local(naive) => *naive,
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            LogTimestamp::Zoned(dt) => Some(*dt.offset()),
            LogTimestamp::Local(_) => None,
        }
    }

    /// Resolve to a UTC instant, consulting the logger timezone for
    /// offset-less timestamps. `None` when no zone is available or the
    /// local time does not exist in it.
    pub fn instant(&self, tz: Option<&LoggerTz>) -> Option<DateTime<Utc>> {
        match self {
            LogTimestamp::Zoned(dt) => Some(dt.with_timezone(&Utc)),
            LogTimestamp::Local(naive) => tz?.resolve_local(*naive),
        }
    }

    /// Compare two timestamps when a zone-free comparison is meaningful:
    /// both zoned (compare instants) or both local (compare wall clocks).
    pub fn partial_cmp_plain(&self, other: &LogTimestamp) -> Option<Ordering> {
        match (self, other) {
            (LogTimestamp::Zoned(a), LogTimestamp::Zoned(b)) => Some(a.cmp(b)),
            (LogTimestamp::Local(a), LogTimestamp::Local(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl FromStr for LogTimestamp {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogTimestamp::parse(s)
    }
}

impl fmt::Display for LogTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogTimestamp::Zoned(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%:z")),
            LogTimestamp::Local(naive) => write!(f, "{}", naive.format(LOCAL_FORMAT)),
        }
    }
}

impl Serialize for LogTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One end of a [`TimeRange`]: a concrete timestamp or the literal `open`
/// ("from the beginning of records" as a start, "until now/forever" as an end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEndpoint {
    Open,
    At(LogTimestamp),
}

impl RangeEndpoint {
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        if s == "open" {
            Ok(RangeEndpoint::Open)
        } else {
            LogTimestamp::parse(s).map(RangeEndpoint::At)
        }
    }

    pub fn timestamp(&self) -> Option<&LogTimestamp> {
        match self {
            RangeEndpoint::Open => None,
            RangeEndpoint::At(ts) => Some(ts),
        }
    }
}

impl fmt::Display for RangeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeEndpoint::Open => write!(f, "open"),
            RangeEndpoint::At(ts) => write!(f, "{ts}"),
        }
    }
}

impl Serialize for RangeEndpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A known-gap / skip-records / known-issue annotation: a time range (or a
/// single instant when `end` is absent) with a mandatory justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub time: RangeEndpoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<RangeEndpoint>,
    pub why: String,
}

/// A range endpoint resolved against the logger timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    Unbounded,
    At(DateTime<Utc>),
    Unresolved,
}

impl TimeRange {
    /// A range with no `end` annotates a single instant (one record).
    pub fn is_instant(&self) -> bool {
        self.end.is_none()
    }

    /// True when both endpoints are concrete timestamps and `end` precedes
    /// `time`. Mixed zoned/local endpoints cannot be ordered without a zone
    /// and are not reported here; see [`TimeRange::is_inverted_in`].
    pub fn is_inverted(&self) -> bool {
        self.is_inverted_in(None)
    }

    /// Like [`TimeRange::is_inverted`], but mixed zoned/local endpoints are
    /// ordered by resolving both against the logger timezone. Without a
    /// zone, or when a local endpoint does not exist in it, mixed endpoints
    /// stay unordered and are not reported.
    pub fn is_inverted_in(&self, tz: Option<&LoggerTz>) -> bool {
        let (RangeEndpoint::At(start), Some(RangeEndpoint::At(end))) = (&self.time, &self.end)
        else {
            return false;
        };
        if let Some(ordering) = end.partial_cmp_plain(start) {
            return ordering == Ordering::Less;
        }
        match (end.instant(tz), start.instant(tz)) {
            (Some(end), Some(start)) => end < start,
            _ => false,
        }
    }

    fn resolve(endpoint: Option<&RangeEndpoint>, tz: Option<&LoggerTz>) -> Resolved {
        match endpoint {
            None | Some(RangeEndpoint::Open) => Resolved::Unbounded,
            Some(RangeEndpoint::At(ts)) => match ts.instant(tz) {
                Some(instant) => Resolved::At(instant),
                None => Resolved::Unresolved,
            },
        }
    }

    /// Whether two annotations overlap. Single instants collide only when
    /// equal; an instant strictly inside a range collides; two ranges
    /// collide when their interiors intersect (touching endpoints are fine).
    /// `None` when an endpoint cannot be resolved to an instant.
    pub fn overlaps(&self, other: &TimeRange, tz: Option<&LoggerTz>) -> Option<bool> {
        let s1 = Self::resolve(Some(&self.time), tz);
        let e1 = Self::resolve(self.end.as_ref(), tz);
        let s2 = Self::resolve(Some(&other.time), tz);
        let e2 = Self::resolve(other.end.as_ref(), tz);
        if [s1, e1, s2, e2].contains(&Resolved::Unresolved) {
            return None;
        }
        let at = |r: Resolved| match r {
            Resolved::At(t) => Some(t),
            _ => None,
        };
        Some(match (self.is_instant(), other.is_instant()) {
            (true, true) => at(s1) == at(s2),
            (true, false) => strictly_inside(at(s1), at(s2), at(e2)),
            (false, true) => strictly_inside(at(s2), at(s1), at(e1)),
            (false, false) => {
                let lower = later(at(s1), at(s2));
                let upper = earlier(at(e1), at(e2));
                match (lower, upper) {
                    (Some(lo), Some(hi)) => lo < hi,
                    // an unbounded side always reaches the other range
                    _ => true,
                }
            }
        })
    }
}

/// `start < point < end`, treating `None` as unbounded.
fn strictly_inside(
    point: Option<DateTime<Utc>>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> bool {
    let Some(point) = point else {
        // an "open" instant annotates the epoch boundary, not a real record
        return false;
    };
    start.is_none_or(|s| s < point) && end.is_none_or(|e| point < e)
}

fn later(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (x, None) | (None, x) => x,
    }
}

fn earlier(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (x, None) | (None, x) => x,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> LogTimestamp {
        LogTimestamp::parse(s).expect(s)
    }

    fn range(time: &str, end: Option<&str>) -> TimeRange {
        TimeRange {
            time: RangeEndpoint::parse(time).expect(time),
            end: end.map(|e| RangeEndpoint::parse(e).expect(e)),
            why: "test".to_string(),
        }
    }

    #[test]
    fn parse_forms() {
        assert!(matches!(ts("2021-06-19 15:00:00"), LogTimestamp::Local(_)));
        assert!(matches!(ts("2021-06-19 15:00:00Z"), LogTimestamp::Zoned(_)));
        let offset = ts("2021-06-19 15:00:00+02:00");
        assert_eq!(offset.to_string(), "2021-06-19 15:00:00+02:00");
        assert!(LogTimestamp::parse("2021-06-19T15:00:00").is_err());
        assert!(LogTimestamp::parse("2021-13-19 15:00:00").is_err());
        assert!(matches!(
            RangeEndpoint::parse("open").expect("open endpoint"),
            RangeEndpoint::Open
        ));
    }

    #[test]
    fn zoned_comparison_uses_instants() {
        let a = ts("2021-06-19 15:00:00+02:00");
        let b = ts("2021-06-19 14:00:00+01:00");
        assert_eq!(a.partial_cmp_plain(&b), Some(Ordering::Equal));
        let local = ts("2021-06-19 15:00:00");
        assert_eq!(a.partial_cmp_plain(&local), None);
    }

    #[test]
    fn inversion() {
        assert!(!range("2021-06-19 15:00:00Z", Some("2021-06-19 17:00:00Z")).is_inverted());
        assert!(range("2021-06-19 17:00:00Z", Some("2021-06-19 15:00:00Z")).is_inverted());
        // equal endpoints are a zero-length range, not an inversion
        assert!(!range("2021-06-19 15:00:00Z", Some("2021-06-19 15:00:00Z")).is_inverted());
        assert!(!range("2021-06-19 15:00:00Z", None).is_inverted());
        assert!(!range("open", Some("2021-06-19 15:00:00Z")).is_inverted());
    }

    #[test]
    fn inversion_with_zone() {
        // mixed zoned/local endpoints need a zone to be ordered
        let mixed = range("2021-06-19 17:00:00Z", Some("2021-06-19 15:00:00"));
        assert!(!mixed.is_inverted());
        assert!(!mixed.is_inverted_in(None));
        let utc: LoggerTz = "UTC".parse().expect("utc");
        assert!(mixed.is_inverted_in(Some(&utc)));

        let ordered = range("2021-06-19 15:00:00Z", Some("2021-06-19 17:00:00"));
        assert!(!ordered.is_inverted_in(Some(&utc)));

        // +03:00 puts the local 15:00 end at 12:00Z, before the zoned start
        let shifted: LoggerTz = "+03:00".parse().expect("offset");
        let tight = range("2021-06-19 13:00:00Z", Some("2021-06-19 15:00:00"));
        assert!(tight.is_inverted_in(Some(&shifted)));
        assert!(!tight.is_inverted_in(Some(&utc)));
    }

    #[test]
    fn overlap_rules() {
        let tz = None;
        let instant = range("2021-06-19 13:00:00Z", None);
        let gap = range("2021-06-19 15:00:00Z", Some("2021-06-19 17:00:00Z"));
        assert_eq!(instant.overlaps(&gap, tz), Some(false));
        assert_eq!(instant.overlaps(&instant.clone(), tz), Some(true));

        let inside = range("2021-06-19 16:00:00Z", None);
        assert_eq!(inside.overlaps(&gap, tz), Some(true));
        // boundary instants do not collide
        let boundary = range("2021-06-19 17:00:00Z", None);
        assert_eq!(boundary.overlaps(&gap, tz), Some(false));

        let touching = range("2021-06-19 17:00:00Z", Some("2021-06-19 19:00:00Z"));
        assert_eq!(gap.overlaps(&touching, tz), Some(false));
        let crossing = range("2021-06-19 16:00:00Z", Some("2021-06-19 19:00:00Z"));
        assert_eq!(gap.overlaps(&crossing, tz), Some(true));

        let open_tail = range("2021-06-19 16:30:00Z", Some("open"));
        assert_eq!(gap.overlaps(&open_tail, tz), Some(true));

        let local = range("2021-06-19 16:00:00", None);
        assert_eq!(local.overlaps(&gap, tz), None);
        let utc: LoggerTz = "UTC".parse().expect("utc");
        assert_eq!(local.overlaps(&gap, Some(&utc)), Some(true));
    }
}
