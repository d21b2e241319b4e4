//! Recording intervals and interval arithmetic.

use std::fmt;

use chrono::{Datelike, Duration, Months, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// The nominal spacing of a table's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "15min")]
    Min15,
    #[serde(rename = "30min")]
    Min30,
    #[serde(rename = "1hour")]
    Hour1,
    #[serde(rename = "1day")]
    Day1,
    #[serde(rename = "1week")]
    Week1,
    #[serde(rename = "1month")]
    Month1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Min15 => "15min",
            Interval::Min30 => "30min",
            Interval::Hour1 => "1hour",
            Interval::Day1 => "1day",
            Interval::Week1 => "1week",
            Interval::Month1 => "1month",
        }
    }

    /// Fixed duration of one interval step. `1month` has no fixed duration,
    /// use [`Interval::advance`] for calendar-aware stepping.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Interval::Min15 => Some(Duration::minutes(15)),
            Interval::Min30 => Some(Duration::minutes(30)),
            Interval::Hour1 => Some(Duration::hours(1)),
            Interval::Day1 => Some(Duration::days(1)),
            Interval::Week1 => Some(Duration::weeks(1)),
            Interval::Month1 => None,
        }
    }

    /// Truncate a timestamp to the start of the interval containing it.
    /// Weeks start on the ISO Monday, months on the first of the month.
    pub fn floor(&self, stamp: NaiveDateTime) -> NaiveDateTime {
        let date = stamp.date();
        let at_midnight = |d: chrono::NaiveDate| d.and_hms_opt(0, 0, 0).unwrap_or(stamp);
        match self {
            Interval::Min15 => date
                .and_hms_opt(stamp.hour(), stamp.minute() - stamp.minute() % 15, 0)
                .unwrap_or(stamp),
            Interval::Min30 => date
                .and_hms_opt(stamp.hour(), stamp.minute() - stamp.minute() % 30, 0)
                .unwrap_or(stamp),
            Interval::Hour1 => date.and_hms_opt(stamp.hour(), 0, 0).unwrap_or(stamp),
            Interval::Day1 => at_midnight(date),
            Interval::Week1 => {
                let monday =
                    date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
                at_midnight(monday)
            }
            Interval::Month1 => at_midnight(date.with_day(1).unwrap_or(date)),
        }
    }

    /// Advance a timestamp by one interval step.
    pub fn advance(&self, stamp: NaiveDateTime) -> NaiveDateTime {
        match self.duration() {
            Some(delta) => stamp + delta,
            None => stamp.checked_add_months(Months::new(1)).unwrap_or(stamp),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .expect("valid test datetime")
    }

    #[test]
    fn durations() {
        assert_eq!(Interval::Min15.duration(), Some(Duration::minutes(15)));
        assert_eq!(Interval::Week1.duration(), Some(Duration::weeks(1)));
        assert_eq!(Interval::Month1.duration(), None);
    }

    #[test]
    fn floor_minutes_and_hours() {
        assert_eq!(
            Interval::Min15.floor(dt(2023, 6, 23, 10, 59, 59)),
            dt(2023, 6, 23, 10, 45, 0)
        );
        assert_eq!(
            Interval::Min15.floor(dt(2023, 3, 10, 10, 15, 0)),
            dt(2023, 3, 10, 10, 15, 0)
        );
        assert_eq!(
            Interval::Min30.floor(dt(2023, 3, 10, 10, 20, 55)),
            dt(2023, 3, 10, 10, 0, 0)
        );
        assert_eq!(
            Interval::Hour1.floor(dt(2023, 3, 10, 10, 58, 22)),
            dt(2023, 3, 10, 10, 0, 0)
        );
    }

    #[test]
    fn floor_day_week_month() {
        assert_eq!(
            Interval::Day1.floor(dt(2023, 3, 10, 10, 58, 22)),
            dt(2023, 3, 10, 0, 0, 0)
        );
        // 2023-06-23 is a Friday; the ISO week starts Monday 2023-06-19
        assert_eq!(
            Interval::Week1.floor(dt(2023, 6, 23, 10, 59, 59)),
            dt(2023, 6, 19, 0, 0, 0)
        );
        assert_eq!(
            Interval::Month1.floor(dt(2023, 6, 23, 10, 59, 59)),
            dt(2023, 6, 1, 0, 0, 0)
        );
    }

    #[test]
    fn advance_steps() {
        assert_eq!(
            Interval::Hour1.advance(dt(2023, 6, 23, 10, 0, 0)),
            dt(2023, 6, 23, 11, 0, 0)
        );
        assert_eq!(
            Interval::Month1.advance(dt(2023, 1, 31, 0, 0, 0)),
            dt(2023, 2, 28, 0, 0, 0)
        );
    }

    #[test]
    fn serde_names() {
        let v: Interval = serde_json::from_str("\"15min\"").expect("decode interval");
        assert_eq!(v, Interval::Min15);
        assert_eq!(
            serde_json::to_string(&Interval::Month1).expect("encode interval"),
            "\"1month\""
        );
    }
}
