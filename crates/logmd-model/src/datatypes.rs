//! Logical value types for logger columns.
//!
//! Column `type` strings follow a small convention (`Num(5,2)`, `NonNegInt`,
//! `TimestampNoTz`, ...) that the structural schema deliberately leaves as
//! free text; parsing and per-value checks live here. Values read from data
//! files are always strings, so [`ValueType::check`] works on `&str`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::ModelError;

static PARSE_NUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Num(?:\((\d+)(?:,(\d+))?\))?$").expect("Num type regex"));

static TIMESTAMP_NOTZ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d\d-\d\d \d\d:\d\d:\d\d$").expect("timestamp regex")
});

// SQLite datetime functions require minutes in the offset, so we do too.
static TIMESTAMP_WITHTZ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d\d-\d\d \d\d:\d\d:\d\d(?: ?[-+]\d\d:\d\d|Z)$").expect("timestamp regex")
});

/// Logical type of a column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Numeric with a maximum precision (total significant digits) and scale
    /// (digits right of the decimal point). `Num(p)` selects scale 0;
    /// bare `Num` accepts any precision and scale.
    Num {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    /// Non-negative 31-bit integer (and NaN).
    NonNegInt,
    /// Signed 64-bit integer (and NaN).
    BigInt,
    /// `YYYY-MM-DD HH:MM:SS` without a zone specifier.
    TimestampNoTz,
    /// `YYYY-MM-DD HH:MM:SS` with a `Z` or `[+-]HH:MM` zone specifier.
    TimestampWithTz,
    /// Accepts only `NaN`.
    OnlyNan,
    /// Placeholder for columns whose data is never used.
    Ignore,
}

impl ValueType {
    /// Parse a convention string such as `Num(5,2)` or `NonNegInt`.
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        match s {
            "NonNegInt" => return Ok(ValueType::NonNegInt),
            "BigInt" => return Ok(ValueType::BigInt),
            "TimestampNoTz" => return Ok(ValueType::TimestampNoTz),
            "TimestampWithTz" => return Ok(ValueType::TimestampWithTz),
            "OnlyNan" => return Ok(ValueType::OnlyNan),
            "Ignore" => return Ok(ValueType::Ignore),
            _ => {}
        }
        let caps = PARSE_NUM_RE
            .captures(s)
            .ok_or_else(|| ModelError::InvalidValueType(s.to_string()))?;
        let precision = caps
            .get(1)
            .map(|m| m.as_str().parse::<u32>())
            .transpose()
            .map_err(|_| ModelError::InvalidValueType(s.to_string()))?;
        let scale = caps
            .get(2)
            .map(|m| m.as_str().parse::<u32>())
            .transpose()
            .map_err(|_| ModelError::InvalidValueType(s.to_string()))?;
        if let Some(p) = precision {
            if !(1..=1000).contains(&p) {
                return Err(ModelError::InvalidValueType(s.to_string()));
            }
            if scale.is_some_and(|sc| sc > p) {
                return Err(ModelError::InvalidValueType(s.to_string()));
            }
        } else if scale.is_some() {
            return Err(ModelError::InvalidValueType(s.to_string()));
        }
        Ok(ValueType::Num { precision, scale })
    }

    /// Whether a raw string value conforms to this type. All numeric types
    /// also accept `NaN` (case-insensitive), the logger's missing-value marker.
    pub fn check(&self, value: &str) -> bool {
        match self {
            ValueType::Num { precision, scale } => {
                value.eq_ignore_ascii_case("nan") || check_num(value, *precision, *scale)
            }
            ValueType::NonNegInt => {
                value.eq_ignore_ascii_case("nan")
                    || (is_plain_int(value, false)
                        && value.parse::<u64>().is_ok_and(|v| v < 1 << 31))
            }
            ValueType::BigInt => {
                value.eq_ignore_ascii_case("nan")
                    || (is_plain_int(value, true) && value.parse::<i64>().is_ok())
            }
            ValueType::TimestampNoTz => TIMESTAMP_NOTZ_RE.is_match(value),
            ValueType::TimestampWithTz => TIMESTAMP_WITHTZ_RE.is_match(value),
            ValueType::OnlyNan => value.eq_ignore_ascii_case("nan"),
            ValueType::Ignore => true,
        }
    }
}

/// Decimal digits without leading zeros, optionally signed.
fn is_plain_int(value: &str, signed: bool) -> bool {
    let digits = match value.strip_prefix('-') {
        Some(rest) if signed => rest,
        Some(_) => return false,
        None => value,
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    // no leading zeros, but "0" itself is fine
    !(digits.len() > 1 && digits.starts_with('0'))
}

fn check_num(value: &str, precision: Option<u32>, scale: Option<u32>) -> bool {
    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let digits_ok = int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.is_none_or(|f| f.bytes().all(|b| b.is_ascii_digit()));
    if !digits_ok {
        return false;
    }
    // "", "-", ".", "-." are not numbers
    if int_part.is_empty() && frac_part.is_none_or(str::is_empty) {
        return false;
    }
    let Some(p) = precision else {
        return true;
    };
    let s = scale.unwrap_or(0);
    // a zero budget still admits literal zeros, e.g. "0.5" for Num(1,1);
    // saturation covers hand-built values with scale > precision
    let int_budget = p.saturating_sub(s);
    let int_ok = if int_budget == 0 {
        int_part.bytes().all(|b| b == b'0')
    } else {
        int_part.len() as u32 <= int_budget
    };
    let frac_ok = match frac_part {
        None => true,
        Some(f) if s == 0 => f.bytes().all(|b| b == b'0'),
        Some(f) => f.len() as u32 <= s,
    };
    int_ok && frac_ok
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Num {
                precision: None, ..
            } => write!(f, "Num"),
            ValueType::Num {
                precision: Some(p),
                scale: None,
            } => write!(f, "Num({p})"),
            ValueType::Num {
                precision: Some(p),
                scale: Some(s),
            } => write!(f, "Num({p},{s})"),
            ValueType::NonNegInt => write!(f, "NonNegInt"),
            ValueType::BigInt => write!(f, "BigInt"),
            ValueType::TimestampNoTz => write!(f, "TimestampNoTz"),
            ValueType::TimestampWithTz => write!(f, "TimestampWithTz"),
            ValueType::OnlyNan => write!(f, "OnlyNan"),
            ValueType::Ignore => write!(f, "Ignore"),
        }
    }
}

impl FromStr for ValueType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueType::parse(s)
    }
}

impl Serialize for ValueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
