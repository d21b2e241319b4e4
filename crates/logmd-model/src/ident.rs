//! Token-level rules for identifiers, column names, units, and process codes.
//!
//! These mirror the patterns enforced by the structural schema so the model
//! can be checked for validity even when it was assembled in code rather
//! than loaded from a document.

use std::sync::LazyLock;

use regex::Regex;

/// Identifier: letter or underscore followed by 1..=254 word characters.
pub static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{1,254}$").expect("identifier regex"));

/// Column name: identifier with an optional parenthesized 1-3 digit suffix,
/// used for repeated-sensor columns such as `AirT_C(42)`. The parens become
/// underscores in SQL names, so three digits plus an underscore leaves 250
/// characters for the base name.
pub static COLUMN_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{1,250}(\(\d{1,3}\))?$").expect("column name regex")
});

/// Unit: printable ASCII without backslashes or square brackets, up to 64 chars.
pub static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"^[ !"#$%&'()*+,\-./0-9:;<=>?@A-Z^_`a-z{|}~]{0,64}$"##).expect("unit regex")
});

/// Process code ("Avg", "Min", "Smp", ...), kept strict per the logger manuals.
pub static PRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_0-9\- .]{0,32}$").expect("prc regex"));

pub fn is_identifier(s: &str) -> bool {
    IDENT_RE.is_match(s)
}

pub fn is_column_name(s: &str) -> bool {
    COLUMN_NAME_RE.is_match(s)
}

pub fn is_unit(s: &str) -> bool {
    UNIT_RE.is_match(s)
}

pub fn is_prc(s: &str) -> bool {
    PRC_RE.is_match(s)
}
