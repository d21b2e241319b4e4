//! The raw decoded form of a structurally valid document.
//!
//! Fields whose validity the schema fully captures (intervals, lodt codes,
//! issue and mapping kinds) decode straight into their model enums. Fields
//! needing cross-reference or calendar checks (timestamps, timezone, value
//! types) stay as strings until the semantic pass converts them.

use std::collections::BTreeMap;

use serde::Deserialize;

use logmd_model::{BaseColumn, EnvMatch, Interval, KnownIssueType, Lodt, MappingType};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDocument {
    pub logger_name: String,
    pub toa5_env_match: EnvMatch,
    #[serde(default)]
    pub tz: Option<String>,
    #[serde(default)]
    pub min_datetime: Option<String>,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub sensors: BTreeMap<String, String>,
    #[serde(default)]
    pub known_gaps: Vec<RawTimeRange>,
    #[serde(default)]
    pub skip_records: Vec<RawTimeRange>,
    #[serde(default)]
    pub ignore_tables: Vec<String>,
    pub tables: BTreeMap<String, RawTable>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTimeRange {
    pub time: String,
    #[serde(default)]
    pub end: Option<String>,
    pub why: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTable {
    #[serde(default)]
    pub prikey: Option<usize>,
    #[serde(default)]
    pub interval: Option<Interval>,
    pub columns: Vec<RawColumn>,
    #[serde(default)]
    pub known_issues: Vec<RawKnownIssue>,
    #[serde(default)]
    pub mappings: BTreeMap<String, RawMapping>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawColumn {
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub prc: Option<String>,
    #[serde(default, rename = "type")]
    pub value_type: Option<String>,
    #[serde(default)]
    pub lodt: Option<Lodt>,
    #[serde(default)]
    pub var: Option<String>,
    #[serde(default)]
    pub plotgrp: Option<String>,
    #[serde(default)]
    pub sens: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawKnownIssue {
    #[serde(rename = "type")]
    pub issue_type: KnownIssueType,
    pub cols: Vec<String>,
    pub when: RawTimeRange,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMapping {
    #[serde(rename = "type")]
    pub mapping_type: MappingType,
    pub map: Vec<RawMapEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMapEntry {
    pub old: BaseColumn,
    pub new: BaseColumn,
}
