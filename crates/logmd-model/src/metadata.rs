//! The root logger-metadata entity.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::table::TableDef;
use crate::timestamp::{LogTimestamp, TimeRange};
use crate::tz::LoggerTz;

/// Values matched against the environment line of a TOA5 data file to
/// decide which logger produced it. At least one field is always set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger_serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger_os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_sig: Option<String>,
}

impl EnvMatch {
    pub fn is_empty(&self) -> bool {
        self.station_name.is_none()
            && self.logger_model.is_none()
            && self.logger_serial.is_none()
            && self.logger_os.is_none()
            && self.program_name.is_none()
            && self.program_sig.is_none()
    }
}

/// A validated logger-metadata document. Constructed once by the validator
/// and immutable thereafter; reload wholesale when the source changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggerMetadata {
    pub logger_name: String,
    pub toa5_env_match: EnvMatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tz: Option<LoggerTz>,
    /// Earliest timestamp any record of this logger may carry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_datetime: Option<LogTimestamp>,
    /// Declared variants, insertion order preserved.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sensors: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub known_gaps: Vec<TimeRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skip_records: Vec<TimeRange>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub ignore_tables: BTreeSet<String>,
    pub tables: BTreeMap<String, TableDef>,
}

impl LoggerMetadata {
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    /// `ignore_tables` overrides `tables`: a name listed there is skipped
    /// by ingestion even when a definition exists for it.
    pub fn is_ignored(&self, table: &str) -> bool {
        self.ignore_tables.contains(table)
    }

    /// Tables that ingestion should actually process.
    pub fn active_tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables
            .values()
            .filter(|t| !self.is_ignored(&t.name))
    }
}
