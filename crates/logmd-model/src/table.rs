//! Table definitions, known issues, and view mappings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::column::{BaseColumn, ColumnDef, ColumnHeader};
use crate::interval::Interval;
use crate::timestamp::TimeRange;

/// Classification of a known data-quality issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownIssueType {
    /// Values are wrong and must not be used.
    Bad,
    /// Values are suspicious but possibly real.
    Unusual,
}

/// A documented data-quality exception on specific columns of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnownIssue {
    #[serde(rename = "type")]
    pub issue_type: KnownIssueType,
    pub cols: Vec<String>,
    pub when: TimeRange,
}

/// Kind of a column mapping. Only renamed/filtered views exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingType {
    View,
}

/// One `{old, new}` pair of a view mapping: `old` selects a source column
/// (unset fields are wildcards), `new` is the sparse overlay emitted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapEntry {
    pub old: BaseColumn,
    pub new: BaseColumn,
}

/// A named derived view of a table's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewMapping {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type")]
    pub mapping_type: MappingType,
    pub map: Vec<MapEntry>,
}

/// A logged table's layout and annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDef {
    #[serde(skip)]
    pub name: String,
    /// Zero-based index of the table's uniqueness key column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prikey: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<Interval>,
    pub columns: Vec<ColumnDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub known_issues: Vec<KnownIssue>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub mappings: BTreeMap<String, ViewMapping>,
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn mapping(&self, name: &str) -> Option<&ViewMapping> {
        self.mappings.get(name)
    }

    /// The source-order column headers, the identity projection of this table.
    pub fn headers(&self) -> Vec<ColumnHeader> {
        self.columns.iter().map(ColumnDef::header).collect()
    }

    /// Variants referenced by this table's columns, in declaration order.
    pub fn used_variants<'a>(&self, declared: &'a [String]) -> Vec<&'a str> {
        declared
            .iter()
            .filter(|v| self.columns.iter().any(|c| c.var.as_deref() == Some(v)))
            .map(String::as_str)
            .collect()
    }

    /// The header/index projections a data file for this table may present.
    ///
    /// When no column is variant-specific there is a single projection of
    /// all columns. Otherwise one projection per relevant variant (the first
    /// declared variant is always relevant, the rest only when referenced),
    /// each selecting the columns belonging to that variant, plus a final
    /// full-column projection so previously exported files can be
    /// re-imported.
    pub fn variant_map(&self, declared: &[String]) -> Vec<(Vec<ColumnHeader>, Vec<usize>)> {
        let full: (Vec<ColumnHeader>, Vec<usize>) = (
            self.headers(),
            (0..self.columns.len()).collect(),
        );
        let used = self.used_variants(declared);
        if used.is_empty() {
            return vec![full];
        }
        let mut projections = Vec::new();
        for variant in declared
            .iter()
            .enumerate()
            .filter(|(i, v)| *i == 0 || used.contains(&v.as_str()))
            .map(|(_, v)| v.as_str())
        {
            let (headers, indices): (Vec<_>, Vec<_>) = self
                .columns
                .iter()
                .enumerate()
                .filter(|(_, c)| c.var.is_none() || c.var.as_deref() == Some(variant))
                .map(|(i, c)| (c.header(), i))
                .unzip();
            projections.push((headers, indices));
        }
        projections.push(full);
        projections
    }

    /// The SQL-safe table name, qualified by the logger name.
    pub fn sql_name(&self, logger_name: &str) -> String {
        format!("{logger_name}_{}", self.name).to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, var: Option<&str>) -> ColumnDef {
        ColumnDef {
            name: name.to_string(),
            unit: None,
            prc: None,
            value_type: None,
            lodt: None,
            var: var.map(str::to_string),
            plotgrp: None,
            sens: None,
            desc: None,
        }
    }

    fn table(columns: Vec<ColumnDef>) -> TableDef {
        TableDef {
            name: "Hourly".to_string(),
            prikey: Some(0),
            interval: Some(Interval::Hour1),
            columns,
            known_issues: Vec::new(),
            mappings: BTreeMap::new(),
        }
    }

    #[test]
    fn variant_map_without_variants_is_identity() {
        let t = table(vec![col("TIMESTAMP", None), col("RECORD", None)]);
        let maps = t.variant_map(&[]);
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0].1, vec![0, 1]);
        assert_eq!(maps[0].0, t.headers());
    }

    #[test]
    fn variant_map_projects_per_variant() {
        let declared = vec!["abc".to_string(), "def".to_string()];
        let t = table(vec![
            col("TIMESTAMP", None),
            col("AirT_C(42)", Some("abc")),
            col("AirT_C_Avg", Some("def")),
            col("RelHumid", None),
        ]);
        assert_eq!(t.used_variants(&declared), vec!["abc", "def"]);
        let maps = t.variant_map(&declared);
        // abc, def, then the full projection
        assert_eq!(maps.len(), 3);
        assert_eq!(maps[0].1, vec![0, 1, 3]);
        assert_eq!(maps[1].1, vec![0, 2, 3]);
        assert_eq!(maps[2].1, vec![0, 1, 2, 3]);
    }

    #[test]
    fn first_variant_always_projected() {
        let declared = vec!["abc".to_string(), "def".to_string()];
        let t = table(vec![col("TIMESTAMP", None), col("X_Avg", Some("def"))]);
        let maps = t.variant_map(&declared);
        // abc (first, no def-only columns), def, full
        assert_eq!(maps.len(), 3);
        assert_eq!(maps[0].1, vec![0]);
        assert_eq!(maps[1].1, vec![0, 1]);
        assert_eq!(maps[2].1, vec![0, 1]);
    }
}
