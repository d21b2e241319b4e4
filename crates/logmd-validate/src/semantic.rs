//! Semantic validation and model construction.
//!
//! Runs after the structural pass, so field shapes and lexical patterns are
//! already guaranteed. This pass checks everything a schema cannot: cross
//! references between sections, calendar validity of timestamps, range
//! ordering, and overlap between annotations. Violations are accumulated
//! and reported together rather than stopping at the first one, in a fixed
//! category order so output is stable across runs.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::warn;

use logmd_model::{
    ColumnDef, KnownIssue, LogTimestamp, LoggerMetadata, LoggerTz, MapEntry, ModelError,
    RangeEndpoint, TableDef, TimeRange, ValueType, ViewMapping, ident,
};

use crate::document::{RawDocument, RawTimeRange};

/// One semantic violation, with enough context to locate it in the source
/// document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticError {
    #[error("table {table:?} column {column:?} references undeclared variant {value:?}")]
    UnknownVariant {
        table: String,
        column: String,
        value: String,
    },
    #[error("table {table:?} column {column:?} references undeclared sensor {value:?}")]
    UnknownSensor {
        table: String,
        column: String,
        value: String,
    },
    #[error("table {table:?} declares column {name:?} more than once")]
    DuplicateColumn { table: String, name: String },
    #[error("table {table:?} prikey {index} is out of range for {column_count} columns")]
    InvalidPrimaryKey {
        table: String,
        index: usize,
        column_count: usize,
    },
    #[error("table {table:?} known issue names unknown column {name:?}")]
    UnknownIssueColumn { table: String, name: String },
    #[error("{location}: not a valid timestamp: {value:?}")]
    InvalidTimestamp { location: String, value: String },
    #[error("{location}: range ends before it starts")]
    InvertedTimeRange { location: String },
    #[error("not a known timezone or fixed offset: {value:?}")]
    UnknownTimezone { value: String },
    #[error("table {table:?} column {column:?} has unparseable type {value:?}")]
    InvalidValueType {
        table: String,
        column: String,
        value: String,
    },
    #[error("{location}: timestamp has no UTC offset and the logger declares no tz")]
    MissingTimezone { location: String },
    #[error("{location}: annotations overlap")]
    OverlappingTimeRanges { location: String },
    #[error("{location}: {source}")]
    InvalidToken {
        location: String,
        source: ModelError,
    },
}

/// Every semantic violation found in one pass over a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticReport {
    pub errors: Vec<SemanticError>,
}

impl SemanticReport {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

impl fmt::Display for SemanticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} semantic violation(s)", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n  - {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SemanticReport {}

/// Cross-check a structurally valid document and build the typed model.
///
/// Checks run in a fixed order: variant references, sensor references,
/// duplicate columns, primary-key range, known-issue columns, timestamp
/// parsing and range inversion, timezone resolution, value types, missing
/// timezone for offset-less timestamps, annotation overlap, and token rules
/// for documents assembled in code rather than loaded from disk. All
/// violations are collected; the model is only assembled when there are
/// none. Conditions that do not make the document unusable (an
/// `ignore_tables` entry that also has a definition, declared but unused
/// variants or sensors) are logged as warnings instead.
pub fn validate_semantics(doc: &RawDocument) -> Result<LoggerMetadata, SemanticReport> {
    let mut errors = Vec::new();

    for (tname, table) in &doc.tables {
        for col in &table.columns {
            if let Some(var) = &col.var
                && !doc.variants.contains(var)
            {
                errors.push(SemanticError::UnknownVariant {
                    table: tname.clone(),
                    column: col.name.clone(),
                    value: var.clone(),
                });
            }
        }
    }

    for (tname, table) in &doc.tables {
        for col in &table.columns {
            if let Some(sens) = &col.sens
                && !doc.sensors.contains_key(sens)
            {
                errors.push(SemanticError::UnknownSensor {
                    table: tname.clone(),
                    column: col.name.clone(),
                    value: sens.clone(),
                });
            }
        }
    }

    for (tname, table) in &doc.tables {
        let mut seen = BTreeSet::new();
        for col in &table.columns {
            if !seen.insert(col.name.as_str()) {
                errors.push(SemanticError::DuplicateColumn {
                    table: tname.clone(),
                    name: col.name.clone(),
                });
            }
        }
    }

    for (tname, table) in &doc.tables {
        if let Some(index) = table.prikey
            && index >= table.columns.len()
        {
            errors.push(SemanticError::InvalidPrimaryKey {
                table: tname.clone(),
                index,
                column_count: table.columns.len(),
            });
        }
    }

    for (tname, table) in &doc.tables {
        for issue in &table.known_issues {
            for name in &issue.cols {
                if !table.columns.iter().any(|c| c.name == *name) {
                    errors.push(SemanticError::UnknownIssueColumn {
                        table: tname.clone(),
                        name: name.clone(),
                    });
                }
            }
        }
    }

    // The timezone is resolved up front because the range checks below need
    // it to order mixed zoned/local endpoints; its failure is still reported
    // in its own category slot further down.
    let mut tz_error = None;
    let tz = doc.tz.as_deref().and_then(|s| match s.parse::<LoggerTz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            tz_error = Some(SemanticError::UnknownTimezone {
                value: s.to_string(),
            });
            None
        }
    });
    if let Some(tz) = &tz
        && !tz.is_utc()
    {
        warn!(%tz, "logger timezone is not UTC; offset-less timestamps resolve in that zone");
    }

    // Timestamp parsing. The structural pattern fixes the lexical shape but
    // not calendar validity, so parsing can still fail here. Offset-less
    // endpoints are remembered for the missing-timezone check below.
    let mut locals = Vec::new();
    let min_datetime = doc.min_datetime.as_deref().and_then(|s| {
        match LogTimestamp::parse(s) {
            Ok(ts) => {
                if matches!(ts, LogTimestamp::Local(_)) {
                    locals.push("min_datetime".to_string());
                }
                Some(ts)
            }
            Err(_) => {
                errors.push(SemanticError::InvalidTimestamp {
                    location: "min_datetime".to_string(),
                    value: s.to_string(),
                });
                None
            }
        }
    });
    let known_gaps = parse_ranges(
        &doc.known_gaps,
        "known_gaps",
        tz.as_ref(),
        &mut errors,
        &mut locals,
    );
    let skip_records = parse_ranges(
        &doc.skip_records,
        "skip_records",
        tz.as_ref(),
        &mut errors,
        &mut locals,
    );
    let mut issue_whens: BTreeMap<&str, Vec<Option<TimeRange>>> = BTreeMap::new();
    for (tname, table) in &doc.tables {
        let whens = table
            .known_issues
            .iter()
            .enumerate()
            .map(|(i, issue)| {
                parse_range(
                    &issue.when,
                    &format!("tables.{tname}.known_issues[{i}].when"),
                    tz.as_ref(),
                    &mut errors,
                    &mut locals,
                )
            })
            .collect();
        issue_whens.insert(tname.as_str(), whens);
    }

    for name in &doc.ignore_tables {
        if doc.tables.contains_key(name) {
            warn!(
                table = %name,
                "ignore_tables entry also has a table definition; it will not be ingested"
            );
        }
    }

    if let Some(err) = tz_error {
        errors.push(err);
    }

    let mut value_types: BTreeMap<(&str, usize), ValueType> = BTreeMap::new();
    for (tname, table) in &doc.tables {
        for (i, col) in table.columns.iter().enumerate() {
            let Some(spec) = &col.value_type else {
                continue;
            };
            match ValueType::parse(spec) {
                Ok(vt) => {
                    if vt == ValueType::TimestampNoTz && doc.tz.is_none() {
                        warn!(
                            table = %tname,
                            column = %col.name,
                            "column holds offset-less timestamps but no tz is declared"
                        );
                    }
                    value_types.insert((tname.as_str(), i), vt);
                }
                Err(_) => errors.push(SemanticError::InvalidValueType {
                    table: tname.clone(),
                    column: col.name.clone(),
                    value: spec.clone(),
                }),
            }
        }
    }

    if doc.tz.is_none() {
        for location in locals {
            errors.push(SemanticError::MissingTimezone { location });
        }
    }

    report_overlaps(&known_gaps, "known_gaps", tz.as_ref(), &mut errors);
    report_overlaps(&skip_records, "skip_records", tz.as_ref(), &mut errors);

    check_tokens(doc, &mut errors);

    if !errors.is_empty() {
        return Err(SemanticReport { errors });
    }

    // The first declared variant is always projected by variant maps, so
    // only later ones are worth flagging when unreferenced.
    for variant in doc.variants.iter().skip(1) {
        let used = doc
            .tables
            .values()
            .flat_map(|t| &t.columns)
            .any(|c| c.var.as_ref() == Some(variant));
        if !used {
            warn!(%variant, "declared variant is not referenced by any column");
        }
    }
    for sensor in doc.sensors.keys() {
        let used = doc
            .tables
            .values()
            .flat_map(|t| &t.columns)
            .any(|c| c.sens.as_ref() == Some(sensor));
        if !used {
            warn!(%sensor, "declared sensor is not referenced by any column");
        }
    }

    let tables = doc
        .tables
        .iter()
        .map(|(tname, table)| {
            let columns = table
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| ColumnDef {
                    name: col.name.clone(),
                    unit: col.unit.clone(),
                    prc: col.prc.clone(),
                    value_type: value_types.get(&(tname.as_str(), i)).copied(),
                    lodt: col.lodt,
                    var: col.var.clone(),
                    plotgrp: col.plotgrp.clone(),
                    sens: col.sens.clone(),
                    desc: col.desc.clone(),
                })
                .collect();
            let whens = issue_whens.remove(tname.as_str()).unwrap_or_default();
            let known_issues = table
                .known_issues
                .iter()
                .zip(whens)
                .filter_map(|(issue, when)| {
                    when.map(|when| KnownIssue {
                        issue_type: issue.issue_type,
                        cols: issue.cols.clone(),
                        when,
                    })
                })
                .collect();
            let mappings = table
                .mappings
                .iter()
                .map(|(mname, mapping)| {
                    let map = mapping
                        .map
                        .iter()
                        .map(|entry| MapEntry {
                            old: entry.old.clone(),
                            new: entry.new.clone(),
                        })
                        .collect();
                    (
                        mname.clone(),
                        ViewMapping {
                            name: mname.clone(),
                            mapping_type: mapping.mapping_type,
                            map,
                        },
                    )
                })
                .collect();
            (
                tname.clone(),
                TableDef {
                    name: tname.clone(),
                    prikey: table.prikey,
                    interval: table.interval,
                    columns,
                    known_issues,
                    mappings,
                },
            )
        })
        .collect();

    Ok(LoggerMetadata {
        logger_name: doc.logger_name.clone(),
        toa5_env_match: doc.toa5_env_match.clone(),
        tz,
        min_datetime,
        variants: doc.variants.clone(),
        sensors: doc.sensors.clone(),
        known_gaps: known_gaps.into_iter().flatten().collect(),
        skip_records: skip_records.into_iter().flatten().collect(),
        ignore_tables: doc.ignore_tables.iter().cloned().collect(),
        tables,
    })
}

fn parse_endpoint(
    value: &str,
    location: String,
    errors: &mut Vec<SemanticError>,
    locals: &mut Vec<String>,
) -> Option<RangeEndpoint> {
    match RangeEndpoint::parse(value) {
        Ok(endpoint) => {
            if matches!(endpoint, RangeEndpoint::At(LogTimestamp::Local(_))) {
                locals.push(location);
            }
            Some(endpoint)
        }
        Err(_) => {
            errors.push(SemanticError::InvalidTimestamp {
                location,
                value: value.to_string(),
            });
            None
        }
    }
}

fn parse_range(
    raw: &RawTimeRange,
    location: &str,
    tz: Option<&LoggerTz>,
    errors: &mut Vec<SemanticError>,
    locals: &mut Vec<String>,
) -> Option<TimeRange> {
    let time = parse_endpoint(&raw.time, format!("{location}.time"), errors, locals);
    let end = match &raw.end {
        None => Some(None),
        Some(end) => {
            parse_endpoint(end, format!("{location}.end"), errors, locals).map(Some)
        }
    };
    let range = TimeRange {
        time: time?,
        end: end?,
        why: raw.why.clone(),
    };
    if range.is_inverted_in(tz) {
        errors.push(SemanticError::InvertedTimeRange {
            location: location.to_string(),
        });
        return None;
    }
    Some(range)
}

fn parse_ranges(
    raws: &[RawTimeRange],
    section: &str,
    tz: Option<&LoggerTz>,
    errors: &mut Vec<SemanticError>,
    locals: &mut Vec<String>,
) -> Vec<Option<TimeRange>> {
    raws.iter()
        .enumerate()
        .map(|(i, raw)| parse_range(raw, &format!("{section}[{i}]"), tz, errors, locals))
        .collect()
}

/// Token-rule re-check. Documents read from disk already had these patterns
/// enforced by the structural schema, but a [`RawDocument`] can also be
/// assembled in code, so this pass stands on its own.
fn check_tokens(doc: &RawDocument, errors: &mut Vec<SemanticError>) {
    fn push(errors: &mut Vec<SemanticError>, location: String, source: ModelError) {
        errors.push(SemanticError::InvalidToken { location, source });
    }

    if !ident::is_identifier(&doc.logger_name) {
        push(
            errors,
            "logger_name".to_string(),
            ModelError::InvalidIdentifier(doc.logger_name.clone()),
        );
    }
    for (i, variant) in doc.variants.iter().enumerate() {
        if !ident::is_identifier(variant) {
            push(
                errors,
                format!("variants[{i}]"),
                ModelError::InvalidIdentifier(variant.clone()),
            );
        }
    }
    for sensor in doc.sensors.keys() {
        if !ident::is_identifier(sensor) {
            push(
                errors,
                format!("sensors.{sensor}"),
                ModelError::InvalidIdentifier(sensor.clone()),
            );
        }
    }
    for (tname, table) in &doc.tables {
        if !ident::is_identifier(tname) {
            push(
                errors,
                format!("tables.{tname}"),
                ModelError::InvalidIdentifier(tname.clone()),
            );
        }
        for (i, col) in table.columns.iter().enumerate() {
            if !ident::is_column_name(&col.name) {
                push(
                    errors,
                    format!("tables.{tname}.columns[{i}].name"),
                    ModelError::InvalidIdentifier(col.name.clone()),
                );
            }
            if let Some(unit) = &col.unit
                && !ident::is_unit(unit)
            {
                push(
                    errors,
                    format!("tables.{tname}.columns[{i}].unit"),
                    ModelError::InvalidUnit(unit.clone()),
                );
            }
            if let Some(prc) = &col.prc
                && !ident::is_prc(prc)
            {
                push(
                    errors,
                    format!("tables.{tname}.columns[{i}].prc"),
                    ModelError::InvalidPrc(prc.clone()),
                );
            }
        }
        for (mname, mapping) in &table.mappings {
            if !ident::is_identifier(mname) {
                push(
                    errors,
                    format!("tables.{tname}.mappings.{mname}"),
                    ModelError::InvalidIdentifier(mname.clone()),
                );
            }
            for (i, entry) in mapping.map.iter().enumerate() {
                if let Err(err) = entry.old.validate() {
                    push(
                        errors,
                        format!("tables.{tname}.mappings.{mname}.map[{i}].old"),
                        err,
                    );
                }
                if let Err(err) = entry.new.validate() {
                    push(
                        errors,
                        format!("tables.{tname}.mappings.{mname}.map[{i}].new"),
                        err,
                    );
                }
            }
        }
    }
}

fn report_overlaps(
    ranges: &[Option<TimeRange>],
    section: &str,
    tz: Option<&LoggerTz>,
    errors: &mut Vec<SemanticError>,
) {
    for i in 0..ranges.len() {
        for j in (i + 1)..ranges.len() {
            let (Some(a), Some(b)) = (&ranges[i], &ranges[j]) else {
                continue;
            };
            if a.overlaps(b, tz) == Some(true) {
                errors.push(SemanticError::OverlappingTimeRanges {
                    location: format!("{section}[{i}] and {section}[{j}]"),
                });
            }
        }
    }
}
