//! Column definitions and column identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::datatypes::ValueType;
use crate::error::ModelError;
use crate::ident;

/// The logger's original on-wire data type for a column (Campbell CR-series).
/// The manuals don't document the internal representation of `TS`/`Int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lodt {
    FP2,
    IEEE4,
    TS,
    Int,
}

impl Lodt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lodt::FP2 => "FP2",
            Lodt::IEEE4 => "IEEE4",
            Lodt::TS => "TS",
            Lodt::Int => "Int",
        }
    }
}

impl fmt::Display for Lodt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A column's identity as it appears in a data-file header: name, unit, and
/// process code, with absent fields as empty strings. Two columns are "the
/// same column" for matching and duplicate detection when their headers are
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ColumnHeader {
    pub name: String,
    pub unit: String,
    pub prc: String,
}

/// A partial column descriptor: just the header fields, each optional except
/// the name. Used as the `old`/`new` sides of a view-mapping entry and as
/// the engine's output descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaseColumn {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prc: Option<String>,
}

impl BaseColumn {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: None,
            prc: None,
        }
    }

    pub fn header(&self) -> ColumnHeader {
        ColumnHeader {
            name: self.name.clone(),
            unit: self.unit.clone().unwrap_or_default(),
            prc: self.prc.clone().unwrap_or_default(),
        }
    }

    /// Lowercased SQL-safe name: a `(42)` suffix becomes `_42`.
    pub fn sql_name(&self) -> String {
        sql_name(&self.name)
    }

    /// Token-rule check for descriptors assembled in code; loaded documents
    /// have these patterns enforced structurally before decoding.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !ident::is_column_name(&self.name) {
            return Err(ModelError::InvalidIdentifier(self.name.clone()));
        }
        if let Some(unit) = &self.unit
            && !ident::is_unit(unit)
        {
            return Err(ModelError::InvalidUnit(unit.clone()));
        }
        if let Some(prc) = &self.prc
            && !ident::is_prc(prc)
        {
            return Err(ModelError::InvalidPrc(prc.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for BaseColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(unit) = &self.unit {
            write!(f, "[{unit}]")?;
        }
        if let Some(prc) = &self.prc {
            write!(f, "/{prc}")?;
        }
        Ok(())
    }
}

/// A full column definition from a table's `columns` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prc: Option<String>,
    /// Logical value type, e.g. `Num(5,2)`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lodt: Option<Lodt>,
    /// Variant this column belongs to; `None` means all variants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plotgrp: Option<String>,
    /// Sensor producing this column's values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sens: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl ColumnDef {
    pub fn header(&self) -> ColumnHeader {
        ColumnHeader {
            name: self.name.clone(),
            unit: self.unit.clone().unwrap_or_default(),
            prc: self.prc.clone().unwrap_or_default(),
        }
    }

    pub fn base(&self) -> BaseColumn {
        BaseColumn {
            name: self.name.clone(),
            unit: self.unit.clone(),
            prc: self.prc.clone(),
        }
    }

    pub fn sql_name(&self) -> String {
        sql_name(&self.name)
    }

    /// Whether this column matches a partial descriptor: the name must be
    /// equal, and `unit`/`prc` must be equal when the descriptor sets them
    /// (unset fields are wildcards).
    pub fn matches(&self, pattern: &BaseColumn) -> bool {
        self.name == pattern.name
            && pattern
                .unit
                .as_ref()
                .is_none_or(|u| self.unit.as_ref() == Some(u))
            && pattern
                .prc
                .as_ref()
                .is_none_or(|p| self.prc.as_ref() == Some(p))
    }
}

fn sql_name(name: &str) -> String {
    let lowered = match name.strip_suffix(')').and_then(|rest| rest.rsplit_once('(')) {
        Some((base, digits)) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{base}_{digits}")
        }
        _ => name.to_string(),
    };
    lowered.to_lowercase()
}
