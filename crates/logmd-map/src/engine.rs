//! Applies a view mapping to a table definition.

use std::collections::BTreeSet;

use logmd_model::{BaseColumn, TableDef, ViewMapping};

use crate::error::{MappingError, Result};

/// Project a table's columns through a view mapping.
///
/// For each `{old, new}` entry, in mapping order, the unique source column
/// matching `old` is found (`unit`/`prc` are compared only when `old` sets
/// them) and `new` is emitted overlaid on it: `new.name` always, `unit` and
/// `prc` from `new` when present, otherwise inherited from the match. The
/// view is a projection: source columns not referenced by any entry do not
/// appear, and output order is the mapping's, not the table's. A `new` name
/// that is already the name of a different source column is rejected; an
/// entry renaming a column to itself is fine.
pub fn apply_view(table: &TableDef, mapping: &ViewMapping) -> Result<Vec<BaseColumn>> {
    let mut seen_names = BTreeSet::new();
    let mut view = Vec::with_capacity(mapping.map.len());
    for entry in &mapping.map {
        let mut matches = table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.matches(&entry.old));
        let (mi, matched) = matches.next().ok_or_else(|| MappingError::NoSuchColumn {
            table: table.name.clone(),
            mapping: mapping.name.clone(),
            old: entry.old.clone(),
        })?;
        if matches.next().is_some() {
            return Err(MappingError::AmbiguousColumn {
                table: table.name.clone(),
                mapping: mapping.name.clone(),
                old: entry.old.clone(),
            });
        }
        let projected = BaseColumn {
            name: entry.new.name.clone(),
            unit: entry.new.unit.clone().or_else(|| matched.unit.clone()),
            prc: entry.new.prc.clone().or_else(|| matched.prc.clone()),
        };
        if table
            .columns
            .iter()
            .enumerate()
            .any(|(i, c)| i != mi && c.name == projected.name)
        {
            return Err(MappingError::ShadowedColumn {
                table: table.name.clone(),
                mapping: mapping.name.clone(),
                name: projected.name,
            });
        }
        if !seen_names.insert(projected.name.clone()) {
            return Err(MappingError::AmbiguousNewName {
                mapping: mapping.name.clone(),
                name: projected.name,
            });
        }
        view.push(projected);
    }
    Ok(view)
}
