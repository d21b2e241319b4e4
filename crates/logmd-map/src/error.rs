use logmd_model::BaseColumn;
use thiserror::Error;

/// Errors from applying a view mapping to a table. Scoped to one
/// `apply_view` call; the loaded metadata stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("mapping {mapping:?}: 'old' descriptor {old} matches no column of table {table:?}")]
    NoSuchColumn {
        table: String,
        mapping: String,
        old: BaseColumn,
    },
    /// Cannot happen for tables that passed semantic validation (column
    /// names are unique per table); guarded anyway.
    #[error(
        "mapping {mapping:?}: 'old' descriptor {old} matches more than one column of table {table:?}"
    )]
    AmbiguousColumn {
        table: String,
        mapping: String,
        old: BaseColumn,
    },
    #[error("mapping {mapping:?}: output column name {name:?} emitted more than once")]
    AmbiguousNewName { mapping: String, name: String },
    #[error(
        "mapping {mapping:?}: output column name {name:?} is already a column of table {table:?}"
    )]
    ShadowedColumn {
        table: String,
        mapping: String,
        name: String,
    },
}

pub type Result<T> = std::result::Result<T, MappingError>;
