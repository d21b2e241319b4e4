//! Typed model for datalogger station metadata.
//!
//! The entities here are the in-memory form of a validated metadata
//! document: the logger's identity, timezone, sensors, table layouts,
//! column definitions, and known data-quality exceptions. Construction
//! happens in `logmd-validate`; everything here is immutable after that.

pub mod column;
pub mod datatypes;
pub mod error;
pub mod ident;
pub mod interval;
pub mod metadata;
pub mod table;
pub mod timestamp;
pub mod tz;

pub use column::{BaseColumn, ColumnDef, ColumnHeader, Lodt};
pub use datatypes::ValueType;
pub use error::ModelError;
pub use interval::Interval;
pub use metadata::{EnvMatch, LoggerMetadata};
pub use table::{KnownIssue, KnownIssueType, MapEntry, MappingType, TableDef, ViewMapping};
pub use timestamp::{LogTimestamp, RangeEndpoint, TimeRange};
pub use tz::LoggerTz;
