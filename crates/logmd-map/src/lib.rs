//! Derives renamed/filtered column views from logger table metadata.
//!
//! A view mapping pairs partial "old" column descriptors with sparse "new"
//! overlays; [`apply_view`] resolves each pair against a table's actual
//! columns and emits the projected descriptor list the ingester writes the
//! derived table with.

pub mod engine;
pub mod error;

pub use engine::apply_view;
pub use error::{MappingError, Result};
