//! Validation and loading of logger-metadata documents.
//!
//! Loading is a three-stage pipeline: parse the JSON, check it against the
//! embedded closed-world schema ([`StructuralValidator`]), then run the
//! cross-reference pass ([`validate_semantics`]) which either reports every
//! violation it finds or hands back the typed
//! [`LoggerMetadata`](logmd_model::LoggerMetadata) model.

pub mod document;
pub mod semantic;
pub mod structural;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use logmd_model::LoggerMetadata;

pub use document::RawDocument;
pub use semantic::{SemanticError, SemanticReport, validate_semantics};
pub use structural::{LOGGER_METADATA_SCHEMA, StructuralError, StructuralValidator};

/// Why a metadata file could not be loaded. The stages are ordered: a
/// document only reaches semantic validation once it is valid JSON and
/// structurally sound.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Semantic(#[from] SemanticReport),
}

/// Load, validate, and decode one logger-metadata file.
pub fn load_logger_metadata(path: impl AsRef<Path>) -> Result<LoggerMetadata, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_logger_metadata_slice(&bytes)
}

/// Validate and decode an in-memory logger-metadata document.
pub fn load_logger_metadata_slice(bytes: &[u8]) -> Result<LoggerMetadata, LoadError> {
    let value: Value = serde_json::from_slice(bytes)?;
    StructuralValidator::new()?.validate(&value)?;
    let raw: RawDocument = serde_json::from_value(value)?;
    Ok(validate_semantics(&raw)?)
}
