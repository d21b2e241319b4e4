//! Structural validation against the embedded JSON Schema.
//!
//! The schema is closed-world: every object rejects unknown keys, every
//! string field carries a pattern or length bound, and keyed maps constrain
//! their property names. Passing it guarantees the document decodes into a
//! [`crate::RawDocument`]; everything the schema cannot express (cross
//! references, calendar validity, range ordering) is left to the semantic
//! pass.

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

/// The logger-metadata document schema, JSON Schema draft 2020-12.
pub const LOGGER_METADATA_SCHEMA: &str = include_str!("../schema/logger-metadata.schema.json");

#[derive(Debug, Error)]
pub enum StructuralError {
    /// The embedded schema itself failed to compile. Indicates a packaging
    /// problem, not a bad input document.
    #[error("metadata schema failed to compile: {0}")]
    Schema(String),
    #[error("structural violation at {path}: {reason}")]
    Violation { path: String, reason: String },
}

/// A compiled validator for logger-metadata documents.
pub struct StructuralValidator {
    validator: Validator,
}

impl StructuralValidator {
    pub fn new() -> Result<Self, StructuralError> {
        let schema: Value = serde_json::from_str(LOGGER_METADATA_SCHEMA)
            .map_err(|e| StructuralError::Schema(e.to_string()))?;
        let validator =
            jsonschema::validator_for(&schema).map_err(|e| StructuralError::Schema(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Check a parsed document, reporting the first violation with its JSON
    /// pointer location.
    pub fn validate(&self, document: &Value) -> Result<(), StructuralError> {
        self.validator.validate(document).map_err(|err| {
            let mut path = err.instance_path.to_string();
            if path.is_empty() {
                path.push('/');
            }
            StructuralError::Violation {
                path,
                reason: err.to_string(),
            }
        })
    }

    pub fn is_valid(&self, document: &Value) -> bool {
        self.validator.is_valid(document)
    }
}
