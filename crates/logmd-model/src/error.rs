use thiserror::Error;

/// Errors raised while converting raw document fields into model types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("not a valid identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("not a valid unit string: {0:?}")]
    InvalidUnit(String),
    #[error("not a valid process code: {0:?}")]
    InvalidPrc(String),
    #[error("not a valid timestamp: {0:?}")]
    InvalidTimestamp(String),
    #[error("not a known timezone or fixed offset: {0:?}")]
    InvalidTimezone(String),
    #[error("failed to parse value type {0:?}")]
    InvalidValueType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
