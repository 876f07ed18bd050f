//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised while parsing or validating core values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("unknown scope type: {0}")]
    UnknownScope(String),

    #[error("invalid delegation id: {0}")]
    InvalidDelegationId(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
