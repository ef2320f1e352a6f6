//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic business-rule failures only (bad quantities, malformed
/// identifiers, unknown lines). Store and network failures have their own
/// types in the infrastructure crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A supplied value broke a cart or checkout rule (zero quantity,
    /// negative price, unknown payment method).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier string did not parse as a numeric id.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The addressed cart line or record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A category string was not one of the known catalog domains.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
