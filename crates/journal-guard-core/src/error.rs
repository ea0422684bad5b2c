//! Error types for Journal Guard Core.

use thiserror::Error;

use crate::types::Identity;

/// Core errors raised while validating ledger inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("{field} must be exactly {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Errors from the write-once authority gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    /// No authority has been configured yet.
    #[error("authority not verified")]
    NotVerified,

    /// The authority was already set; it is write-once.
    #[error("authority already set to {0}")]
    AlreadySet(Identity),

    /// The null identity cannot be the authority.
    #[error("null identity cannot be the authority")]
    NullIdentity,

    /// Caller is not the configured authority.
    #[error("caller {0} is not the authority")]
    NotAuthorized(Identity),
}
