//! Error types for the permissions module.

use journal_guard_core::{AuthorityError, CoreError, Height, Identity};
use thiserror::Error;

/// Errors that can occur during permission and grantee-registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermsError {
    /// Authority gate failed (unset authority, or caller is not the authority).
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    /// Grantee is the owner or the null identity.
    #[error("invalid grantee: {0}")]
    InvalidGrantee(Identity),

    /// Level outside `1..=3`.
    #[error("invalid permission level: {0}")]
    InvalidLevel(u8),

    /// Expiry is not strictly in the future.
    #[error("expiry {expires_at} must be after current height {now}")]
    InvalidExpiry { expires_at: Height, now: Height },

    /// The entry already has the maximum number of active shares.
    #[error("entry already shared with the maximum of {max} grantees")]
    MaxSharesExceeded { max: u32 },

    /// A permission for this (owner, entry, grantee) already exists, active or not.
    #[error("permission already granted")]
    AlreadyGranted,

    /// Grantee is not a verified, active therapist.
    #[error("grantee not verified: {0}")]
    GranteeNotVerified(Identity),

    /// No active permission for this (owner, entry, grantee).
    #[error("access not granted")]
    NotGranted,

    /// The permission exists and is active but its expiry has passed.
    #[error("permission expired at {expires_at}")]
    PermissionExpired { expires_at: Height },

    /// Update or revoke on a permission that was never granted.
    #[error("permission not found")]
    PermissionNotFound,

    /// Update or revoke on a revoked permission.
    #[error("permission has been revoked")]
    PermissionRevoked,

    /// Suspend on an identity with no registry record.
    #[error("therapist not found: {0}")]
    TherapistNotFound(Identity),

    /// License hash of the wrong length.
    #[error("invalid license: {0}")]
    InvalidLicense(CoreError),

    /// Share cap of zero.
    #[error("max shares per entry must be greater than zero")]
    InvalidMaxShares,
}

impl PermsError {
    /// Stable numeric code reported to the executor.
    pub fn code(&self) -> u32 {
        match self {
            PermsError::Authority(AuthorityError::NotVerified) => 115,
            PermsError::Authority(_) => 100,
            PermsError::PermissionNotFound => 102,
            PermsError::AlreadyGranted => 103,
            PermsError::NotGranted => 104,
            PermsError::InvalidExpiry { .. } => 105,
            PermsError::PermissionExpired { .. } => 106,
            PermsError::InvalidLevel(_) => 107,
            PermsError::GranteeNotVerified(_) => 108,
            PermsError::PermissionRevoked => 109,
            PermsError::MaxSharesExceeded { .. } => 110,
            PermsError::TherapistNotFound(_) => 111,
            PermsError::InvalidGrantee(_) => 113,
            PermsError::InvalidLicense(_) => 114,
            PermsError::InvalidMaxShares => 116,
        }
    }
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
