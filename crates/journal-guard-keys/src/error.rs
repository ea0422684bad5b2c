//! Error types for the key management module.

use journal_guard_core::{AuthorityError, CoreError};
use thiserror::Error;

/// Errors that can occur during key registration, storage and rotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeysError {
    /// Authority gate failed (unset authority, or caller is not the authority).
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    /// Raw public key of the wrong length.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(CoreError),

    /// Unknown or disabled key type.
    #[error("invalid key type: {0}")]
    InvalidKeyType(String),

    /// A key is already registered for this identity or entry.
    #[error("key already exists")]
    KeyAlreadyExists,

    /// No key, identity key, or rotation schedule for the lookup.
    #[error("key not found")]
    KeyNotFound,

    /// Encrypted entry key of the wrong length.
    #[error("invalid encrypted key: {0}")]
    InvalidEncryptedKey(CoreError),

    /// IV of the wrong length.
    #[error("invalid iv: {0}")]
    InvalidIv(CoreError),

    /// Auth tag of the wrong length.
    #[error("invalid auth tag: {0}")]
    InvalidAuthTag(CoreError),

    /// Backup key of the wrong length.
    #[error("invalid backup key: {0}")]
    InvalidBackupKey(CoreError),

    /// Unknown or disabled encryption mode.
    #[error("unsupported encryption mode: {0}")]
    UnsupportedMode(String),

    /// A backup key was supplied while backups are disabled.
    #[error("key backup is disabled")]
    BackupDisabled,

    /// Rotation period of zero.
    #[error("rotation period must be greater than zero")]
    InvalidRotationPeriod,
}

impl KeysError {
    /// Stable numeric code reported to the executor.
    pub fn code(&self) -> u32 {
        match self {
            KeysError::Authority(AuthorityError::NotVerified) => 111,
            KeysError::Authority(_) => 100,
            KeysError::InvalidPublicKey(_) => 101,
            KeysError::InvalidEncryptedKey(_) | KeysError::InvalidBackupKey(_) => 102,
            KeysError::KeyNotFound => 103,
            KeysError::InvalidKeyType(_) => 104,
            KeysError::KeyAlreadyExists => 106,
            KeysError::UnsupportedMode(_) => 112,
            KeysError::InvalidIv(_) => 114,
            KeysError::InvalidAuthTag(_) => 115,
            KeysError::InvalidRotationPeriod => 118,
            KeysError::BackupDisabled => 119,
        }
    }
}

/// Result type for key operations.
pub type Result<T> = std::result::Result<T, KeysError>;
