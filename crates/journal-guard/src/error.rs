//! Error types for the Guard.

use journal_guard_core::{AuthorityError, CoreError, EntryId, Identity};
use journal_guard_keys::KeysError;
use journal_guard_perms::PermsError;
use journal_guard_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Guard operations.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Authority configuration error.
    #[error("authority error: {0}")]
    Authority(#[from] AuthorityError),

    /// Permission error.
    #[error("permission error: {0}")]
    Permission(#[from] PermsError),

    /// Key management error.
    #[error("key error: {0}")]
    Keys(#[from] KeysError),

    /// Core validation or encoding error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The entry directory does not know this entry.
    #[error("entry {entry_id} of {owner} not found")]
    EntryNotFound { owner: Identity, entry_id: EntryId },

    /// A checkpoint failed its checksum or did not decode.
    #[error("snapshot at height {height} is corrupted: {reason}")]
    SnapshotCorrupted { height: u64, reason: String },

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GuardError {
    /// Numeric code of a ledger error, if this is one.
    pub fn code(&self) -> Option<u32> {
        match self {
            GuardError::Permission(e) => Some(e.code()),
            GuardError::Keys(e) => Some(e.code()),
            _ => None,
        }
    }
}

/// Result type for Guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;
