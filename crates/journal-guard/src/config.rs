//! Guard configuration.
//!
//! Initial values of the settings the authority can later change. Loadable
//! from JSON; every field has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use journal_guard_core::require_positive;
use journal_guard_keys::{EncryptionMode, KeyType, DEFAULT_ROTATION_PERIOD};
use journal_guard_perms::DEFAULT_MAX_SHARES_PER_ENTRY;

use crate::error::Result;

/// Configuration for a [`Guard`](crate::Guard).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Cap on active shares per entry.
    pub max_shares_per_entry: u32,
    /// Whether grant, update and revoke record history.
    pub audit_log_enabled: bool,
    /// Rotation period of newly stored keys, in heights.
    pub default_rotation_period: u64,
    /// Whether backup keys are accepted.
    pub key_backup_enabled: bool,
    /// Accepted entry key modes.
    pub encryption_modes: Vec<EncryptionMode>,
    /// Accepted identity key types.
    pub key_types: Vec<KeyType>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_shares_per_entry: DEFAULT_MAX_SHARES_PER_ENTRY,
            audit_log_enabled: true,
            default_rotation_period: DEFAULT_ROTATION_PERIOD,
            key_backup_enabled: true,
            encryption_modes: EncryptionMode::ALL.to_vec(),
            key_types: KeyType::ALL.to_vec(),
        }
    }
}

impl GuardConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject settings no operation could work with.
    pub fn validate(&self) -> Result<()> {
        require_positive("max_shares_per_entry", self.max_shares_per_entry.into())?;
        require_positive("default_rotation_period", self.default_rotation_period)?;
        Ok(())
    }
}
