//! Permission audit trail.
//!
//! One record per permission id, overwritten on every change. This is a
//! last-change snapshot, not an append log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use journal_guard_core::{EntryId, Height, Identity, PermissionId};

/// The most recent change to a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionHistory {
    /// Owner of the entry.
    pub user: Identity,
    pub entry_id: EntryId,
    pub grantee: Identity,
    /// Level before the change. Zero for a fresh grant.
    pub old_level: u8,
    /// Level after the change. Zero for a revoke.
    pub new_level: u8,
    pub updated_at: Height,
    /// Caller that made the change.
    pub updater: Identity,
}

/// Last-change records, keyed by permission id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionAuditLog {
    enabled: bool,
    records: BTreeMap<PermissionId, PermissionHistory>,
}

impl Default for PermissionAuditLog {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PermissionAuditLog {
    /// Create an empty log.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            records: BTreeMap::new(),
        }
    }

    /// Whether changes are being recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Overwrite the record for `id`. No-op while disabled.
    pub(crate) fn record(&mut self, id: PermissionId, history: PermissionHistory) {
        if self.enabled {
            self.records.insert(id, history);
        }
    }

    /// The latest change to permission `id`.
    pub fn get(&self, id: PermissionId) -> Option<&PermissionHistory> {
        self.records.get(&id)
    }

    /// Number of permissions with a recorded change.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no change has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
