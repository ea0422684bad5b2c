//! Key access logging.
//!
//! One record per (owner, entry, accessor), overwritten on each logged
//! access. Only the most recent access is kept.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use journal_guard_core::{EntryId, Height, Identity, KeyId};

/// Key of an access record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccessLogKey {
    pub owner: Identity,
    pub entry_id: EntryId,
    pub accessor: Identity,
}

/// The most recent access to an entry key by one accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAccessRecord {
    pub accessed_at: Height,
    pub key_id: KeyId,
    pub success: bool,
}

/// Last-access snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAccessLog {
    records: BTreeMap<AccessLogKey, KeyAccessRecord>,
}

impl KeyAccessLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the record for `key`.
    pub(crate) fn record(&mut self, key: AccessLogKey, record: KeyAccessRecord) {
        self.records.insert(key, record);
    }

    /// The most recent access recorded for `key`.
    pub fn get(&self, key: &AccessLogKey) -> Option<&KeyAccessRecord> {
        self.records.get(key)
    }

    /// Number of distinct (owner, entry, accessor) records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
