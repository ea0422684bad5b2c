//! Active-share counting per entry.
//!
//! The count for `(owner, entry)` equals the number of active permissions on
//! that entry and never exceeds the configured cap.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use journal_guard_core::{EntryId, Identity};

use crate::error::{PermsError, Result};

/// Default cap on active shares per entry.
pub const DEFAULT_MAX_SHARES_PER_ENTRY: u32 = 10;

/// Key of a share count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShareKey {
    pub owner: Identity,
    pub entry_id: EntryId,
}

/// Per-entry active share counts with a cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareCounter {
    counts: BTreeMap<ShareKey, u32>,
    max_per_entry: u32,
}

impl Default for ShareCounter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SHARES_PER_ENTRY)
    }
}

impl ShareCounter {
    /// Create a counter with the given cap.
    pub fn new(max_per_entry: u32) -> Self {
        Self {
            counts: BTreeMap::new(),
            max_per_entry,
        }
    }

    /// Active shares on an entry. Zero if never shared.
    pub fn active(&self, owner: &Identity, entry_id: EntryId) -> u32 {
        self.counts
            .get(&ShareKey {
                owner: *owner,
                entry_id,
            })
            .copied()
            .unwrap_or(0)
    }

    /// The configured cap.
    pub fn max_per_entry(&self) -> u32 {
        self.max_per_entry
    }

    /// Change the cap. Existing counts above a lowered cap are kept; they only
    /// block further grants.
    pub fn set_max_per_entry(&mut self, max: u32) -> Result<()> {
        if max == 0 {
            return Err(PermsError::InvalidMaxShares);
        }
        self.max_per_entry = max;
        Ok(())
    }

    /// Fail unless one more share fits.
    pub fn ensure_capacity(&self, owner: &Identity, entry_id: EntryId) -> Result<()> {
        if self.active(owner, entry_id) >= self.max_per_entry {
            return Err(PermsError::MaxSharesExceeded {
                max: self.max_per_entry,
            });
        }
        Ok(())
    }

    pub(crate) fn increment(&mut self, owner: Identity, entry_id: EntryId) {
        *self.counts.entry(ShareKey { owner, entry_id }).or_insert(0) += 1;
    }

    /// Callers only decrement for an existing active permission, so the count is positive.
    pub(crate) fn decrement(&mut self, owner: Identity, entry_id: EntryId) {
        let count = self.counts.entry(ShareKey { owner, entry_id }).or_insert(0);
        debug_assert!(*count > 0, "share count underflow");
        *count = count.saturating_sub(1);
    }
}
