//! The journal entry directory.
//!
//! Entry content lives outside this layer. When wired, the directory tells
//! the guard which `(owner, entry)` pairs exist so that grants and keys can
//! only target real entries.

use std::collections::BTreeSet;

use journal_guard_core::{EntryId, Identity};

/// Lookup of existing journal entries.
pub trait EntryDirectory {
    /// Whether `owner` has an entry `entry_id`.
    fn exists(&self, owner: &Identity, entry_id: EntryId) -> bool;
}

/// Directory that accepts every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenDirectory;

impl EntryDirectory for OpenDirectory {
    fn exists(&self, _owner: &Identity, _entry_id: EntryId) -> bool {
        true
    }
}

/// In-memory directory of known entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryEntryDirectory {
    entries: BTreeSet<(Identity, EntryId)>,
}

impl MemoryEntryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry. Returns false if it was already known.
    pub fn insert(&mut self, owner: Identity, entry_id: EntryId) -> bool {
        self.entries.insert((owner, entry_id))
    }
}

impl EntryDirectory for MemoryEntryDirectory {
    fn exists(&self, owner: &Identity, entry_id: EntryId) -> bool {
        self.entries.contains(&(*owner, entry_id))
    }
}

impl<D: EntryDirectory + ?Sized> EntryDirectory for &D {
    fn exists(&self, owner: &Identity, entry_id: EntryId) -> bool {
        (**self).exists(owner, entry_id)
    }
}
