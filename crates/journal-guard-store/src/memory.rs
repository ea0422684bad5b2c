//! In-memory implementation of the snapshot store.
//!
//! Same semantics as SQLite, no persistence.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use journal_guard_core::Height;

use crate::error::{Result, StoreError};
use crate::traits::{SnapshotRecord, SnapshotStore};

/// In-memory snapshot store. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryStore {
    snapshots: RwLock<BTreeMap<Height, SnapshotRecord>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Whether no snapshot is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn put_snapshot(&self, record: &SnapshotRecord) -> Result<()> {
        let mut snapshots = self.snapshots.write().map_err(|_| StoreError::Poisoned)?;
        snapshots.insert(record.height, record.clone());
        Ok(())
    }

    async fn latest_snapshot(&self) -> Result<Option<SnapshotRecord>> {
        let snapshots = self.snapshots.read().map_err(|_| StoreError::Poisoned)?;
        Ok(snapshots.values().next_back().cloned())
    }

    async fn snapshot_at(&self, height: Height) -> Result<Option<SnapshotRecord>> {
        let snapshots = self.snapshots.read().map_err(|_| StoreError::Poisoned)?;
        Ok(snapshots.get(&height).cloned())
    }

    async fn list_heights(&self) -> Result<Vec<Height>> {
        let snapshots = self.snapshots.read().map_err(|_| StoreError::Poisoned)?;
        Ok(snapshots.keys().copied().collect())
    }

    async fn prune_before(&self, height: Height) -> Result<usize> {
        let mut snapshots = self.snapshots.write().map_err(|_| StoreError::Poisoned)?;
        let kept = snapshots.split_off(&height);
        let removed = snapshots.len();
        *snapshots = kept;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_latest_is_highest() {
        let store = MemoryStore::new();
        store
            .put_snapshot(&SnapshotRecord::new(Height(30), vec![3u8]))
            .await
            .unwrap();
        store
            .put_snapshot(&SnapshotRecord::new(Height(10), vec![1u8]))
            .await
            .unwrap();

        assert_eq!(
            store.latest_snapshot().await.unwrap().unwrap().height,
            Height(30)
        );
        assert_eq!(store.list_heights().await.unwrap(), vec![Height(10), Height(30)]);
    }

    #[tokio::test]
    async fn test_prune_before() {
        let store = MemoryStore::new();
        for height in [1, 2, 3] {
            store
                .put_snapshot(&SnapshotRecord::new(Height(height), vec![0u8]))
                .await
                .unwrap();
        }
        assert_eq!(store.prune_before(Height(3)).await.unwrap(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.prune_before(Height(0)).await.unwrap(), 0);
    }
}
