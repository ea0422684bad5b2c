//! Snapshot store trait: the abstract interface for checkpoint persistence.

use async_trait::async_trait;
use bytes::Bytes;
use journal_guard_core::{Blake3Hash, Height};

use crate::error::Result;

/// An encoded state snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    /// Height of the last call applied before the snapshot was taken.
    pub height: Height,
    /// Blake3 hash of `bytes`.
    pub checksum: Blake3Hash,
    /// Encoded state.
    pub bytes: Bytes,
}

impl SnapshotRecord {
    /// Build a record, computing the checksum of `bytes`.
    pub fn new(height: Height, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            height,
            checksum: Blake3Hash::hash(&bytes),
            bytes,
        }
    }

    /// Whether `checksum` still matches `bytes`.
    pub fn verify(&self) -> bool {
        Blake3Hash::hash(&self.bytes) == self.checksum
    }
}

/// Async interface for snapshot persistence.
///
/// For SQLite, queries run on `spawn_blocking` to avoid blocking the runtime.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Write a snapshot, replacing any snapshot at the same height.
    async fn put_snapshot(&self, record: &SnapshotRecord) -> Result<()>;

    /// The snapshot with the greatest height.
    async fn latest_snapshot(&self) -> Result<Option<SnapshotRecord>>;

    /// The snapshot taken at exactly `height`.
    async fn snapshot_at(&self, height: Height) -> Result<Option<SnapshotRecord>>;

    /// Heights of all stored snapshots, ascending.
    async fn list_heights(&self) -> Result<Vec<Height>>;

    /// Delete snapshots strictly below `height`. Returns how many were removed.
    async fn prune_before(&self, height: Height) -> Result<usize>;
}
