//! Serialized execution.
//!
//! The ledger assumes one global order of calls. `SerialExecutor` shares a
//! [`Guard`] between async tasks and runs each call to completion under a
//! lock, so concurrent callers observe the same validate-then-commit order as
//! a single-threaded executor would give them.

use std::sync::Arc;

use tokio::sync::Mutex;

use journal_guard_core::Height;
use journal_guard_store::SnapshotStore;

use crate::directory::{EntryDirectory, OpenDirectory};
use crate::error::Result;
use crate::guard::Guard;
use crate::snapshot;

/// Shared handle to a serialized [`Guard`].
pub struct SerialExecutor<D = OpenDirectory> {
    guard: Arc<Mutex<Guard<D>>>,
}

impl<D> Clone for SerialExecutor<D> {
    fn clone(&self) -> Self {
        Self {
            guard: Arc::clone(&self.guard),
        }
    }
}

impl<D: EntryDirectory> SerialExecutor<D> {
    /// Wrap a guard.
    pub fn new(guard: Guard<D>) -> Self {
        Self {
            guard: Arc::new(Mutex::new(guard)),
        }
    }

    /// Run one call with exclusive access to the guard.
    pub async fn execute<T>(&self, call: impl FnOnce(&mut Guard<D>) -> T) -> T {
        let mut guard = self.guard.lock().await;
        call(&mut guard)
    }

    /// Run a read with exclusive access to the guard.
    pub async fn read<T>(&self, query: impl FnOnce(&Guard<D>) -> T) -> T {
        let guard = self.guard.lock().await;
        query(&guard)
    }

    /// Write a checkpoint of the current state. Returns its height.
    pub async fn checkpoint<S>(&self, store: &S) -> Result<Height>
    where
        S: SnapshotStore + ?Sized,
    {
        let record = {
            let guard = self.guard.lock().await;
            snapshot::encode(guard.height(), guard.state())?
        };
        store.put_snapshot(&record).await?;
        tracing::debug!(height = record.height.get(), "checkpoint written");
        Ok(record.height)
    }

    /// Replace the state with the latest checkpoint in `store`.
    ///
    /// Returns the restored height, or `None` if the store is empty. A
    /// corrupted checkpoint leaves the current state untouched.
    pub async fn restore<S>(&self, store: &S) -> Result<Option<Height>>
    where
        S: SnapshotStore + ?Sized,
    {
        let Some(record) = store.latest_snapshot().await? else {
            return Ok(None);
        };
        let state = snapshot::decode(&record)?;

        let mut guard = self.guard.lock().await;
        guard.replace_state(state, record.height);
        tracing::debug!(height = record.height.get(), "state restored");
        Ok(Some(record.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_guard_core::{CallContext, Identity};
    use journal_guard_store::{MemoryStore, SnapshotRecord};

    const OWNER: Identity = Identity([0x01; 32]);

    #[tokio::test]
    async fn test_checkpoint_and_restore() {
        let store = MemoryStore::new();
        let executor = SerialExecutor::new(Guard::new());
        executor
            .execute(|guard| {
                guard.register_public_key(&CallContext::new(OWNER, Height(7)), &[1u8; 64], "ed25519")
            })
            .await
            .unwrap();
        assert_eq!(executor.checkpoint(&store).await.unwrap(), Height(7));

        let restored = SerialExecutor::new(Guard::new());
        assert_eq!(restored.restore(&store).await.unwrap(), Some(Height(7)));
        assert!(restored.read(|guard| guard.public_key(&OWNER).is_some()).await);
        assert_eq!(restored.read(Guard::height).await, Height(7));
    }

    #[tokio::test]
    async fn test_restore_empty_store() {
        let executor = SerialExecutor::new(Guard::new());
        assert_eq!(executor.restore(&MemoryStore::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupted_restore_keeps_state() {
        let store = MemoryStore::new();
        store
            .put_snapshot(&SnapshotRecord {
                height: Height(9),
                checksum: journal_guard_core::Blake3Hash::ZERO,
                bytes: vec![1u8, 2, 3].into(),
            })
            .await
            .unwrap();

        let executor = SerialExecutor::new(Guard::new());
        executor
            .execute(|guard| {
                guard.register_public_key(&CallContext::new(OWNER, Height(2)), &[1u8; 64], "ed25519")
            })
            .await
            .unwrap();

        assert!(executor.restore(&store).await.is_err());
        assert_eq!(executor.read(Guard::height).await, Height(2));
        assert!(executor.read(|guard| guard.public_key(&OWNER).is_some()).await);
    }
}
