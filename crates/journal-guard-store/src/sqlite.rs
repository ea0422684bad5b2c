//! SQLite implementation of the snapshot store.
//!
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use journal_guard_core::{Blake3Hash, Height};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{SnapshotRecord, SnapshotStore};

/// SQLite-based snapshot store.
///
/// Thread-safe via internal Mutex. All queries run on the blocking pool.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

type RawRow = (u64, Vec<u8>, Vec<u8>);

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get("height")?, row.get("checksum")?, row.get("state")?))
}

fn to_record((height, checksum, state): RawRow) -> Result<SnapshotRecord> {
    let checksum: [u8; 32] = checksum.try_into().map_err(|bytes: Vec<u8>| {
        StoreError::InvalidData(format!(
            "checksum at height {height} is {} bytes",
            bytes.len()
        ))
    })?;
    Ok(SnapshotRecord {
        height: Height(height),
        checksum: Blake3Hash::from_bytes(checksum),
        bytes: Bytes::from(state),
    })
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn put_snapshot(&self, record: &SnapshotRecord) -> Result<()> {
        let record = record.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO snapshots (height, checksum, state) VALUES (?1, ?2, ?3)",
                params![
                    record.height.get(),
                    record.checksum.as_bytes().as_slice(),
                    &record.bytes[..]
                ],
            )?;
            tracing::debug!(
                height = record.height.get(),
                checksum = %record.checksum.to_hex(),
                size = record.bytes.len(),
                "snapshot written"
            );
            Ok(())
        })
        .await
    }

    async fn latest_snapshot(&self) -> Result<Option<SnapshotRecord>> {
        self.run(|conn| {
            conn.query_row(
                "SELECT height, checksum, state FROM snapshots ORDER BY height DESC LIMIT 1",
                [],
                read_raw,
            )
            .optional()?
            .map(to_record)
            .transpose()
        })
        .await
    }

    async fn snapshot_at(&self, height: Height) -> Result<Option<SnapshotRecord>> {
        self.run(move |conn| {
            conn.query_row(
                "SELECT height, checksum, state FROM snapshots WHERE height = ?1",
                params![height.get()],
                read_raw,
            )
            .optional()?
            .map(to_record)
            .transpose()
        })
        .await
    }

    async fn list_heights(&self) -> Result<Vec<Height>> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT height FROM snapshots ORDER BY height")?;
            let heights = stmt
                .query_map([], |row| row.get::<_, u64>(0))?
                .map(|height| height.map(Height))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(heights)
        })
        .await
    }

    async fn prune_before(&self, height: Height) -> Result<usize> {
        self.run(move |conn| {
            let removed = conn.execute(
                "DELETE FROM snapshots WHERE height < ?1",
                params![height.get()],
            )?;
            if removed > 0 {
                tracing::debug!(before = height.get(), removed, "snapshots pruned");
            }
            Ok(removed)
        })
        .await
    }
}
