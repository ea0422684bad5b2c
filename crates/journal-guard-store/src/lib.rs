//! # Journal Guard Store
//!
//! Durable checkpoints of the committed permission and key state.
//!
//! ## Overview
//!
//! The ledger state itself lives in memory and is mutated by a single
//! serialized executor. This crate persists opaque, checksummed snapshots of
//! that state keyed by the height at which they were taken, behind the
//! [`SnapshotStore`] trait. [`SqliteStore`] is the persistent backend and
//! [`MemoryStore`] is for tests.
//!
//! ## Key Types
//!
//! - [`SnapshotStore`] - The async trait for checkpoint persistence
//! - [`SnapshotRecord`] - Encoded state, its checksum and its height
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use journal_guard_core::{Blake3Hash, Height};
//! use journal_guard_store::{SnapshotRecord, SnapshotStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("guard.db").unwrap();
//!
//!     let bytes = vec![1, 2, 3];
//!     let record = SnapshotRecord::new(Height(100), bytes);
//!     store.put_snapshot(&record).await.unwrap();
//!
//!     let latest = store.latest_snapshot().await.unwrap().unwrap();
//!     assert_eq!(latest.checksum, Blake3Hash::hash(&[1, 2, 3]));
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **One snapshot per height**: writing again at the same height replaces it
//! - **Opaque payload**: the store never decodes snapshot bytes; the checksum
//!   is verified by whoever restores from it

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{SnapshotRecord, SnapshotStore};
