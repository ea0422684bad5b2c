//! # Journal Guard
//!
//! The unified API for the access-control and key-lifecycle layer of an
//! encrypted journal.
//!
//! ## Overview
//!
//! Journal Guard answers two questions about a journal entry:
//!
//! - **Who may read it**, at what level and until when (permissions)
//! - **Under what key** it is protected and when that key must rotate (keys)
//!
//! Entry content is stored elsewhere; an [`EntryDirectory`] tells the guard
//! which entries exist. Key material is opaque: the guard validates lengths
//! and keeps ciphertext, it never encrypts or decrypts.
//!
//! ## Key Concepts
//!
//! - **CallContext**: Every call carries the authenticated caller and the current height
//! - **Authority**: Set once; gates grantee verification and global settings
//! - **Validate-then-commit**: A failed call changes nothing
//! - **Checkpoint**: CBOR snapshot of the whole state, checksummed with Blake3
//!
//! ## Usage
//!
//! ```rust
//! use journal_guard::{Guard, GrantRequest, StoreKeyRequest};
//! use journal_guard::core::{CallContext, EntryId, Height, Identity};
//!
//! let admin = Identity::from_bytes([0xa1; 32]);
//! let owner = Identity::from_bytes([0x01; 32]);
//! let therapist = Identity::from_bytes([0x03; 32]);
//!
//! let mut guard = Guard::new();
//! let admin_ctx = CallContext::new(admin, Height(1));
//! guard.set_authority(&admin_ctx, admin).unwrap();
//! guard.verify_therapist(&admin_ctx, therapist, &[0u8; 32]).unwrap();
//!
//! let ctx = CallContext::new(owner, Height(10));
//! guard.grant_permission(&ctx, GrantRequest::new(EntryId(0), therapist, 2)).unwrap();
//! assert_eq!(guard.active_shares(&owner, EntryId(0)), 1);
//!
//! guard.register_public_key(&ctx, &[0u8; 64], "ed25519").unwrap();
//! let key_id = guard
//!     .store_entry_key(
//!         &ctx,
//!         StoreKeyRequest::new(EntryId(0), vec![0u8; 128], vec![0u8; 12], vec![0u8; 16], "AES-256-GCM"),
//!     )
//!     .unwrap();
//! assert!(!guard.is_rotation_due(Height(10), &owner, key_id).unwrap());
//! ```
//!
//! ## Re-exports
//!
//! - `journal_guard::core` - Identities, heights, blobs, authority
//! - `journal_guard::perms` - Permission registry
//! - `journal_guard::keys` - Key manager
//! - `journal_guard::store` - Checkpoint storage

pub mod config;
pub mod directory;
pub mod error;
pub mod executor;
pub mod guard;
pub mod snapshot;

pub use journal_guard_core as core;
pub use journal_guard_keys as keys;
pub use journal_guard_perms as perms;
pub use journal_guard_store as store;

pub use config::GuardConfig;
pub use directory::{EntryDirectory, MemoryEntryDirectory, OpenDirectory};
pub use error::{GuardError, Result};
pub use executor::SerialExecutor;
pub use guard::{Guard, GuardState};

pub use journal_guard_core::{CallContext, EntryId, Height, Identity, KeyId, PermissionId};
pub use journal_guard_keys::{EncryptionMode, KeyType, RotateKeyRequest, StoreKeyRequest};
pub use journal_guard_perms::{GrantRequest, PermissionLevel, PermissionStatus};
