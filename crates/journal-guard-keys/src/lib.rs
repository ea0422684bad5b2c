//! # Journal Guard Keys
//!
//! Under what key a journal entry is protected, and when that key must rotate.
//!
//! ## Overview
//!
//! Key material is opaque here: the encrypted entry key, its IV and its auth
//! tag are fixed-length blobs produced by the client. This crate only decides
//! whether they may be stored, keeps them, and tracks their rotation.
//!
//! ## Key Concepts
//!
//! - **PublicKeyRegistry**: One long-lived public key per identity, registered once
//! - **EntryKeyStore**: Per-entry key material; `key_id` is stable across rotation
//! - **RotationScheduler**: When each key is next due for rotation
//! - **KeyAccessLog**: Most recent access per (owner, entry, accessor)
//!
//! ## Flow
//!
//! ```text
//! store:  EntryKeyStore -> PublicKeyRegistry (owner has a key?) -> write -> RotationScheduler seed
//! rotate: EntryKeyStore -> replace material -> RotationScheduler advance
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use journal_guard_core::{CallContext, EntryId, Height, Identity};
//! use journal_guard_keys::{KeyManager, StoreKeyRequest};
//!
//! let owner = Identity::from_bytes([0x01; 32]);
//! let ctx = CallContext::new(owner, Height(1000));
//!
//! let mut keys = KeyManager::default();
//! keys.register_public_key(&ctx, &[0u8; 64], "ed25519").unwrap();
//!
//! let request = StoreKeyRequest::new(EntryId(0), vec![0u8; 128], vec![0u8; 12], vec![0u8; 16], "AES-256-GCM")
//!     .kdf(vec![0u8; 32], 100_000);
//! let key_id = keys.store_entry_key(&ctx, request).unwrap();
//! assert_eq!(key_id.get(), 0);
//! assert!(!keys.is_rotation_due(Height(1000), &owner, key_id).unwrap());
//! ```

pub mod access_log;
pub mod entry_key;
pub mod error;
pub mod material;
pub mod public_key;
pub mod rotation;
pub mod state;

pub use access_log::{AccessLogKey, KeyAccessLog, KeyAccessRecord};
pub use entry_key::{EntryEncryptionKey, EntryKeyRef, EntryKeyStore};
pub use error::{KeysError, Result};
pub use material::{EncryptionMode, KeyType, RotateKeyRequest, StoreKeyRequest};
pub use public_key::{PublicKeyRecord, PublicKeyRegistry};
pub use rotation::{RotationKey, RotationSchedule, RotationScheduler, DEFAULT_ROTATION_PERIOD};
pub use state::KeyManager;
