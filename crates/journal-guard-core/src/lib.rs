//! # Journal Guard Core
//!
//! Pure primitives shared by the permission and key-lifecycle layers of an
//! encrypted journal.
//!
//! This crate contains no I/O and no storage. It defines the identifiers that
//! every registry is keyed by, the fixed-length byte blobs that cross the
//! ledger boundary, and the write-once [`Authority`].
//!
//! ## Key Types
//!
//! - [`Identity`] - A 32-byte principal (owner, grantee, authority)
//! - [`EntryId`], [`PermissionId`], [`KeyId`] - Strongly typed ids
//! - [`Height`] - The externally supplied clock / block height
//! - [`CallContext`] - Authenticated caller plus the height of the call
//! - [`Authority`] - Write-once privileged identity
//!
//! ## Blobs
//!
//! Ledger byte fields have bit-exact lengths. The [`blob`] module provides one
//! newtype per field; any other length is rejected, never truncated or padded.

pub mod authority;
pub mod blob;
pub mod crypto;
pub mod error;
pub mod types;
pub mod validation;

pub use authority::Authority;
pub use blob::{AuthTag, EncryptedKey, Iv, LicenseHash, RawPublicKey};
pub use crypto::{Blake3Hash, Keypair};
pub use error::{AuthorityError, CoreError};
pub use types::{CallContext, EntryId, Height, Identity, KeyId, PermissionId};
pub use validation::{exact_len, require_positive};
