//! # Journal Guard Permissions
//!
//! Who may read a journal entry, at what level, and until when.
//!
//! ## Overview
//!
//! Permissions are keyed by `(owner, entry, grantee)`. A permission is created
//! once by a grant and afterwards only mutated in place: its level may change
//! and it may be revoked. Revocation is a flag flip, and because the key
//! already exists the same grantee can never be granted that entry again.
//!
//! ## Key Concepts
//!
//! - **TherapistRegistry**: Grantees the authority has verified
//! - **ShareCounter**: Active grants per entry, bounded by a configurable cap
//! - **PermissionRegistry**: Grant, update, revoke and check operations
//! - **PermissionAuditLog**: Last-change snapshot per permission id
//!
//! ## Lifecycle
//!
//! ```text
//! NonExistent --grant--> Active --update--> Active
//!                          |
//!                          +--revoke--> Revoked (terminal)
//! ```
//!
//! Expiry is not a stored state. It is computed at check time from
//! `expires_at` against the height supplied by the caller.
//!
//! ## Usage
//!
//! ```rust
//! use journal_guard_core::{Authority, CallContext, EntryId, Height, Identity};
//! use journal_guard_perms::{GrantRequest, PermissionRegistry};
//!
//! let admin = Identity::from_bytes([0xa1; 32]);
//! let owner = Identity::from_bytes([0x01; 32]);
//! let therapist = Identity::from_bytes([0x02; 32]);
//!
//! let mut authority = Authority::unset();
//! authority.set(admin).unwrap();
//!
//! let mut registry = PermissionRegistry::default();
//! let admin_ctx = CallContext::new(admin, Height(100));
//! registry.verify_therapist(&authority, &admin_ctx, therapist, &[0u8; 32]).unwrap();
//!
//! let ctx = CallContext::new(owner, Height(100));
//! let id = registry
//!     .grant(&ctx, GrantRequest::new(EntryId(0), therapist, 2))
//!     .unwrap();
//! assert_eq!(id.get(), 0);
//! assert_eq!(registry.active_shares(&owner, EntryId(0)), 1);
//! ```

pub mod audit;
pub mod error;
pub mod grant;
pub mod shares;
pub mod state;
pub mod therapist;

pub use audit::{PermissionAuditLog, PermissionHistory};
pub use error::{PermsError, Result};
pub use grant::{GrantRequest, Permission, PermissionKey, PermissionLevel, PermissionStatus};
pub use shares::{ShareCounter, ShareKey, DEFAULT_MAX_SHARES_PER_ENTRY};
pub use state::PermissionRegistry;
pub use therapist::{TherapistRecord, TherapistRegistry};
