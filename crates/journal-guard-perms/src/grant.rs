//! Permission records and grant requests.
//!
//! A permission is identified by the `(owner, entry, grantee)` triple. The
//! record is created once and only mutated in place afterwards.

use serde::{Deserialize, Serialize};

use journal_guard_core::{EntryId, Height, Identity, PermissionId};

use crate::error::{PermsError, Result};

/// Access level carried by a permission. Always within `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PermissionLevel(u8);

impl PermissionLevel {
    /// Lowest grantable level.
    pub const MIN: u8 = 1;

    /// Highest grantable level.
    pub const MAX: u8 = 3;

    /// Validate a raw level.
    pub fn new(level: u8) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&level) {
            return Err(PermsError::InvalidLevel(level));
        }
        Ok(Self(level))
    }

    /// Get the raw level.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PermissionLevel {
    type Error = PermsError;

    fn try_from(level: u8) -> Result<Self> {
        Self::new(level)
    }
}

impl From<PermissionLevel> for u8 {
    fn from(level: PermissionLevel) -> Self {
        level.0
    }
}

/// Composite key of a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionKey {
    /// Owner of the entry.
    pub owner: Identity,
    /// The entry being shared.
    pub entry_id: EntryId,
    /// Who receives access.
    pub grantee: Identity,
}

impl PermissionKey {
    /// Create a new permission key.
    pub const fn new(owner: Identity, entry_id: EntryId, grantee: Identity) -> Self {
        Self {
            owner,
            entry_id,
            grantee,
        }
    }
}

/// A stored permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Id allocated on grant.
    pub id: PermissionId,

    /// Current access level.
    pub level: PermissionLevel,

    /// Height of the grant.
    pub granted_at: Height,

    /// Height at which access stops, if any.
    pub expires_at: Option<Height>,

    /// False once revoked. Never set back to true.
    pub active: bool,

    /// Height of the last update, revoke or successful access check.
    pub last_accessed: Option<Height>,
}

/// Derived status of a permission at a given height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Active and not expired.
    Active,
    /// Active but past its expiry.
    Expired,
    /// Revoked. Terminal.
    Revoked,
}

impl Permission {
    /// Whether the expiry, if any, has been reached at `now`.
    pub fn is_expired(&self, now: Height) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }

    /// Status of this permission at `now`.
    pub fn status(&self, now: Height) -> PermissionStatus {
        if !self.active {
            PermissionStatus::Revoked
        } else if self.is_expired(now) {
            PermissionStatus::Expired
        } else {
            PermissionStatus::Active
        }
    }
}

/// Parameters of a grant. The owner is the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRequest {
    /// The entry to share.
    pub entry_id: EntryId,
    /// Who receives access.
    pub grantee: Identity,
    /// Requested level, validated on grant.
    pub level: u8,
    /// Optional expiry height.
    pub expires_at: Option<Height>,
}

impl GrantRequest {
    /// A grant with no expiry.
    pub fn new(entry_id: EntryId, grantee: Identity, level: u8) -> Self {
        Self {
            entry_id,
            grantee,
            level,
            expires_at: None,
        }
    }

    /// Set the expiry height.
    pub fn expires_at(mut self, height: Height) -> Self {
        self.expires_at = Some(height);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission(expires_at: Option<Height>, active: bool) -> Permission {
        Permission {
            id: PermissionId(0),
            level: PermissionLevel::new(2).unwrap(),
            granted_at: Height(100),
            expires_at,
            active,
            last_accessed: None,
        }
    }

    #[test]
    fn test_level_bounds() {
        assert_eq!(PermissionLevel::new(0), Err(PermsError::InvalidLevel(0)));
        assert!(PermissionLevel::new(1).is_ok());
        assert!(PermissionLevel::new(3).is_ok());
        assert_eq!(PermissionLevel::new(4), Err(PermsError::InvalidLevel(4)));
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let p = permission(Some(Height(200)), true);
        assert!(!p.is_expired(Height(199)));
        assert!(p.is_expired(Height(200)));
        assert!(p.is_expired(Height(201)));
    }

    #[test]
    fn test_no_expiry_never_expires() {
        let p = permission(None, true);
        assert!(!p.is_expired(Height(u64::MAX)));
    }

    #[test]
    fn test_status() {
        assert_eq!(
            permission(Some(Height(200)), true).status(Height(150)),
            PermissionStatus::Active
        );
        assert_eq!(
            permission(Some(Height(200)), true).status(Height(250)),
            PermissionStatus::Expired
        );
        assert_eq!(
            permission(Some(Height(200)), false).status(Height(250)),
            PermissionStatus::Revoked
        );
    }

    #[test]
    fn test_grant_request_builder() {
        let grantee = Identity::from_bytes([2; 32]);
        let request = GrantRequest::new(EntryId(3), grantee, 1).expires_at(Height(500));
        assert_eq!(request.expires_at, Some(Height(500)));
        assert_eq!(request.entry_id, EntryId(3));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn level_accepted_only_in_range(raw in any::<u8>()) {
                let accepted = PermissionLevel::new(raw).is_ok();
                prop_assert_eq!(accepted, (1..=3).contains(&raw));
            }
        }
    }
}
