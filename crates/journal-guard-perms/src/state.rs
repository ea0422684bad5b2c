//! The permission registry.
//!
//! Owns the permission records together with the grantee registry, the share
//! counter and the audit log. Every operation checks all of its preconditions
//! before the first write, so a failed call leaves the registry untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use journal_guard_core::{Authority, CallContext, EntryId, Height, Identity, PermissionId};

use crate::audit::{PermissionAuditLog, PermissionHistory};
use crate::error::{PermsError, Result};
use crate::grant::{GrantRequest, Permission, PermissionKey, PermissionLevel};
use crate::shares::{ShareCounter, DEFAULT_MAX_SHARES_PER_ENTRY};
use crate::therapist::{TherapistRecord, TherapistRegistry};

/// Permission state for all owners and entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRegistry {
    /// All permissions, active or revoked.
    permissions: BTreeMap<PermissionKey, Permission>,

    /// Next id to allocate on grant.
    next_id: PermissionId,

    therapists: TherapistRegistry,
    shares: ShareCounter,
    audit: PermissionAuditLog,
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SHARES_PER_ENTRY, true)
    }
}

impl PermissionRegistry {
    /// Create an empty registry.
    pub fn new(max_shares_per_entry: u32, audit_log_enabled: bool) -> Self {
        Self {
            permissions: BTreeMap::new(),
            next_id: PermissionId(0),
            therapists: TherapistRegistry::new(),
            shares: ShareCounter::new(max_shares_per_entry),
            audit: PermissionAuditLog::new(audit_log_enabled),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Grant Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant the caller's entry to a verified grantee.
    ///
    /// Checks, in order: grantee is neither the owner nor null, level is in
    /// range, expiry is in the future, the entry has share capacity, the
    /// permission does not already exist (active or revoked), and the grantee
    /// is verified.
    pub fn grant(&mut self, ctx: &CallContext, request: GrantRequest) -> Result<PermissionId> {
        let owner = ctx.caller;
        let GrantRequest {
            entry_id,
            grantee,
            level,
            expires_at,
        } = request;

        if grantee == owner || grantee.is_null() {
            return Err(PermsError::InvalidGrantee(grantee));
        }
        let level = PermissionLevel::new(level)?;
        if let Some(expires_at) = expires_at {
            if expires_at <= ctx.now {
                return Err(PermsError::InvalidExpiry {
                    expires_at,
                    now: ctx.now,
                });
            }
        }
        self.shares.ensure_capacity(&owner, entry_id)?;
        let key = PermissionKey::new(owner, entry_id, grantee);
        if self.permissions.contains_key(&key) {
            return Err(PermsError::AlreadyGranted);
        }
        if !self.therapists.is_eligible(&grantee) {
            return Err(PermsError::GranteeNotVerified(grantee));
        }

        let id = self.next_id;
        self.next_id = id.next();
        self.permissions.insert(
            key,
            Permission {
                id,
                level,
                granted_at: ctx.now,
                expires_at,
                active: true,
                last_accessed: None,
            },
        );
        self.shares.increment(owner, entry_id);
        self.audit.record(
            id,
            PermissionHistory {
                user: owner,
                entry_id,
                grantee,
                old_level: 0,
                new_level: level.get(),
                updated_at: ctx.now,
                updater: ctx.caller,
            },
        );

        Ok(id)
    }

    /// Change the level of an active permission on the caller's entry.
    pub fn update_level(
        &mut self,
        ctx: &CallContext,
        entry_id: EntryId,
        grantee: Identity,
        new_level: u8,
    ) -> Result<()> {
        let new_level = PermissionLevel::new(new_level)?;
        let key = PermissionKey::new(ctx.caller, entry_id, grantee);
        let permission = self
            .permissions
            .get_mut(&key)
            .ok_or(PermsError::PermissionNotFound)?;
        if !permission.active {
            return Err(PermsError::PermissionRevoked);
        }

        let old_level = permission.level;
        permission.level = new_level;
        permission.last_accessed = Some(ctx.now);
        let id = permission.id;

        self.audit.record(
            id,
            PermissionHistory {
                user: ctx.caller,
                entry_id,
                grantee,
                old_level: old_level.get(),
                new_level: new_level.get(),
                updated_at: ctx.now,
                updater: ctx.caller,
            },
        );
        Ok(())
    }

    /// Revoke an active permission on the caller's entry. Revocation is final.
    pub fn revoke(&mut self, ctx: &CallContext, entry_id: EntryId, grantee: Identity) -> Result<()> {
        let key = PermissionKey::new(ctx.caller, entry_id, grantee);
        let permission = self
            .permissions
            .get_mut(&key)
            .ok_or(PermsError::PermissionNotFound)?;
        if !permission.active {
            return Err(PermsError::PermissionRevoked);
        }

        permission.active = false;
        permission.last_accessed = Some(ctx.now);
        let id = permission.id;
        let old_level = permission.level;

        self.shares.decrement(ctx.caller, entry_id);
        self.audit.record(
            id,
            PermissionHistory {
                user: ctx.caller,
                entry_id,
                grantee,
                old_level: old_level.get(),
                new_level: 0,
                updated_at: ctx.now,
                updater: ctx.caller,
            },
        );
        Ok(())
    }

    /// Check whether `key.grantee` may access the entry at `now`.
    ///
    /// Returns the level and records `now` as the last access. Absent or
    /// revoked permissions fail with `NotGranted`; an active permission past
    /// its expiry fails with `PermissionExpired`.
    pub fn check_access(&mut self, now: Height, key: &PermissionKey) -> Result<PermissionLevel> {
        let permission = self
            .permissions
            .get_mut(key)
            .filter(|p| p.active)
            .ok_or(PermsError::NotGranted)?;

        if let Some(expires_at) = permission.expires_at {
            if expires_at <= now {
                return Err(PermsError::PermissionExpired { expires_at });
            }
        }

        permission.last_accessed = Some(now);
        Ok(permission.level)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Active shares on an entry. Zero if never shared.
    pub fn active_shares(&self, owner: &Identity, entry_id: EntryId) -> u32 {
        self.shares.active(owner, entry_id)
    }

    /// Get a permission by key.
    pub fn permission(&self, key: &PermissionKey) -> Option<&Permission> {
        self.permissions.get(key)
    }

    /// The latest recorded change to permission `id`.
    pub fn history(&self, id: PermissionId) -> Option<&PermissionHistory> {
        self.audit.get(id)
    }

    /// Get a grantee's verification record.
    pub fn therapist(&self, identity: &Identity) -> Option<&TherapistRecord> {
        self.therapists.get(identity)
    }

    /// All permissions granted on an owner's entry.
    pub fn grants_for_entry(
        &self,
        owner: &Identity,
        entry_id: EntryId,
    ) -> Vec<(&PermissionKey, &Permission)> {
        self.permissions
            .iter()
            .filter(|(key, _)| key.owner == *owner && key.entry_id == entry_id)
            .collect()
    }

    /// The configured share cap.
    pub fn max_shares_per_entry(&self) -> u32 {
        self.shares.max_per_entry()
    }

    /// Whether the audit log is recording.
    pub fn audit_log_enabled(&self) -> bool {
        self.audit.is_enabled()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authority Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify a grantee. Authority only.
    pub fn verify_therapist(
        &mut self,
        authority: &Authority,
        ctx: &CallContext,
        identity: Identity,
        license_hash: &[u8],
    ) -> Result<()> {
        self.therapists.verify(authority, ctx, identity, license_hash)
    }

    /// Suspend a grantee. Authority only.
    pub fn suspend_therapist(
        &mut self,
        authority: &Authority,
        ctx: &CallContext,
        identity: Identity,
    ) -> Result<()> {
        self.therapists.suspend(authority, ctx, identity)
    }

    /// Change the share cap. Authority only.
    pub fn set_max_shares_per_entry(
        &mut self,
        authority: &Authority,
        ctx: &CallContext,
        max: u32,
    ) -> Result<()> {
        authority.require(&ctx.caller)?;
        self.shares.set_max_per_entry(max)
    }

    /// Turn the audit log on or off. Authority only.
    pub fn set_audit_log_enabled(
        &mut self,
        authority: &Authority,
        ctx: &CallContext,
        enabled: bool,
    ) -> Result<()> {
        authority.require(&ctx.caller)?;
        self.audit.set_enabled(enabled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_guard_core::AuthorityError;

    const ADMIN: Identity = Identity([0xa1; 32]);
    const OWNER: Identity = Identity([0x01; 32]);
    const THERAPIST: Identity = Identity([0x03; 32]);
    const OTHER_THERAPIST: Identity = Identity([0x04; 32]);
    const UNVERIFIED: Identity = Identity([0x05; 32]);

    struct Setup {
        authority: Authority,
        registry: PermissionRegistry,
    }

    fn setup() -> Setup {
        let mut authority = Authority::unset();
        authority.set(ADMIN).unwrap();
        let mut registry = PermissionRegistry::default();
        let admin = CallContext::new(ADMIN, Height(100));
        registry
            .verify_therapist(&authority, &admin, THERAPIST, &[0u8; 32])
            .unwrap();
        registry
            .verify_therapist(&authority, &admin, OTHER_THERAPIST, &[0u8; 32])
            .unwrap();
        Setup {
            authority,
            registry,
        }
    }

    fn owner_at(height: u64) -> CallContext {
        CallContext::new(OWNER, Height(height))
    }

    fn key(grantee: Identity) -> PermissionKey {
        PermissionKey::new(OWNER, EntryId(0), grantee)
    }

    #[test]
    fn test_grant_and_check() {
        let Setup { mut registry, .. } = setup();

        let id = registry
            .grant(&owner_at(100), GrantRequest::new(EntryId(0), THERAPIST, 2))
            .unwrap();
        assert_eq!(id, PermissionId(0));

        let permission = registry.permission(&key(THERAPIST)).unwrap();
        assert_eq!(permission.level.get(), 2);
        assert!(permission.active);
        assert_eq!(permission.granted_at, Height(100));
        assert_eq!(permission.last_accessed, None);

        let history = registry.history(id).unwrap();
        assert_eq!((history.old_level, history.new_level), (0, 2));

        let level = registry.check_access(Height(150), &key(THERAPIST)).unwrap();
        assert_eq!(level.get(), 2);
        assert_eq!(
            registry.permission(&key(THERAPIST)).unwrap().last_accessed,
            Some(Height(150))
        );
    }

    #[test]
    fn test_grant_precondition_order() {
        let Setup { mut registry, .. } = setup();
        let ctx = owner_at(100);

        // Self-grant is checked before the level.
        assert_eq!(
            registry.grant(&ctx, GrantRequest::new(EntryId(0), OWNER, 9)),
            Err(PermsError::InvalidGrantee(OWNER))
        );
        assert_eq!(
            registry.grant(&ctx, GrantRequest::new(EntryId(0), Identity::NULL, 1)),
            Err(PermsError::InvalidGrantee(Identity::NULL))
        );
        // Level is checked before expiry.
        assert_eq!(
            registry.grant(
                &ctx,
                GrantRequest::new(EntryId(0), THERAPIST, 0).expires_at(Height(50))
            ),
            Err(PermsError::InvalidLevel(0))
        );
        assert_eq!(
            registry.grant(
                &ctx,
                GrantRequest::new(EntryId(0), THERAPIST, 1).expires_at(Height(100))
            ),
            Err(PermsError::InvalidExpiry {
                expires_at: Height(100),
                now: Height(100)
            })
        );
        assert_eq!(
            registry.grant(&ctx, GrantRequest::new(EntryId(0), UNVERIFIED, 1)),
            Err(PermsError::GranteeNotVerified(UNVERIFIED))
        );
        assert_eq!(registry.active_shares(&OWNER, EntryId(0)), 0);
    }

    #[test]
    fn test_duplicate_grant_rejected_even_after_revoke() {
        let Setup { mut registry, .. } = setup();
        let ctx = owner_at(100);

        registry
            .grant(&ctx, GrantRequest::new(EntryId(0), THERAPIST, 2))
            .unwrap();
        assert_eq!(
            registry.grant(&ctx, GrantRequest::new(EntryId(0), THERAPIST, 1)),
            Err(PermsError::AlreadyGranted)
        );

        registry.revoke(&ctx, EntryId(0), THERAPIST).unwrap();
        assert_eq!(
            registry.grant(&ctx, GrantRequest::new(EntryId(0), THERAPIST, 1)),
            Err(PermsError::AlreadyGranted)
        );
    }

    #[test]
    fn test_max_shares() {
        let Setup {
            authority,
            mut registry,
        } = setup();
        let admin = CallContext::new(ADMIN, Height(100));
        registry
            .set_max_shares_per_entry(&authority, &admin, 1)
            .unwrap();

        let ctx = owner_at(100);
        registry
            .grant(&ctx, GrantRequest::new(EntryId(0), THERAPIST, 2))
            .unwrap();
        assert_eq!(
            registry.grant(&ctx, GrantRequest::new(EntryId(0), OTHER_THERAPIST, 1)),
            Err(PermsError::MaxSharesExceeded { max: 1 })
        );

        // Revoking frees the slot.
        registry.revoke(&ctx, EntryId(0), THERAPIST).unwrap();
        registry
            .grant(&ctx, GrantRequest::new(EntryId(0), OTHER_THERAPIST, 1))
            .unwrap();
        assert_eq!(registry.active_shares(&OWNER, EntryId(0)), 1);
    }

    #[test]
    fn test_update_level() {
        let Setup { mut registry, .. } = setup();
        let id = registry
            .grant(&owner_at(100), GrantRequest::new(EntryId(0), THERAPIST, 1))
            .unwrap();

        registry
            .update_level(&owner_at(120), EntryId(0), THERAPIST, 3)
            .unwrap();
        let permission = registry.permission(&key(THERAPIST)).unwrap();
        assert_eq!(permission.level.get(), 3);
        assert_eq!(permission.last_accessed, Some(Height(120)));

        let history = registry.history(id).unwrap();
        assert_eq!((history.old_level, history.new_level), (1, 3));
        assert_eq!(history.updated_at, Height(120));

        assert_eq!(
            registry.update_level(&owner_at(130), EntryId(0), THERAPIST, 4),
            Err(PermsError::InvalidLevel(4))
        );
    }

    #[test]
    fn test_update_and_revoke_on_missing_or_revoked_leave_state_untouched() {
        let Setup { mut registry, .. } = setup();
        let ctx = owner_at(100);

        let before = registry.clone();
        assert_eq!(
            registry.update_level(&ctx, EntryId(0), THERAPIST, 2),
            Err(PermsError::PermissionNotFound)
        );
        assert_eq!(
            registry.revoke(&ctx, EntryId(0), THERAPIST),
            Err(PermsError::PermissionNotFound)
        );
        assert_eq!(registry, before);

        registry
            .grant(&ctx, GrantRequest::new(EntryId(0), THERAPIST, 2))
            .unwrap();
        registry.revoke(&ctx, EntryId(0), THERAPIST).unwrap();

        let before = registry.clone();
        assert_eq!(
            registry.update_level(&owner_at(110), EntryId(0), THERAPIST, 3),
            Err(PermsError::PermissionRevoked)
        );
        assert_eq!(
            registry.revoke(&owner_at(110), EntryId(0), THERAPIST),
            Err(PermsError::PermissionRevoked)
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_revoke() {
        let Setup { mut registry, .. } = setup();
        let id = registry
            .grant(&owner_at(100), GrantRequest::new(EntryId(0), THERAPIST, 2))
            .unwrap();
        assert_eq!(registry.active_shares(&OWNER, EntryId(0)), 1);

        registry.revoke(&owner_at(105), EntryId(0), THERAPIST).unwrap();
        let permission = registry.permission(&key(THERAPIST)).unwrap();
        assert!(!permission.active);
        assert_eq!(permission.last_accessed, Some(Height(105)));
        assert_eq!(registry.active_shares(&OWNER, EntryId(0)), 0);

        let history = registry.history(id).unwrap();
        assert_eq!((history.old_level, history.new_level), (2, 0));

        assert_eq!(
            registry.check_access(Height(106), &key(THERAPIST)),
            Err(PermsError::NotGranted)
        );
    }

    #[test]
    fn test_expired_permission_reports_expired() {
        let Setup { mut registry, .. } = setup();
        registry
            .grant(
                &owner_at(100),
                GrantRequest::new(EntryId(0), THERAPIST, 2).expires_at(Height(200)),
            )
            .unwrap();

        assert!(registry.check_access(Height(199), &key(THERAPIST)).is_ok());
        assert_eq!(
            registry.check_access(Height(200), &key(THERAPIST)),
            Err(PermsError::PermissionExpired {
                expires_at: Height(200)
            })
        );
        // A failed check does not touch last_accessed.
        assert_eq!(
            registry.permission(&key(THERAPIST)).unwrap().last_accessed,
            Some(Height(199))
        );
    }

    #[test]
    fn test_check_unknown() {
        let Setup { mut registry, .. } = setup();
        assert_eq!(
            registry.check_access(Height(100), &key(THERAPIST)),
            Err(PermsError::NotGranted)
        );
    }

    #[test]
    fn test_suspended_grantee_cannot_receive_new_grants() {
        let Setup {
            authority,
            mut registry,
        } = setup();
        let admin = CallContext::new(ADMIN, Height(100));
        registry
            .suspend_therapist(&authority, &admin, THERAPIST)
            .unwrap();
        assert_eq!(
            registry.grant(&owner_at(100), GrantRequest::new(EntryId(0), THERAPIST, 1)),
            Err(PermsError::GranteeNotVerified(THERAPIST))
        );
    }

    #[test]
    fn test_audit_disabled() {
        let Setup {
            authority,
            mut registry,
        } = setup();
        let admin = CallContext::new(ADMIN, Height(100));
        registry
            .set_audit_log_enabled(&authority, &admin, false)
            .unwrap();

        let id = registry
            .grant(&owner_at(100), GrantRequest::new(EntryId(0), THERAPIST, 1))
            .unwrap();
        assert!(registry.history(id).is_none());
        assert!(!registry.audit_log_enabled());
    }

    #[test]
    fn test_config_requires_authority() {
        let Setup {
            authority,
            mut registry,
        } = setup();
        assert_eq!(
            registry.set_max_shares_per_entry(&authority, &owner_at(100), 3),
            Err(PermsError::Authority(AuthorityError::NotAuthorized(OWNER)))
        );
        assert_eq!(
            registry.set_max_shares_per_entry(&Authority::unset(), &owner_at(100), 3),
            Err(PermsError::Authority(AuthorityError::NotVerified))
        );
        assert_eq!(registry.max_shares_per_entry(), 10);
    }

    #[test]
    fn test_grants_for_entry() {
        let Setup { mut registry, .. } = setup();
        let ctx = owner_at(100);
        registry
            .grant(&ctx, GrantRequest::new(EntryId(0), THERAPIST, 1))
            .unwrap();
        registry
            .grant(&ctx, GrantRequest::new(EntryId(0), OTHER_THERAPIST, 2))
            .unwrap();
        registry
            .grant(&ctx, GrantRequest::new(EntryId(1), THERAPIST, 3))
            .unwrap();

        assert_eq!(registry.grants_for_entry(&OWNER, EntryId(0)).len(), 2);
        assert_eq!(registry.grants_for_entry(&OWNER, EntryId(1)).len(), 1);
    }
}
