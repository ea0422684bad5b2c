//! The Guard: one state container for permissions and keys.
//!
//! The Guard owns the authority, the permission registry and the key manager,
//! and exposes every ledger operation. Each operation either commits fully or
//! returns an error having changed nothing.

use serde::{Deserialize, Serialize};

use journal_guard_core::{Authority, CallContext, EntryId, Height, Identity, KeyId, PermissionId};
use journal_guard_keys::{
    AccessLogKey, EncryptionMode, EntryEncryptionKey, EntryKeyStore, KeyAccessRecord, KeyManager,
    KeyType, PublicKeyRecord, PublicKeyRegistry, RotateKeyRequest, RotationSchedule,
    RotationScheduler, StoreKeyRequest,
};
use journal_guard_perms::{
    GrantRequest, Permission, PermissionHistory, PermissionKey, PermissionLevel,
    PermissionRegistry, TherapistRecord,
};

use crate::config::GuardConfig;
use crate::directory::{EntryDirectory, OpenDirectory};
use crate::error::{GuardError, Result};

/// Everything a checkpoint captures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardState {
    pub authority: Authority,
    pub permissions: PermissionRegistry,
    pub keys: KeyManager,
}

impl GuardState {
    /// Fresh state: authority unset, counters at zero.
    pub fn from_config(config: &GuardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            authority: Authority::unset(),
            permissions: PermissionRegistry::new(
                config.max_shares_per_entry,
                config.audit_log_enabled,
            ),
            keys: KeyManager::new(
                PublicKeyRegistry::new(config.key_types.iter().copied()),
                EntryKeyStore::new(
                    config.encryption_modes.iter().copied(),
                    config.key_backup_enabled,
                ),
                RotationScheduler::new(config.default_rotation_period),
            ),
        })
    }
}

/// The main Guard struct.
pub struct Guard<D = OpenDirectory> {
    state: GuardState,
    directory: D,
    /// Height of the latest committed call.
    height: Height,
}

impl Guard<OpenDirectory> {
    /// A guard with default configuration and no entry directory.
    pub fn new() -> Self {
        Self::from_state(GuardState::default(), OpenDirectory, Height::ZERO)
    }
}

impl Default for Guard<OpenDirectory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: EntryDirectory> Guard<D> {
    /// Create a guard from a configuration and an entry directory.
    pub fn with_config(config: &GuardConfig, directory: D) -> Result<Self> {
        Ok(Self::from_state(GuardState::from_config(config)?, directory, Height::ZERO))
    }

    /// Rebuild a guard from restored state.
    pub fn from_state(state: GuardState, directory: D, height: Height) -> Self {
        Self {
            state,
            directory,
            height,
        }
    }

    /// The full state.
    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Height of the latest committed call.
    pub fn height(&self) -> Height {
        self.height
    }

    pub(crate) fn replace_state(&mut self, state: GuardState, height: Height) {
        self.state = state;
        self.height = height;
    }

    fn committed(&mut self, ctx: &CallContext) {
        self.height = self.height.max(ctx.now);
    }

    fn require_entry(&self, owner: &Identity, entry_id: EntryId) -> Result<()> {
        if !self.directory.exists(owner, entry_id) {
            return Err(GuardError::EntryNotFound {
                owner: *owner,
                entry_id,
            });
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authority
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the authority. The first call wins; every later call fails.
    pub fn set_authority(&mut self, ctx: &CallContext, authority: Identity) -> Result<()> {
        self.state.authority.set(authority)?;
        self.committed(ctx);
        tracing::debug!(authority = %authority, caller = %ctx.caller, "authority set");
        Ok(())
    }

    /// The configured authority, if any.
    pub fn authority(&self) -> Option<Identity> {
        self.state.authority.get()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant one of the caller's entries to a verified grantee.
    pub fn grant_permission(&mut self, ctx: &CallContext, request: GrantRequest) -> Result<PermissionId> {
        self.require_entry(&ctx.caller, request.entry_id)?;
        let (entry_id, grantee) = (request.entry_id, request.grantee);
        let id = self.state.permissions.grant(ctx, request)?;
        self.committed(ctx);
        tracing::debug!(owner = %ctx.caller, entry = %entry_id, grantee = %grantee, permission = %id, "permission granted");
        Ok(id)
    }

    /// Change the level of an active permission.
    pub fn update_permission_level(
        &mut self,
        ctx: &CallContext,
        entry_id: EntryId,
        grantee: Identity,
        new_level: u8,
    ) -> Result<()> {
        self.state
            .permissions
            .update_level(ctx, entry_id, grantee, new_level)?;
        self.committed(ctx);
        tracing::debug!(owner = %ctx.caller, entry = %entry_id, grantee = %grantee, level = new_level, "permission updated");
        Ok(())
    }

    /// Revoke an active permission. Final.
    pub fn revoke_permission(
        &mut self,
        ctx: &CallContext,
        entry_id: EntryId,
        grantee: Identity,
    ) -> Result<()> {
        self.state.permissions.revoke(ctx, entry_id, grantee)?;
        self.committed(ctx);
        tracing::debug!(owner = %ctx.caller, entry = %entry_id, grantee = %grantee, "permission revoked");
        Ok(())
    }

    /// Check a grantee's access at `now`, recording the access on success.
    pub fn check_access(
        &mut self,
        now: Height,
        owner: Identity,
        entry_id: EntryId,
        grantee: Identity,
    ) -> Result<PermissionLevel> {
        let level = self
            .state
            .permissions
            .check_access(now, &PermissionKey::new(owner, entry_id, grantee))?;
        self.height = self.height.max(now);
        Ok(level)
    }

    /// Active shares on an entry. Zero if never shared.
    pub fn active_shares(&self, owner: &Identity, entry_id: EntryId) -> u32 {
        self.state.permissions.active_shares(owner, entry_id)
    }

    pub fn permission(&self, owner: Identity, entry_id: EntryId, grantee: Identity) -> Option<&Permission> {
        self.state
            .permissions
            .permission(&PermissionKey::new(owner, entry_id, grantee))
    }

    pub fn permission_history(&self, id: PermissionId) -> Option<&PermissionHistory> {
        self.state.permissions.history(id)
    }

    pub fn therapist(&self, identity: &Identity) -> Option<&TherapistRecord> {
        self.state.permissions.therapist(identity)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Key Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register the caller's identity key.
    pub fn register_public_key(
        &mut self,
        ctx: &CallContext,
        raw_key: &[u8],
        key_type: &str,
    ) -> Result<KeyId> {
        let key_id = self.state.keys.register_public_key(ctx, raw_key, key_type)?;
        self.committed(ctx);
        tracing::debug!(owner = %ctx.caller, key = %key_id, key_type, "public key registered");
        Ok(key_id)
    }

    /// Store the key of one of the caller's entries.
    pub fn store_entry_key(&mut self, ctx: &CallContext, request: StoreKeyRequest) -> Result<KeyId> {
        self.require_entry(&ctx.caller, request.entry_id)?;
        let entry_id = request.entry_id;
        let key_id = self.state.keys.store_entry_key(ctx, request)?;
        self.committed(ctx);
        tracing::debug!(owner = %ctx.caller, entry = %entry_id, key = %key_id, "entry key stored");
        Ok(key_id)
    }

    /// Rotate the key of one of the caller's entries. The key id is unchanged.
    pub fn rotate_entry_key(&mut self, ctx: &CallContext, request: RotateKeyRequest) -> Result<KeyId> {
        let entry_id = request.entry_id;
        let key_id = self.state.keys.rotate_entry_key(ctx, request)?;
        self.committed(ctx);
        tracing::debug!(owner = %ctx.caller, entry = %entry_id, key = %key_id, "entry key rotated");
        Ok(key_id)
    }

    /// Whether a key is due for rotation at `now`.
    pub fn is_rotation_due(&self, now: Height, owner: &Identity, key_id: KeyId) -> Result<bool> {
        Ok(self.state.keys.is_rotation_due(now, owner, key_id)?)
    }

    /// Keys of `owner` due for rotation at `now`.
    pub fn keys_due_for_rotation(&self, owner: &Identity, now: Height) -> Vec<KeyId> {
        self.state.keys.keys_due_for_rotation(owner, now)
    }

    /// Record an access to one of the caller's entry keys.
    pub fn log_key_access(
        &mut self,
        ctx: &CallContext,
        entry_id: EntryId,
        accessor: Identity,
        success: bool,
    ) -> Result<()> {
        self.state
            .keys
            .log_key_access(ctx, entry_id, accessor, success)?;
        self.committed(ctx);
        Ok(())
    }

    pub fn public_key(&self, identity: &Identity) -> Option<&PublicKeyRecord> {
        self.state.keys.public_key(identity)
    }

    pub fn entry_key(&self, owner: &Identity, entry_id: EntryId) -> Option<&EntryEncryptionKey> {
        self.state.keys.entry_key(owner, entry_id)
    }

    pub fn rotation_schedule(&self, owner: &Identity, key_id: KeyId) -> Option<&RotationSchedule> {
        self.state.keys.rotation_schedule(owner, key_id)
    }

    pub fn key_access(&self, owner: Identity, entry_id: EntryId, accessor: Identity) -> Option<&KeyAccessRecord> {
        self.state.keys.access_record(&AccessLogKey {
            owner,
            entry_id,
            accessor,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authority Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify a grantee.
    pub fn verify_therapist(
        &mut self,
        ctx: &CallContext,
        identity: Identity,
        license_hash: &[u8],
    ) -> Result<()> {
        let GuardState {
            authority,
            permissions,
            ..
        } = &mut self.state;
        permissions.verify_therapist(authority, ctx, identity, license_hash)?;
        self.committed(ctx);
        tracing::debug!(therapist = %identity, "therapist verified");
        Ok(())
    }

    /// Suspend a grantee. Existing permissions are untouched.
    pub fn suspend_therapist(&mut self, ctx: &CallContext, identity: Identity) -> Result<()> {
        let GuardState {
            authority,
            permissions,
            ..
        } = &mut self.state;
        permissions.suspend_therapist(authority, ctx, identity)?;
        self.committed(ctx);
        tracing::debug!(therapist = %identity, "therapist suspended");
        Ok(())
    }

    pub fn set_max_shares_per_entry(&mut self, ctx: &CallContext, max: u32) -> Result<()> {
        let GuardState {
            authority,
            permissions,
            ..
        } = &mut self.state;
        permissions.set_max_shares_per_entry(authority, ctx, max)?;
        self.committed(ctx);
        tracing::debug!(max, "max shares per entry changed");
        Ok(())
    }

    pub fn set_audit_log_enabled(&mut self, ctx: &CallContext, enabled: bool) -> Result<()> {
        let GuardState {
            authority,
            permissions,
            ..
        } = &mut self.state;
        permissions.set_audit_log_enabled(authority, ctx, enabled)?;
        self.committed(ctx);
        Ok(())
    }

    pub fn set_default_rotation_period(&mut self, ctx: &CallContext, period: u64) -> Result<()> {
        let GuardState { authority, keys, .. } = &mut self.state;
        keys.set_default_rotation_period(authority, ctx, period)?;
        self.committed(ctx);
        tracing::debug!(period, "default rotation period changed");
        Ok(())
    }

    pub fn set_key_backup_enabled(&mut self, ctx: &CallContext, enabled: bool) -> Result<()> {
        let GuardState { authority, keys, .. } = &mut self.state;
        keys.set_key_backup_enabled(authority, ctx, enabled)?;
        self.committed(ctx);
        Ok(())
    }

    pub fn set_encryption_mode_supported(
        &mut self,
        ctx: &CallContext,
        mode: EncryptionMode,
        supported: bool,
    ) -> Result<()> {
        let GuardState { authority, keys, .. } = &mut self.state;
        keys.set_encryption_mode_supported(authority, ctx, mode, supported)?;
        self.committed(ctx);
        tracing::debug!(%mode, supported, "encryption mode changed");
        Ok(())
    }

    pub fn set_key_type_supported(
        &mut self,
        ctx: &CallContext,
        key_type: KeyType,
        supported: bool,
    ) -> Result<()> {
        let GuardState { authority, keys, .. } = &mut self.state;
        keys.set_key_type_supported(authority, ctx, key_type, supported)?;
        self.committed(ctx);
        tracing::debug!(%key_type, supported, "key type changed");
        Ok(())
    }
}
