//! The key manager.
//!
//! Groups the identity keys, entry keys, rotation schedules and access log
//! behind one set of operations. Store seeds a schedule and rotate advances
//! it, so the two always stay in step.

use serde::{Deserialize, Serialize};

use journal_guard_core::{Authority, CallContext, EntryId, Height, Identity, KeyId};

use crate::access_log::{AccessLogKey, KeyAccessLog, KeyAccessRecord};
use crate::entry_key::{EntryEncryptionKey, EntryKeyRef, EntryKeyStore};
use crate::error::{KeysError, Result};
use crate::material::{EncryptionMode, KeyType, RotateKeyRequest, StoreKeyRequest};
use crate::public_key::{PublicKeyRecord, PublicKeyRegistry};
use crate::rotation::{RotationSchedule, RotationScheduler};

/// Key state for all identities and entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyManager {
    identities: PublicKeyRegistry,
    entry_keys: EntryKeyStore,
    rotation: RotationScheduler,
    access_log: KeyAccessLog,
}

impl KeyManager {
    /// Create a manager from its parts.
    pub fn new(
        identities: PublicKeyRegistry,
        entry_keys: EntryKeyStore,
        rotation: RotationScheduler,
    ) -> Self {
        Self {
            identities,
            entry_keys,
            rotation,
            access_log: KeyAccessLog::new(),
        }
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
        self.identities.register(ctx, raw_key, key_type)
    }

    /// Store the key of one of the caller's entries and seed its schedule.
    pub fn store_entry_key(&mut self, ctx: &CallContext, request: StoreKeyRequest) -> Result<KeyId> {
        let key_id = self.entry_keys.store(ctx, request, &self.identities)?;
        self.rotation.seed(ctx.caller, key_id, ctx.now);
        Ok(key_id)
    }

    /// Rotate the key of one of the caller's entries and advance its schedule.
    pub fn rotate_entry_key(&mut self, ctx: &CallContext, request: RotateKeyRequest) -> Result<KeyId> {
        let key_id = self.entry_keys.rotate(ctx, request)?;
        self.rotation.advance(ctx.caller, key_id, ctx.now);
        Ok(key_id)
    }

    /// Record an access to an entry key by `accessor`.
    ///
    /// Overwrites the previous record for the same accessor. Fails
    /// `KeyNotFound` if the entry has no key.
    pub fn log_key_access(
        &mut self,
        ctx: &CallContext,
        entry_id: EntryId,
        accessor: Identity,
        success: bool,
    ) -> Result<()> {
        let key_id = self
            .entry_keys
            .get(&EntryKeyRef::new(ctx.caller, entry_id))
            .map(|key| key.key_id)
            .ok_or(KeysError::KeyNotFound)?;

        self.access_log.record(
            AccessLogKey {
                owner: ctx.caller,
                entry_id,
                accessor,
            },
            KeyAccessRecord {
                accessed_at: ctx.now,
                key_id,
                success,
            },
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether the key is due for rotation at `now`.
    pub fn is_rotation_due(&self, now: Height, owner: &Identity, key_id: KeyId) -> Result<bool> {
        self.rotation.is_due(now, owner, key_id)
    }

    /// Key ids of `owner` due for rotation at `now`.
    pub fn keys_due_for_rotation(&self, owner: &Identity, now: Height) -> Vec<KeyId> {
        self.rotation.due_for(owner, now)
    }

    pub fn public_key(&self, identity: &Identity) -> Option<&PublicKeyRecord> {
        self.identities.get(identity)
    }

    pub fn entry_key(&self, owner: &Identity, entry_id: EntryId) -> Option<&EntryEncryptionKey> {
        self.entry_keys.get(&EntryKeyRef::new(*owner, entry_id))
    }

    pub fn rotation_schedule(&self, owner: &Identity, key_id: KeyId) -> Option<&RotationSchedule> {
        self.rotation.get(owner, key_id)
    }

    pub fn access_record(&self, key: &AccessLogKey) -> Option<&KeyAccessRecord> {
        self.access_log.get(key)
    }

    pub fn default_rotation_period(&self) -> u64 {
        self.rotation.default_period()
    }

    pub fn key_backup_enabled(&self) -> bool {
        self.entry_keys.backup_enabled()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authority Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Change the period of future schedules. Authority only.
    pub fn set_default_rotation_period(
        &mut self,
        authority: &Authority,
        ctx: &CallContext,
        period: u64,
    ) -> Result<()> {
        authority.require(&ctx.caller)?;
        self.rotation.set_default_period(period)
    }

    /// Accept or reject backup keys. Authority only.
    pub fn set_key_backup_enabled(
        &mut self,
        authority: &Authority,
        ctx: &CallContext,
        enabled: bool,
    ) -> Result<()> {
        authority.require(&ctx.caller)?;
        self.entry_keys.set_backup_enabled(enabled);
        Ok(())
    }

    /// Enable or disable an encryption mode. Authority only.
    pub fn set_encryption_mode_supported(
        &mut self,
        authority: &Authority,
        ctx: &CallContext,
        mode: EncryptionMode,
        supported: bool,
    ) -> Result<()> {
        authority.require(&ctx.caller)?;
        self.entry_keys.set_mode_supported(mode, supported);
        Ok(())
    }

    /// Enable or disable an identity key type. Authority only.
    pub fn set_key_type_supported(
        &mut self,
        authority: &Authority,
        ctx: &CallContext,
        key_type: KeyType,
        supported: bool,
    ) -> Result<()> {
        self.identities.set_supported(authority, ctx, key_type, supported)
    }
}
