//! Per-entry encryption keys.
//!
//! Each `(owner, entry)` has at most one key. Rotation replaces the
//! ciphertext in place; the `key_id` allocated on store never changes.

use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use journal_guard_core::{AuthTag, CallContext, EncryptedKey, EntryId, Height, Identity, Iv, KeyId};

use crate::error::{KeysError, Result};
use crate::material::{parse_backup, Ciphertext, EncryptionMode, RotateKeyRequest, StoreKeyRequest};
use crate::public_key::PublicKeyRegistry;

/// Key of an entry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryKeyRef {
    pub owner: Identity,
    pub entry_id: EntryId,
}

impl EntryKeyRef {
    /// Create a new entry key reference.
    pub const fn new(owner: Identity, entry_id: EntryId) -> Self {
        Self { owner, entry_id }
    }
}

/// Wrapped key material of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryEncryptionKey {
    /// Stable across rotation.
    pub key_id: KeyId,
    pub encrypted_key: EncryptedKey,
    pub iv: Iv,
    pub auth_tag: AuthTag,
    pub mode: EncryptionMode,
    pub kdf_salt: Bytes,
    pub kdf_iterations: u32,
    pub expires_at: Option<Height>,
    /// Height of the store or of the latest rotation.
    pub rotated_at: Height,
    pub backup_key: Option<EncryptedKey>,
}

/// Entry keys of all owners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryKeyStore {
    keys: BTreeMap<EntryKeyRef, EntryEncryptionKey>,
    next_id: KeyId,
    supported_modes: BTreeSet<EncryptionMode>,
    backup_enabled: bool,
}

impl Default for EntryKeyStore {
    fn default() -> Self {
        Self::new(EncryptionMode::ALL, true)
    }
}

impl EntryKeyStore {
    /// Create an empty store.
    pub fn new(supported_modes: impl IntoIterator<Item = EncryptionMode>, backup_enabled: bool) -> Self {
        Self {
            keys: BTreeMap::new(),
            next_id: KeyId(0),
            supported_modes: supported_modes.into_iter().collect(),
            backup_enabled,
        }
    }

    /// Store the key of one of the caller's entries.
    ///
    /// Checks, in order: ciphertext lengths, encryption mode, the caller has a
    /// registered identity key, the entry has no key yet, and the backup key.
    pub fn store(
        &mut self,
        ctx: &CallContext,
        request: StoreKeyRequest,
        identities: &PublicKeyRegistry,
    ) -> Result<KeyId> {
        let Ciphertext {
            encrypted_key,
            iv,
            auth_tag,
        } = Ciphertext::parse(&request.encrypted_key, &request.iv, &request.auth_tag)?;
        let mode: EncryptionMode = request.mode.parse()?;
        if !self.supported_modes.contains(&mode) {
            return Err(KeysError::UnsupportedMode(mode.to_string()));
        }
        if !identities.contains(&ctx.caller) {
            return Err(KeysError::KeyNotFound);
        }
        let key_ref = EntryKeyRef::new(ctx.caller, request.entry_id);
        if self.keys.contains_key(&key_ref) {
            return Err(KeysError::KeyAlreadyExists);
        }
        let backup_key = self.check_backup(request.backup_key.as_ref())?;

        let key_id = self.next_id;
        self.next_id = key_id.next();
        self.keys.insert(
            key_ref,
            EntryEncryptionKey {
                key_id,
                encrypted_key,
                iv,
                auth_tag,
                mode,
                kdf_salt: request.kdf_salt,
                kdf_iterations: request.kdf_iterations,
                expires_at: request.expires_at,
                rotated_at: ctx.now,
                backup_key,
            },
        );
        Ok(key_id)
    }

    /// Replace the material of an existing key. Returns the unchanged key id.
    ///
    /// The backup is replaced as well, and cleared when the request has none.
    pub fn rotate(&mut self, ctx: &CallContext, request: RotateKeyRequest) -> Result<KeyId> {
        let ciphertext = Ciphertext::parse(&request.encrypted_key, &request.iv, &request.auth_tag)?;
        let backup_key = self.check_backup(request.backup_key.as_ref())?;
        let key = self
            .keys
            .get_mut(&EntryKeyRef::new(ctx.caller, request.entry_id))
            .ok_or(KeysError::KeyNotFound)?;

        key.encrypted_key = ciphertext.encrypted_key;
        key.iv = ciphertext.iv;
        key.auth_tag = ciphertext.auth_tag;
        key.rotated_at = ctx.now;
        key.backup_key = backup_key;
        Ok(key.key_id)
    }

    fn check_backup(&self, backup: Option<&Bytes>) -> Result<Option<EncryptedKey>> {
        let backup = parse_backup(backup)?;
        if backup.is_some() && !self.backup_enabled {
            return Err(KeysError::BackupDisabled);
        }
        Ok(backup)
    }

    /// Get an entry key.
    pub fn get(&self, key_ref: &EntryKeyRef) -> Option<&EntryEncryptionKey> {
        self.keys.get(key_ref)
    }

    /// Whether backups are accepted.
    pub fn backup_enabled(&self) -> bool {
        self.backup_enabled
    }

    pub(crate) fn set_backup_enabled(&mut self, enabled: bool) {
        self.backup_enabled = enabled;
    }

    /// Modes currently accepted.
    pub fn supported_modes(&self) -> impl Iterator<Item = EncryptionMode> + '_ {
        self.supported_modes.iter().copied()
    }

    pub(crate) fn set_mode_supported(&mut self, mode: EncryptionMode, supported: bool) {
        if supported {
            self.supported_modes.insert(mode);
        } else {
            self.supported_modes.remove(&mode);
        }
    }
}
