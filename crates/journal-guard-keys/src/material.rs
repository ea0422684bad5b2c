//! Key types, encryption modes and the raw material callers submit.
//!
//! Requests carry raw bytes and raw mode/type strings so that each check can
//! fail with its own error, in the order the ledger defines.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use journal_guard_core::{AuthTag, EncryptedKey, EntryId, Height, Iv};

use crate::error::{KeysError, Result};

/// Algorithm of a registered identity public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyType {
    #[serde(rename = "ed25519")]
    Ed25519,
    #[serde(rename = "secp256k1")]
    Secp256k1,
}

impl KeyType {
    /// Every key type this layer knows.
    pub const ALL: [KeyType; 2] = [KeyType::Ed25519, KeyType::Secp256k1];

    /// Canonical string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
            KeyType::Secp256k1 => "secp256k1",
        }
    }
}

impl FromStr for KeyType {
    type Err = KeysError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ed25519" => Ok(KeyType::Ed25519),
            "secp256k1" => Ok(KeyType::Secp256k1),
            other => Err(KeysError::InvalidKeyType(other.to_string())),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AEAD mode the client used to wrap an entry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EncryptionMode {
    #[serde(rename = "AES-256-GCM")]
    Aes256Gcm,
    #[serde(rename = "CHACHA20-POLY1305")]
    ChaCha20Poly1305,
}

impl EncryptionMode {
    /// Every mode this layer knows.
    pub const ALL: [EncryptionMode; 2] = [EncryptionMode::Aes256Gcm, EncryptionMode::ChaCha20Poly1305];

    /// Canonical string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            EncryptionMode::Aes256Gcm => "AES-256-GCM",
            EncryptionMode::ChaCha20Poly1305 => "CHACHA20-POLY1305",
        }
    }
}

impl FromStr for EncryptionMode {
    type Err = KeysError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AES-256-GCM" => Ok(EncryptionMode::Aes256Gcm),
            "CHACHA20-POLY1305" => Ok(EncryptionMode::ChaCha20Poly1305),
            other => Err(KeysError::UnsupportedMode(other.to_string())),
        }
    }
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to store the key of one of the caller's entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeyRequest {
    pub entry_id: EntryId,
    pub encrypted_key: Bytes,
    pub iv: Bytes,
    pub auth_tag: Bytes,
    pub mode: String,
    pub kdf_salt: Bytes,
    pub kdf_iterations: u32,
    pub expires_at: Option<Height>,
    pub backup_key: Option<Bytes>,
}

impl StoreKeyRequest {
    /// A request with an empty KDF salt, no expiry and no backup.
    pub fn new(
        entry_id: EntryId,
        encrypted_key: impl Into<Bytes>,
        iv: impl Into<Bytes>,
        auth_tag: impl Into<Bytes>,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            entry_id,
            encrypted_key: encrypted_key.into(),
            iv: iv.into(),
            auth_tag: auth_tag.into(),
            mode: mode.into(),
            kdf_salt: Bytes::new(),
            kdf_iterations: 0,
            expires_at: None,
            backup_key: None,
        }
    }

    /// Set the KDF parameters.
    pub fn kdf(mut self, salt: impl Into<Bytes>, iterations: u32) -> Self {
        self.kdf_salt = salt.into();
        self.kdf_iterations = iterations;
        self
    }

    /// Set the key expiry height.
    pub fn expires_at(mut self, height: Height) -> Self {
        self.expires_at = Some(height);
        self
    }

    /// Attach a backup copy of the wrapped key.
    pub fn backup_key(mut self, backup: impl Into<Bytes>) -> Self {
        self.backup_key = Some(backup.into());
        self
    }
}

/// Request to replace the material of an existing entry key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotateKeyRequest {
    pub entry_id: EntryId,
    pub encrypted_key: Bytes,
    pub iv: Bytes,
    pub auth_tag: Bytes,
    pub backup_key: Option<Bytes>,
}

impl RotateKeyRequest {
    /// A rotation with no backup.
    pub fn new(
        entry_id: EntryId,
        encrypted_key: impl Into<Bytes>,
        iv: impl Into<Bytes>,
        auth_tag: impl Into<Bytes>,
    ) -> Self {
        Self {
            entry_id,
            encrypted_key: encrypted_key.into(),
            iv: iv.into(),
            auth_tag: auth_tag.into(),
            backup_key: None,
        }
    }

    /// Attach a backup copy of the new wrapped key.
    pub fn backup_key(mut self, backup: impl Into<Bytes>) -> Self {
        self.backup_key = Some(backup.into());
        self
    }
}

/// Validated ciphertext fields shared by store and rotate.
pub(crate) struct Ciphertext {
    pub encrypted_key: EncryptedKey,
    pub iv: Iv,
    pub auth_tag: AuthTag,
}

impl Ciphertext {
    pub(crate) fn parse(encrypted_key: &Bytes, iv: &Bytes, auth_tag: &Bytes) -> Result<Self> {
        Ok(Self {
            encrypted_key: EncryptedKey::new(encrypted_key.clone())
                .map_err(KeysError::InvalidEncryptedKey)?,
            iv: Iv::new(iv.clone()).map_err(KeysError::InvalidIv)?,
            auth_tag: AuthTag::new(auth_tag.clone()).map_err(KeysError::InvalidAuthTag)?,
        })
    }
}

pub(crate) fn parse_backup(backup: Option<&Bytes>) -> Result<Option<EncryptedKey>> {
    backup
        .map(|bytes| EncryptedKey::new(bytes.clone()).map_err(KeysError::InvalidBackupKey))
        .transpose()
}
