//! Identity public keys.
//!
//! Each identity registers exactly one long-lived public key. Registration is
//! single-shot: there is no way to replace an identity key.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use journal_guard_core::{Authority, CallContext, Height, Identity, KeyId, RawPublicKey};

use crate::error::{KeysError, Result};
use crate::material::KeyType;

/// A registered identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRecord {
    pub key_id: KeyId,
    pub public_key: RawPublicKey,
    pub key_type: KeyType,
    pub created_at: Height,
}

/// Identity keys, one per identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRegistry {
    records: BTreeMap<Identity, PublicKeyRecord>,
    next_id: KeyId,
    supported_types: BTreeSet<KeyType>,
}

impl Default for PublicKeyRegistry {
    fn default() -> Self {
        Self::new(KeyType::ALL)
    }
}

impl PublicKeyRegistry {
    /// Create an empty registry accepting `supported_types`.
    pub fn new(supported_types: impl IntoIterator<Item = KeyType>) -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: KeyId(0),
            supported_types: supported_types.into_iter().collect(),
        }
    }

    /// Register the caller's identity key.
    pub fn register(&mut self, ctx: &CallContext, raw_key: &[u8], key_type: &str) -> Result<KeyId> {
        let public_key = RawPublicKey::try_from(raw_key).map_err(KeysError::InvalidPublicKey)?;
        let key_type: KeyType = key_type.parse()?;
        if !self.supported_types.contains(&key_type) {
            return Err(KeysError::InvalidKeyType(key_type.to_string()));
        }
        if self.records.contains_key(&ctx.caller) {
            return Err(KeysError::KeyAlreadyExists);
        }

        let key_id = self.next_id;
        self.next_id = key_id.next();
        self.records.insert(
            ctx.caller,
            PublicKeyRecord {
                key_id,
                public_key,
                key_type,
                created_at: ctx.now,
            },
        );
        Ok(key_id)
    }

    /// Get the identity key of `identity`.
    pub fn get(&self, identity: &Identity) -> Option<&PublicKeyRecord> {
        self.records.get(identity)
    }

    /// Whether `identity` has registered a key.
    pub fn contains(&self, identity: &Identity) -> bool {
        self.records.contains_key(identity)
    }

    /// Key types currently accepted.
    pub fn supported_types(&self) -> impl Iterator<Item = KeyType> + '_ {
        self.supported_types.iter().copied()
    }

    /// Enable or disable a key type for future registrations. Authority only.
    pub fn set_supported(
        &mut self,
        authority: &Authority,
        ctx: &CallContext,
        key_type: KeyType,
        supported: bool,
    ) -> Result<()> {
        authority.require(&ctx.caller)?;
        if supported {
            self.supported_types.insert(key_type);
        } else {
            self.supported_types.remove(&key_type);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_guard_core::CoreError;

    const ADMIN: Identity = Identity([0xa1; 32]);
    const USER: Identity = Identity([0x01; 32]);

    fn ctx() -> CallContext {
        CallContext::new(USER, Height(1000))
    }

    #[test]
    fn test_register() {
        let mut registry = PublicKeyRegistry::default();
        let key_id = registry.register(&ctx(), &[7u8; 64], "ed25519").unwrap();
        assert_eq!(key_id, KeyId(0));

        let record = registry.get(&USER).unwrap();
        assert_eq!(record.key_type, KeyType::Ed25519);
        assert_eq!(record.created_at, Height(1000));
        assert_eq!(record.public_key.as_bytes(), &[7u8; 64]);
    }

    #[test]
    fn test_register_is_single_shot() {
        let mut registry = PublicKeyRegistry::default();
        registry.register(&ctx(), &[0u8; 64], "ed25519").unwrap();
        assert_eq!(
            registry.register(&ctx(), &[1u8; 64], "secp256k1"),
            Err(KeysError::KeyAlreadyExists)
        );
        assert_eq!(registry.get(&USER).unwrap().key_type, KeyType::Ed25519);
    }

    #[test]
    fn test_register_validation_order() {
        let mut registry = PublicKeyRegistry::default();
        assert_eq!(
            registry.register(&ctx(), &[0u8; 32], "rsa"),
            Err(KeysError::InvalidPublicKey(CoreError::InvalidLength {
                field: "public key",
                expected: 64,
                actual: 32
            }))
        );
        assert_eq!(
            registry.register(&ctx(), &[0u8; 64], "rsa"),
            Err(KeysError::InvalidKeyType("rsa".into()))
        );
        assert!(!registry.contains(&USER));
    }

    #[test]
    fn test_disabled_key_type() {
        let mut authority = Authority::unset();
        authority.set(ADMIN).unwrap();
        let mut registry = PublicKeyRegistry::default();
        registry
            .set_supported(&authority, &CallContext::new(ADMIN, Height(1)), KeyType::Secp256k1, false)
            .unwrap();

        assert_eq!(
            registry.register(&ctx(), &[0u8; 64], "secp256k1"),
            Err(KeysError::InvalidKeyType("secp256k1".into()))
        );
        assert_eq!(registry.supported_types().collect::<Vec<_>>(), vec![KeyType::Ed25519]);
    }
}
