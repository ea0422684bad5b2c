//! Proptest generators for property-based testing.

use proptest::prelude::*;

use journal_guard_core::{EntryId, Height, Identity};

/// A random non-null identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    any::<[u8; 32]>()
        .prop_filter("null identity", |bytes| bytes != &[0u8; 32])
        .prop_map(Identity)
}

/// A small entry id, so that operations collide on the same entries.
pub fn entry_id(max: u64) -> impl Strategy<Value = EntryId> {
    (0..max).prop_map(EntryId)
}

/// A valid permission level.
pub fn level() -> impl Strategy<Value = u8> {
    1u8..=3
}

/// A raw level outside `1..=3`.
pub fn invalid_level() -> impl Strategy<Value = u8> {
    prop_oneof![Just(0u8), 4u8..=u8::MAX]
}

/// A height well away from `u64::MAX`.
pub fn height() -> impl Strategy<Value = Height> {
    (0u64..1_000_000).prop_map(Height)
}

/// Bytes of any length except `len`.
pub fn wrong_len(len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..len * 2)
        .prop_filter("exact length", move |bytes| bytes.len() != len)
}

/// One step of a permission workload over a pool of grantees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOp {
    Grant { grantee: usize, level: u8 },
    Update { grantee: usize, level: u8 },
    Revoke { grantee: usize },
    Check { grantee: usize },
}

impl GrantOp {
    /// Index of the grantee this step targets.
    pub fn grantee(&self) -> usize {
        match *self {
            GrantOp::Grant { grantee, .. }
            | GrantOp::Update { grantee, .. }
            | GrantOp::Revoke { grantee }
            | GrantOp::Check { grantee } => grantee,
        }
    }
}

/// A raw level, mostly valid.
fn raw_level() -> impl Strategy<Value = u8> {
    prop_oneof![4 => level(), 1 => invalid_level()]
}

/// A single step over `pool` grantees. Levels may be out of range.
pub fn grant_op(pool: usize) -> impl Strategy<Value = GrantOp> {
    let grantee = 0..pool;
    prop_oneof![
        3 => (grantee.clone(), raw_level()).prop_map(|(grantee, level)| GrantOp::Grant { grantee, level }),
        1 => (grantee.clone(), raw_level()).prop_map(|(grantee, level)| GrantOp::Update { grantee, level }),
        2 => grantee.clone().prop_map(|grantee| GrantOp::Revoke { grantee }),
        1 => grantee.prop_map(|grantee| GrantOp::Check { grantee }),
    ]
}

/// A sequence of up to `max_len` steps over `pool` grantees.
pub fn grant_ops(pool: usize, max_len: usize) -> impl Strategy<Value = Vec<GrantOp>> {
    prop::collection::vec(grant_op(pool), 0..=max_len)
}

/// Ciphertext fields of an entry key, with their lengths possibly wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub encrypted_key: Vec<u8>,
    pub iv: Vec<u8>,
    pub auth_tag: Vec<u8>,
}

impl KeyMaterial {
    /// Whether every field has its required length.
    pub fn is_well_formed(&self) -> bool {
        self.encrypted_key.len() == 128 && self.iv.len() == 12 && self.auth_tag.len() == 16
    }
}

fn field(len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        4 => prop::collection::vec(any::<u8>(), len),
        1 => wrong_len(len),
    ]
}

impl Arbitrary for KeyMaterial {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (field(128), field(12), field(16))
            .prop_map(|(encrypted_key, iv, auth_tag)| KeyMaterial {
                encrypted_key,
                iv,
                auth_tag,
            })
            .boxed()
    }
}
