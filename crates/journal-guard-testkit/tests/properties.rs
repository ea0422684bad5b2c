//! Property tests over the Guard API.

use proptest::prelude::*;

use journal_guard::perms::PermsError;
use journal_guard::{snapshot, EntryId, GrantRequest, GuardConfig, GuardError, Height, KeyId};
use journal_guard::{RotateKeyRequest, StoreKeyRequest};
use journal_guard_testkit::fixtures::{rotate_request, store_request};
use journal_guard_testkit::generators::{grant_ops, height, level};
use journal_guard_testkit::{GrantOp, GuardFixture, KeyMaterial};

const POOL: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Model {
    Absent,
    Active,
    Revoked,
}

fn perms_err<T: std::fmt::Debug>(result: journal_guard::Result<T>) -> Option<PermsError> {
    match result {
        Ok(_) => None,
        Err(GuardError::Permission(e)) => Some(e),
        Err(other) => panic!("unexpected error {other:?}"),
    }
}

fn valid(level: u8) -> bool {
    (1..=3).contains(&level)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Active shares equal grants minus revokes, never exceed the cap, and
    /// every outcome matches a simple model. Failures change nothing.
    #[test]
    fn share_count_follows_model(max in 1u32..=4, ops in grant_ops(POOL, 40)) {
        let config = GuardConfig { max_shares_per_entry: max, ..GuardConfig::default() };
        let mut fixture = GuardFixture::with_config(config, POOL);
        let owner = fixture.owner;
        let mut model = [Model::Absent; POOL];

        for (step, op) in ops.iter().enumerate() {
            let ctx = fixture.owner_ctx(step as u64 + 1);
            let grantee = fixture.therapists[op.grantee()];
            let active = model.iter().filter(|m| **m == Model::Active).count() as u32;
            let slot = model[op.grantee()];
            let before = fixture.guard.state().clone();

            let (expected, outcome) = match *op {
                GrantOp::Grant { level, .. } => {
                    let expected = if !valid(level) {
                        Some(PermsError::InvalidLevel(level))
                    } else if active >= max {
                        Some(PermsError::MaxSharesExceeded { max })
                    } else if slot != Model::Absent {
                        Some(PermsError::AlreadyGranted)
                    } else {
                        None
                    };
                    let outcome = perms_err(fixture.guard.grant_permission(&ctx, GrantRequest::new(EntryId(0), grantee, level)));
                    if outcome.is_none() {
                        model[op.grantee()] = Model::Active;
                    }
                    (expected, outcome)
                }
                GrantOp::Update { level, .. } => {
                    let expected = if !valid(level) {
                        Some(PermsError::InvalidLevel(level))
                    } else {
                        match slot {
                            Model::Absent => Some(PermsError::PermissionNotFound),
                            Model::Revoked => Some(PermsError::PermissionRevoked),
                            Model::Active => None,
                        }
                    };
                    let outcome = perms_err(fixture.guard.update_permission_level(&ctx, EntryId(0), grantee, level));
                    (expected, outcome)
                }
                GrantOp::Revoke { .. } => {
                    let expected = match slot {
                        Model::Absent => Some(PermsError::PermissionNotFound),
                        Model::Revoked => Some(PermsError::PermissionRevoked),
                        Model::Active => None,
                    };
                    let outcome = perms_err(fixture.guard.revoke_permission(&ctx, EntryId(0), grantee));
                    if outcome.is_none() {
                        model[op.grantee()] = Model::Revoked;
                    }
                    (expected, outcome)
                }
                GrantOp::Check { .. } => {
                    let expected = (slot != Model::Active).then_some(PermsError::NotGranted);
                    let outcome = perms_err(fixture.guard.check_access(ctx.now, owner, EntryId(0), grantee));
                    (expected, outcome)
                }
            };

            prop_assert_eq!(&outcome, &expected, "step {} {:?}", step, op);
            if outcome.is_some() {
                prop_assert_eq!(fixture.guard.state(), &before);
            }

            let active = model.iter().filter(|m| **m == Model::Active).count() as u32;
            prop_assert_eq!(fixture.guard.active_shares(&owner, EntryId(0)), active);
            prop_assert!(active <= max);
        }
    }

    /// A second grant of the same triple fails, revoked or not.
    #[test]
    fn regrant_always_fails(first in level(), second in level(), revoke in any::<bool>()) {
        let mut fixture = GuardFixture::new(1);
        let grantee = fixture.therapists[0];
        let ctx = fixture.owner_ctx(10);

        fixture.guard.grant_permission(&ctx, GrantRequest::new(EntryId(0), grantee, first)).unwrap();
        if revoke {
            fixture.guard.revoke_permission(&ctx, EntryId(0), grantee).unwrap();
        }
        let result = perms_err(fixture.guard.grant_permission(&ctx.at(Height(20)), GrantRequest::new(EntryId(0), grantee, second)));
        prop_assert_eq!(result, Some(PermsError::AlreadyGranted));
    }

    /// At or past expiry a check reports expiry, never the level or NotGranted.
    #[test]
    fn expiry_reports_expired(granted in height(), lifetime in 1u64..10_000, probe in 0u64..20_000, lvl in level()) {
        let mut fixture = GuardFixture::new(1);
        let grantee = fixture.therapists[0];
        let ctx = fixture.owner_ctx(granted.get());
        let expires_at = granted.plus(lifetime);
        fixture.guard
            .grant_permission(&ctx, GrantRequest::new(EntryId(0), grantee, lvl).expires_at(expires_at))
            .unwrap();

        let now = granted.plus(probe);
        let result = fixture.guard.check_access(now, fixture.owner, EntryId(0), grantee);
        if now >= expires_at {
            prop_assert_eq!(perms_err(result), Some(PermsError::PermissionExpired { expires_at }));
        } else {
            prop_assert_eq!(result.unwrap().get(), lvl);
        }
    }

    /// Stored material reads back exactly; malformed material is rejected.
    #[test]
    fn stored_key_reads_back(material: KeyMaterial, now in height()) {
        let mut fixture = GuardFixture::new(0);
        fixture.register_owner_key(0);
        let ctx = fixture.owner_ctx(now.get());

        let request = StoreKeyRequest::new(
            EntryId(0),
            material.encrypted_key.clone(),
            material.iv.clone(),
            material.auth_tag.clone(),
            "CHACHA20-POLY1305",
        );
        let result = fixture.guard.store_entry_key(&ctx, request);
        prop_assert_eq!(result.is_ok(), material.is_well_formed());

        if let Ok(key_id) = result {
            let key = fixture.guard.entry_key(&fixture.owner, EntryId(0)).unwrap();
            prop_assert_eq!(key.key_id, key_id);
            prop_assert_eq!(key.encrypted_key.as_bytes(), &material.encrypted_key[..]);
            prop_assert_eq!(key.iv.as_bytes(), &material.iv[..]);
            prop_assert_eq!(key.auth_tag.as_bytes(), &material.auth_tag[..]);
            prop_assert_eq!(key.rotated_at, now);
        } else {
            prop_assert!(fixture.guard.entry_key(&fixture.owner, EntryId(0)).is_none());
        }
    }

    /// Rotation keeps the key id and resets the schedule.
    #[test]
    fn rotation_keeps_key_id(stored_at in height(), elapsed in 0u64..1_000, period in 1u64..500) {
        let mut fixture = GuardFixture::new(0);
        let admin = fixture.admin_ctx(0);
        fixture.guard.set_default_rotation_period(&admin, period).unwrap();
        fixture.register_owner_key(0);

        let ctx = fixture.owner_ctx(stored_at.get());
        let key_id = fixture.guard.store_entry_key(&ctx, store_request(0, 1)).unwrap();
        prop_assert!(!fixture.guard.is_rotation_due(stored_at, &fixture.owner, key_id).unwrap());
        prop_assert!(fixture.guard.is_rotation_due(stored_at.plus(period), &fixture.owner, key_id).unwrap());

        let rotated_at = stored_at.plus(elapsed);
        let rotated = fixture.guard
            .rotate_entry_key(&ctx.at(rotated_at), rotate_request(0, 2))
            .unwrap();
        prop_assert_eq!(rotated, key_id);
        prop_assert_eq!(fixture.guard.entry_key(&fixture.owner, EntryId(0)).unwrap().rotated_at, rotated_at);
        prop_assert!(!fixture.guard.is_rotation_due(rotated_at, &fixture.owner, key_id).unwrap());
        prop_assert!(fixture.guard.is_rotation_due(rotated_at.plus(period), &fixture.owner, key_id).unwrap());
    }

    /// A checkpoint decodes to the state it was taken from.
    #[test]
    fn checkpoint_round_trip(ops in grant_ops(POOL, 20), keys in 0u64..4) {
        let mut fixture = GuardFixture::new(POOL);
        fixture.register_owner_key(0);
        for entry in 0..keys {
            let ctx = fixture.owner_ctx(entry + 1);
            fixture.guard.store_entry_key(&ctx, store_request(entry, entry as u8)).unwrap();
        }
        for (step, op) in ops.iter().enumerate() {
            let ctx = fixture.owner_ctx(100 + step as u64);
            let grantee = fixture.therapists[op.grantee()];
            let _ = match *op {
                GrantOp::Grant { level, .. } => fixture.guard.grant_permission(&ctx, GrantRequest::new(EntryId(0), grantee, level)).map(drop),
                GrantOp::Update { level, .. } => fixture.guard.update_permission_level(&ctx, EntryId(0), grantee, level),
                GrantOp::Revoke { .. } => fixture.guard.revoke_permission(&ctx, EntryId(0), grantee),
                GrantOp::Check { .. } => fixture.guard.check_access(ctx.now, fixture.owner, EntryId(0), grantee).map(drop),
            };
        }

        let record = snapshot::encode(fixture.guard.height(), fixture.guard.state()).unwrap();
        prop_assert!(record.verify());
        prop_assert_eq!(&snapshot::decode(&record).unwrap(), fixture.guard.state());
    }
}

#[test]
fn rotating_missing_key_fails() {
    let mut fixture = GuardFixture::new(0);
    fixture.register_owner_key(0);
    let ctx = fixture.owner_ctx(5);
    let result = fixture
        .guard
        .rotate_entry_key(&ctx, RotateKeyRequest::new(EntryId(3), vec![0u8; 128], vec![0u8; 12], vec![0u8; 16]));
    assert!(matches!(result, Err(GuardError::Keys(_))));
    assert!(fixture.guard.rotation_schedule(&fixture.owner, KeyId(0)).is_none());
}
