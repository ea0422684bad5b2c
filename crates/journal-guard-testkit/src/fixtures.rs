//! Test fixtures and helpers.

use journal_guard::{
    CallContext, EntryId, Guard, GuardConfig, Height, Identity, OpenDirectory, RotateKeyRequest,
    StoreKeyRequest,
};
use journal_guard_core::{Blake3Hash, Keypair};

/// Deterministic identities, one per seed index starting at `first`.
pub fn parties(first: u8, count: usize) -> Vec<Identity> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = first.wrapping_add(i as u8);
            seed[31] = 0x5a;
            Keypair::from_seed(&seed).identity()
        })
        .collect()
}

/// A guard with an authority and a set of verified grantees.
pub struct GuardFixture {
    pub guard: Guard,
    pub admin: Identity,
    pub owner: Identity,
    pub therapists: Vec<Identity>,
}

impl GuardFixture {
    /// Default configuration with `therapists` verified grantees.
    pub fn new(therapists: usize) -> Self {
        Self::with_config(GuardConfig::default(), therapists)
    }

    /// Custom configuration with `therapists` verified grantees.
    ///
    /// Panics if the configuration is invalid.
    pub fn with_config(config: GuardConfig, therapists: usize) -> Self {
        let admin = parties(0xa0, 1)[0];
        let owner = parties(0x01, 1)[0];
        let therapists = parties(0x10, therapists);

        let mut guard = Guard::with_config(&config, OpenDirectory).expect("valid config");
        let ctx = CallContext::new(admin, Height::ZERO);
        guard.set_authority(&ctx, admin).expect("fresh authority");
        for (i, therapist) in therapists.iter().enumerate() {
            let license = Blake3Hash::hash(format!("license-{i}").as_bytes());
            guard
                .verify_therapist(&ctx, *therapist, license.as_bytes())
                .expect("authority verifies");
        }

        Self {
            guard,
            admin,
            owner,
            therapists,
        }
    }

    /// The owner calling at `now`.
    pub fn owner_ctx(&self, now: u64) -> CallContext {
        CallContext::new(self.owner, Height(now))
    }

    /// The authority calling at `now`.
    pub fn admin_ctx(&self, now: u64) -> CallContext {
        CallContext::new(self.admin, Height(now))
    }

    /// Register an ed25519 identity key for the owner.
    pub fn register_owner_key(&mut self, now: u64) {
        let ctx = self.owner_ctx(now);
        self.guard
            .register_public_key(&ctx, &[0x42; 64], "ed25519")
            .expect("first registration");
    }
}

/// A well-formed store request for `entry`, each field filled with `fill`.
pub fn store_request(entry: u64, fill: u8) -> StoreKeyRequest {
    StoreKeyRequest::new(
        EntryId(entry),
        vec![fill; 128],
        vec![fill; 12],
        vec![fill; 16],
        "AES-256-GCM",
    )
    .kdf(vec![fill; 32], 100_000)
}

/// A well-formed rotation for `entry`, each field filled with `fill`.
pub fn rotate_request(entry: u64, fill: u8) -> RotateKeyRequest {
    RotateKeyRequest::new(EntryId(entry), vec![fill; 128], vec![fill; 12], vec![fill; 16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parties_are_distinct_and_deterministic() {
        let a = parties(0x10, 4);
        assert_eq!(a, parties(0x10, 4));
        for (i, x) in a.iter().enumerate() {
            assert!(!x.is_null());
            assert!(a[i + 1..].iter().all(|y| y != x));
        }
    }

    #[test]
    fn test_fixture_setup() {
        let fixture = GuardFixture::new(3);
        assert_eq!(fixture.guard.authority(), Some(fixture.admin));
        for therapist in &fixture.therapists {
            assert!(fixture
                .guard
                .therapist(therapist)
                .is_some_and(|record| record.is_eligible()));
        }
        assert!(!fixture.therapists.contains(&fixture.owner));
    }
}
