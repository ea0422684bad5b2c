//! Registry of verified grantees.
//!
//! Only the authority writes here. A grant requires the grantee to be
//! verified and not suspended.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use journal_guard_core::{Authority, CallContext, Height, Identity, LicenseHash};

use crate::error::{PermsError, Result};

/// Verification record of a grantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapistRecord {
    /// Set by the authority on verification.
    pub verified: bool,
    /// Hash of the professional license presented at verification.
    pub license_hash: LicenseHash,
    /// Height of the latest verification.
    pub verified_at: Height,
    /// Cleared by suspension.
    pub active: bool,
}

impl TherapistRecord {
    /// Whether this grantee may receive new permissions.
    pub fn is_eligible(&self) -> bool {
        self.verified && self.active
    }
}

/// Verified grantees, indexed by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapistRegistry {
    records: BTreeMap<Identity, TherapistRecord>,
}

impl TherapistRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify `identity`. Re-verifying replaces the record and refreshes `verified_at`.
    pub fn verify(
        &mut self,
        authority: &Authority,
        ctx: &CallContext,
        identity: Identity,
        license_hash: &[u8],
    ) -> Result<()> {
        authority.require(&ctx.caller)?;
        let license_hash = LicenseHash::try_from(license_hash).map_err(PermsError::InvalidLicense)?;

        self.records.insert(
            identity,
            TherapistRecord {
                verified: true,
                license_hash,
                verified_at: ctx.now,
                active: true,
            },
        );
        Ok(())
    }

    /// Suspend a verified grantee. Existing permissions are untouched.
    pub fn suspend(
        &mut self,
        authority: &Authority,
        ctx: &CallContext,
        identity: Identity,
    ) -> Result<()> {
        authority.require(&ctx.caller)?;
        let record = self
            .records
            .get_mut(&identity)
            .ok_or(PermsError::TherapistNotFound(identity))?;
        record.active = false;
        Ok(())
    }

    /// Whether `identity` may receive new permissions.
    pub fn is_eligible(&self, identity: &Identity) -> bool {
        self.records
            .get(identity)
            .is_some_and(TherapistRecord::is_eligible)
    }

    /// Get the record of `identity`.
    pub fn get(&self, identity: &Identity) -> Option<&TherapistRecord> {
        self.records.get(identity)
    }
}
