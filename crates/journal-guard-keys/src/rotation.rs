//! Key rotation scheduling.
//!
//! A schedule is seeded when an entry key is stored and advanced whenever it
//! is rotated. `next_rotation` and `last_rotated` always move together.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use journal_guard_core::{Height, Identity, KeyId};

use crate::error::{KeysError, Result};

/// Default rotation period, in heights.
pub const DEFAULT_ROTATION_PERIOD: u64 = 365;

/// Key of a rotation schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RotationKey {
    pub owner: Identity,
    pub key_id: KeyId,
}

/// When a key is next due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSchedule {
    pub next_rotation: Height,
    pub period: u64,
    pub auto_rotate: bool,
    pub last_rotated: Height,
}

impl RotationSchedule {
    /// Whether rotation is due at `now`.
    pub fn is_due(&self, now: Height) -> bool {
        now >= self.next_rotation
    }
}

/// Schedules per (owner, key id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationScheduler {
    schedules: BTreeMap<RotationKey, RotationSchedule>,
    default_period: u64,
}

impl Default for RotationScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_ROTATION_PERIOD)
    }
}

impl RotationScheduler {
    /// Create an empty scheduler.
    pub fn new(default_period: u64) -> Self {
        Self {
            schedules: BTreeMap::new(),
            default_period,
        }
    }

    /// Period given to newly seeded schedules.
    pub fn default_period(&self) -> u64 {
        self.default_period
    }

    /// Change the period for future schedules. Existing schedules keep theirs.
    pub fn set_default_period(&mut self, period: u64) -> Result<()> {
        if period == 0 {
            return Err(KeysError::InvalidRotationPeriod);
        }
        self.default_period = period;
        Ok(())
    }

    /// Seed the schedule of a freshly stored key.
    pub(crate) fn seed(&mut self, owner: Identity, key_id: KeyId, now: Height) {
        self.schedules.insert(
            RotationKey { owner, key_id },
            RotationSchedule {
                next_rotation: now.plus(self.default_period),
                period: self.default_period,
                auto_rotate: true,
                last_rotated: now,
            },
        );
    }

    /// Advance after a rotation. Returns false if no schedule exists.
    pub(crate) fn advance(&mut self, owner: Identity, key_id: KeyId, now: Height) -> bool {
        match self.schedules.get_mut(&RotationKey { owner, key_id }) {
            Some(schedule) => {
                schedule.next_rotation = now.plus(schedule.period);
                schedule.last_rotated = now;
                true
            }
            None => false,
        }
    }

    /// Get a schedule.
    pub fn get(&self, owner: &Identity, key_id: KeyId) -> Option<&RotationSchedule> {
        self.schedules.get(&RotationKey {
            owner: *owner,
            key_id,
        })
    }

    /// Whether the key is due at `now`. Fails `KeyNotFound` without a schedule.
    pub fn is_due(&self, now: Height, owner: &Identity, key_id: KeyId) -> Result<bool> {
        self.get(owner, key_id)
            .map(|schedule| schedule.is_due(now))
            .ok_or(KeysError::KeyNotFound)
    }

    /// Key ids of `owner` due at `now`, in id order.
    pub fn due_for(&self, owner: &Identity, now: Height) -> Vec<KeyId> {
        self.schedules
            .iter()
            .filter(|(key, schedule)| key.owner == *owner && schedule.is_due(now))
            .map(|(key, _)| key.key_id)
            .collect()
    }
}
