//! Strong type definitions for Journal Guard.
//!
//! All identifiers are newtypes to prevent misuse at compile time. An
//! `EntryId` can never be passed where a `KeyId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte principal: an entry owner, a grantee, or the authority.
///
/// The executor authenticates callers; this layer trusts the value it is given.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity(pub [u8; 32]);

impl Identity {
    /// The null identity. Never a valid grantee or authority.
    pub const NULL: Self = Self([0u8; 32]);

    /// Create a new Identity from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the null identity.
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Identity {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Identity {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Identity {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            /// Get the raw value.
            pub const fn get(self) -> u64 {
                self.0
            }

            /// The id allocated after this one.
            pub const fn next(self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a journal entry, scoped to its owner.
    ///
    /// Unsigned, so the "entry id is non-negative" precondition holds by construction.
    EntryId,
    "EntryId"
);

numeric_id!(
    /// Identifier allocated to each Permission on grant.
    PermissionId,
    "PermissionId"
);

numeric_id!(
    /// Identifier allocated to each stored key record. Stable across rotation.
    KeyId,
    "KeyId"
);

/// The externally supplied clock / block height.
///
/// Monotonically non-decreasing across calls. This layer never advances it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Height(pub u64);

impl Height {
    /// Height zero.
    pub const ZERO: Self = Self(0);

    /// Get the raw value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Advance by `period`, saturating at `u64::MAX`.
    pub const fn plus(self, period: u64) -> Self {
        Self(self.0.saturating_add(period))
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Height {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// The authenticated caller and the height at which the call executes.
///
/// Every mutating operation takes one of these. The executor supplies both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Who is calling.
    pub caller: Identity,
    /// Current clock / block height.
    pub now: Height,
}

impl CallContext {
    /// Create a new call context.
    pub const fn new(caller: Identity, now: Height) -> Self {
        Self { caller, now }
    }

    /// The same caller at a different height.
    pub const fn at(self, now: Height) -> Self {
        Self { now, ..self }
    }
}
