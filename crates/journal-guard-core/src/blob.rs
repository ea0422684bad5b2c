//! Fixed-length byte blobs.
//!
//! Each ledger byte field gets its own newtype so a 12-byte IV can never be
//! stored where a 16-byte auth tag belongs. Construction validates the exact
//! length; deserialization goes through the same check.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::Blake3Hash;
use crate::error::CoreError;
use crate::validation::exact_len;

macro_rules! fixed_blob {
    ($(#[$meta:meta])* $name:ident, $field:literal, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "Bytes", into = "Bytes")]
        pub struct $name(Bytes);

        impl $name {
            /// Required length in bytes.
            pub const LEN: usize = $len;

            /// Field name used in error messages.
            pub const FIELD: &'static str = $field;

            /// Validate and wrap `bytes`.
            pub fn new(bytes: impl Into<Bytes>) -> Result<Self, CoreError> {
                let bytes = bytes.into();
                exact_len($field, &bytes, $len)?;
                Ok(Self(bytes))
            }

            /// Get the raw bytes.
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Convert to hex string.
            pub fn to_hex(&self) -> String {
                hex::encode(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({}...)"), &self.to_hex()[..16])
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = CoreError;

            fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
                Self::new(Bytes::copy_from_slice(slice))
            }
        }

        impl TryFrom<Bytes> for $name {
            type Error = CoreError;

            fn try_from(bytes: Bytes) -> Result<Self, Self::Error> {
                Self::new(bytes)
            }
        }

        impl From<$name> for Bytes {
            fn from(blob: $name) -> Self {
                blob.0
            }
        }
    };
}

fixed_blob!(
    /// Hash of a grantee's professional license. 32 bytes.
    LicenseHash,
    "license hash",
    32
);

fixed_blob!(
    /// A user's long-lived raw public key. 64 bytes.
    RawPublicKey,
    "public key",
    64
);

fixed_blob!(
    /// Wrapped entry key ciphertext (also used for backup keys). 128 bytes.
    EncryptedKey,
    "encrypted key",
    128
);

fixed_blob!(
    /// AEAD nonce. 12 bytes.
    Iv,
    "iv",
    12
);

fixed_blob!(
    /// AEAD authentication tag. 16 bytes.
    AuthTag,
    "auth tag",
    16
);

impl LicenseHash {
    /// Hash a license document with Blake3.
    pub fn digest(document: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(Blake3Hash::hash(document).as_bytes()))
    }
}
