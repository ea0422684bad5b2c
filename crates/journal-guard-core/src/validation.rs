//! Shared input validation.
//!
//! Ledger byte fields are bit-exact. These helpers are the single place the
//! length and positivity rules are enforced, so every registry reports the
//! same failure for the same malformed input.

use crate::error::CoreError;

/// Check that `bytes` is exactly `expected` bytes long.
pub fn exact_len(field: &'static str, bytes: &[u8], expected: usize) -> Result<(), CoreError> {
    if bytes.len() != expected {
        return Err(CoreError::InvalidLength {
            field,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Check that a configuration value is strictly positive.
pub fn require_positive(field: &'static str, value: u64) -> Result<u64, CoreError> {
    if value == 0 {
        return Err(CoreError::NotPositive(field));
    }
    Ok(value)
}
