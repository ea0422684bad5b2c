//! Snapshot codec.
//!
//! State is encoded as CBOR and checksummed with Blake3. A snapshot whose
//! checksum does not match, or that does not decode, is rejected as corrupted.

use journal_guard_core::{CoreError, Height};
use journal_guard_store::SnapshotRecord;

use crate::error::{GuardError, Result};
use crate::guard::GuardState;

/// Encode `state` as taken at `height`.
pub fn encode(height: Height, state: &GuardState) -> Result<SnapshotRecord> {
    let mut buf = Vec::new();
    ciborium::into_writer(state, &mut buf).map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(SnapshotRecord::new(height, buf))
}

/// Verify and decode a snapshot.
pub fn decode(record: &SnapshotRecord) -> Result<GuardState> {
    let corrupted = |reason: String| {
        tracing::warn!(height = record.height.get(), %reason, "rejecting snapshot");
        GuardError::SnapshotCorrupted {
            height: record.height.get(),
            reason,
        }
    };

    if !record.verify() {
        return Err(corrupted(format!(
            "checksum mismatch, expected {}",
            record.checksum.to_hex()
        )));
    }
    ciborium::from_reader(&record.bytes[..]).map_err(|e| corrupted(e.to_string()))
}
