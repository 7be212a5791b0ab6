//! Digest computation for snapshots and change sets.
//!
//! Digests are SHA256 over canonical JSON (serde_json output of types whose
//! collections are all ordered), hex-encoded.
//!
//! ## Determinism Guarantees
//!
//! - Same content → same digest
//! - Snapshot digests ignore `built_at`, so rebuilding identical data at a
//!   different time yields the same digest
//! - Change set digests are order-sensitive (insertion order is part of the
//!   audit trail)

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::store::Snapshot;
use crate::errors::Result;
use crate::model::Entity;

#[derive(Serialize)]
struct SnapshotDigestInput<'a> {
    origin: &'a str,
    shard: Option<&'a str>,
    properties: &'a BTreeMap<String, String>,
    entities: Vec<&'a Entity>,
}

/// Compute the content digest of a snapshot (excludes `built_at`).
///
/// ## Returns
///
/// Hex-encoded SHA256 digest (64 characters)
///
/// ## Errors
///
/// Returns `GeoAtlasError::Serialization` if JSON serialization fails.
pub fn compute_snapshot_digest(snapshot: &Snapshot) -> Result<String> {
    let metadata = snapshot.metadata();
    let input = SnapshotDigestInput {
        origin: &metadata.origin,
        shard: metadata.shard.as_deref(),
        properties: &metadata.properties,
        entities: snapshot.iter().collect(),
    };
    hash_canonical(&input)
}

/// Hash the canonical JSON encoding of `value`.
pub(crate) fn hash_canonical<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let canonical = serde_json::to_string(value)?;
    Ok(hash_string(&canonical))
}

fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_string_deterministic() {
        let hash1 = hash_string("test");
        let hash2 = hash_string("test");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_hash_canonical_distinguishes_order() {
        let a = hash_canonical(&["x", "y"]).unwrap();
        let b = hash_canonical(&["y", "x"]).unwrap();
        assert_ne!(a, b);
    }
}
