//! Immutable snapshots.
//!
//! This module provides the frozen entity collection every other component
//! reads from, its builder and its content digest.
//!
//! ## Responsibilities
//!
//! - Store entities keyed by `(kind, id)` with deterministic ordering
//! - Enforce identifier uniqueness at ingestion
//! - Define the [`EntitySource`] read contract (also implemented by
//!   [`ChangeView`](crate::view::ChangeView))
//! - Compute content digests
//!
//! ## Non-Responsibilities
//!
//! - Parsing raw map extracts (handled by ingestion tooling)
//! - Applying edits (handled by [`crate::view`])

pub mod builder;
pub mod digest;
pub mod metadata;
pub mod source;
pub mod store;

// Re-export primary types
pub use builder::SnapshotBuilder;
pub use digest::compute_snapshot_digest;
pub use metadata::SnapshotMetadata;
pub use source::EntitySource;
pub use store::{Snapshot, SnapshotRecord};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GeoAtlasError;
    use crate::model::{Entity, EntityKey, EntityKind};
    use crate::rules::validation::ReferencePolicy;

    fn node(id: i64) -> Entity {
        Entity::builder(EntityKind::Node, id).build().unwrap()
    }

    #[test]
    fn test_add_rejects_duplicate_identifier() {
        let mut builder = SnapshotBuilder::new("test");
        builder.add(node(1)).unwrap();
        let err = builder.add(node(1)).unwrap_err();
        assert_eq!(
            err,
            GeoAtlasError::DuplicateIdentifier {
                key: EntityKey::new(EntityKind::Node, 1)
            }
        );
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_same_id_in_different_kinds_is_allowed() {
        let mut builder = SnapshotBuilder::new("test");
        builder.add(node(1)).unwrap();
        builder
            .add(Entity::builder(EntityKind::Point, 1).build().unwrap())
            .unwrap();
        assert_eq!(builder.build().unwrap().len(), 2);
    }

    #[test]
    fn test_identifiers_are_ascending_and_restartable() {
        let mut builder = SnapshotBuilder::new("test");
        builder
            .extend([node(5), node(i64::MIN), node(-3), node(i64::MAX)])
            .unwrap();
        let snapshot = builder.build().unwrap();

        let first: Vec<i64> = snapshot.identifiers(EntityKind::Node).collect();
        let second: Vec<i64> = snapshot.identifiers(EntityKind::Node).collect();
        assert_eq!(first, vec![i64::MIN, -3, 5, i64::MAX]);
        assert_eq!(first, second);
        assert_eq!(snapshot.identifiers(EntityKind::Edge).count(), 0);
    }

    #[test]
    fn test_strict_build_rejects_dangling_reference() {
        let mut builder = SnapshotBuilder::new("test");
        builder
            .add(
                Entity::builder(EntityKind::Edge, 1)
                    .reference(EntityKind::Node, 99)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        assert!(matches!(
            builder.clone().build(),
            Err(GeoAtlasError::DanglingReference { .. })
        ));
        assert!(builder
            .reference_policy(ReferencePolicy::TolerateDangling)
            .build()
            .is_ok());
    }

    #[test]
    fn test_metadata_sizes_per_kind() {
        let mut builder = SnapshotBuilder::new("planet").shard("region-42");
        builder.extend([node(1), node(2)]).unwrap();
        let snapshot = builder.build().unwrap();
        let meta = snapshot.metadata();
        assert_eq!(meta.size(EntityKind::Node), 2);
        assert_eq!(meta.size(EntityKind::Edge), 0);
        assert_eq!(meta.shard.as_deref(), Some("region-42"));
    }

    #[test]
    fn test_serde_round_trip_and_duplicate_rejection() {
        let mut builder = SnapshotBuilder::new("test");
        builder.extend([node(1), node(2)]).unwrap();
        let snapshot = builder.build().unwrap();

        let json = serde_json::to_value(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, snapshot);

        let mut dup = json;
        let first = dup["entities"][0].clone();
        dup["entities"].as_array_mut().unwrap().push(first);
        assert!(serde_json::from_value::<Snapshot>(dup).is_err());
    }

    #[test]
    fn test_digest_ignores_build_time() {
        let build = |at: &str| {
            let mut builder = SnapshotBuilder::new("test").built_at(at.parse().unwrap());
            builder.add(node(1)).unwrap();
            builder.build().unwrap()
        };
        let a = build("2024-01-01T00:00:00Z");
        let b = build("2025-06-01T12:00:00Z");
        assert_ne!(a, b);
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
    }
}
