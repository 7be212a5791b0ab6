//! Snapshot storage: ordering, metadata, digests and the JSON record.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{arb_snapshot, edge, node, snapshot};
use geoatlas_core::errors::GeoAtlasError;
use geoatlas_core::snapshot::compute_snapshot_digest;
use geoatlas_core::{EntityKey, EntityKind, EntitySource, ReferencePolicy, Snapshot, SnapshotBuilder};
use proptest::prelude::*;

#[test]
fn test_identifiers_ascend_across_sign() {
    let snap = snapshot([node(5, &[]), node(i64::MIN, &[]), node(-2, &[]), node(i64::MAX, &[])]);
    assert_eq!(
        snap.identifiers(EntityKind::Node).collect::<Vec<_>>(),
        vec![i64::MIN, -2, 5, i64::MAX]
    );
    assert_eq!(snap.identifiers(EntityKind::Edge).count(), 0);
}

#[test]
fn test_metadata_sizes_and_properties() {
    let mut builder = SnapshotBuilder::new("planet-2026-10")
        .shard("region-0042")
        .property("license", "ODbL")
        .reference_policy(ReferencePolicy::TolerateDangling);
    builder
        .extend([node(1, &[]), node(2, &[]), edge(3, &[1, 2])])
        .unwrap();
    let snap = builder.build().unwrap();

    let metadata = snap.metadata();
    assert_eq!(metadata.origin, "planet-2026-10");
    assert_eq!(metadata.shard.as_deref(), Some("region-0042"));
    assert_eq!(metadata.size(EntityKind::Node), 2);
    assert_eq!(metadata.size(EntityKind::Edge), 1);
    assert_eq!(metadata.total_size(), 3);
    assert_eq!(metadata.properties.get("license").map(String::as_str), Some("ODbL"));
}

#[test]
fn test_trait_and_inherent_reads_agree() {
    let snap = snapshot([node(1, &[("a", "b")])]);
    let source: &dyn EntitySource = &snap;
    assert_eq!(
        source.entity(EntityKind::Node, 1).unwrap().as_deref(),
        snap.entity(EntityKind::Node, 1)
    );
    assert!(source.entity(EntityKind::Node, 2).unwrap().is_none());
    assert_eq!(&source.metadata(), snap.metadata());
}

#[test]
fn test_digest_ignores_build_time() {
    let build = |at: &str| {
        let mut builder = SnapshotBuilder::new("extract").built_at(at.parse().unwrap());
        builder.add(node(1, &[("name", "A")])).unwrap();
        builder.build().unwrap()
    };
    let first = build("2026-01-01T00:00:00Z");
    let second = build("2026-06-30T12:00:00Z");

    assert_ne!(first, second);
    assert_eq!(first.digest().unwrap(), second.digest().unwrap());
    assert_eq!(first.digest().unwrap().len(), 64);
}

#[test]
fn test_digest_tracks_content() {
    let a = snapshot([node(1, &[("name", "A")])]);
    let b = snapshot([node(1, &[("name", "B")])]);
    assert_ne!(
        compute_snapshot_digest(&a).unwrap(),
        compute_snapshot_digest(&b).unwrap()
    );
}

#[test]
fn test_record_rejects_duplicate_identifier() {
    let snap = snapshot([node(1, &[])]);
    let mut json = serde_json::to_value(&snap).unwrap();
    let entity = json["entities"][0].clone();
    json["entities"].as_array_mut().unwrap().push(entity);

    let err = serde_json::from_value::<Snapshot>(json).unwrap_err();
    assert!(err.to_string().contains("Duplicate identifier"));
}

#[test]
fn test_record_recomputes_sizes() {
    let snap = snapshot([node(1, &[]), node(2, &[])]);
    let mut json = serde_json::to_value(&snap).unwrap();
    json["metadata"]["sizes"] = serde_json::json!({ "node": 99, "area": 4 });

    let back: Snapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back.metadata().size(EntityKind::Node), 2);
    assert_eq!(back.metadata().size(EntityKind::Area), 0);
    assert_eq!(back, snap);
}

#[test]
fn test_builder_duplicate_leaves_builder_unchanged() {
    let mut builder = SnapshotBuilder::new("extract");
    let err = builder
        .extend([node(1, &[]), node(2, &[]), node(1, &[("x", "y")])])
        .unwrap_err();
    assert_eq!(
        err,
        GeoAtlasError::DuplicateIdentifier {
            key: EntityKey::new(EntityKind::Node, 1)
        }
    );
    assert_eq!(builder.len(), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_json_record_preserves_snapshot(snap in arb_snapshot()) {
        let json = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.digest().unwrap(), snap.digest().unwrap());
        prop_assert_eq!(back, snap);
    }
}
