#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{edge, node, snapshot};
use geoatlas_core::errors::GeoAtlasError;
use geoatlas_core::rules::{find_dangling_references, validate_references, DanglingReference};
use geoatlas_core::{
    ChangeSet, ChangeView, Entity, EntityKey, EntityKind, FeatureChange, ReferencePolicy,
    SnapshotBuilder,
};
use std::sync::Arc;

fn key(kind: EntityKind, id: i64) -> EntityKey {
    EntityKey::new(kind, id)
}

// ===== SNAPSHOT BUILD =====

#[test]
fn test_strict_build_accepts_closed_graph() {
    let mut builder = SnapshotBuilder::new("extract");
    builder
        .extend([node(1, &[]), node(2, &[]), edge(10, &[1, 2])])
        .unwrap();
    let snap = builder.build().unwrap();
    assert_eq!(snap.len(), 3);
}

#[test]
fn test_strict_build_rejects_dangling_edge() {
    let mut builder = SnapshotBuilder::new("extract");
    builder.extend([node(1, &[]), edge(10, &[1, 2])]).unwrap();
    let err = builder.build().unwrap_err();
    assert_eq!(
        err,
        GeoAtlasError::DanglingReference {
            source_key: key(EntityKind::Edge, 10),
            target: key(EntityKind::Node, 2),
        }
    );
}

#[test]
fn test_tolerant_build_keeps_dangling_edge() {
    let snap = snapshot([edge(10, &[1, 2])]);
    assert!(snap.contains(key(EntityKind::Edge, 10)));
}

#[test]
fn test_duplicate_identifier_rejected_on_add() {
    let mut builder = SnapshotBuilder::new("extract");
    builder.add(node(1, &[("a", "1")])).unwrap();
    let err = builder.add(node(1, &[("a", "2")])).unwrap_err();
    assert_eq!(
        err,
        GeoAtlasError::DuplicateIdentifier {
            key: key(EntityKind::Node, 1)
        }
    );
    assert_eq!(builder.len(), 1);
}

#[test]
fn test_same_id_in_different_kinds_is_not_a_duplicate() {
    let mut builder = SnapshotBuilder::new("extract");
    builder.add(node(1, &[])).unwrap();
    builder.add(edge(1, &[1])).unwrap();
    assert_eq!(builder.build().unwrap().len(), 2);
}

// ===== FIND / VALIDATE =====

#[test]
fn test_find_reports_every_dangling_reference_in_order() {
    let relation = Entity::builder(EntityKind::Relation, 3)
        .reference(EntityKind::Area, 9)
        .reference(EntityKind::Node, 1)
        .build()
        .unwrap();
    let snap = snapshot([node(1, &[]), edge(10, &[1, 5]), relation]);

    let found = find_dangling_references(&snap).unwrap();
    assert_eq!(
        found,
        vec![
            DanglingReference {
                source_key: key(EntityKind::Edge, 10),
                target: key(EntityKind::Node, 5),
            },
            DanglingReference {
                source_key: key(EntityKind::Relation, 3),
                target: key(EntityKind::Area, 9),
            },
        ]
    );
    assert!(validate_references(&snap, ReferencePolicy::TolerateDangling).is_ok());
    assert!(validate_references(&snap, ReferencePolicy::Strict).is_err());
}

#[test]
fn test_validate_sees_through_change_view() {
    // GIVEN a closed base graph
    let base = Arc::new(snapshot([node(1, &[]), node(2, &[]), edge(10, &[1, 2])]));
    assert!(validate_references(base.as_ref(), ReferencePolicy::Strict).is_ok());

    // WHEN a change removes a referenced node
    let mut changes = ChangeSet::new();
    changes.add(FeatureChange::remove(EntityKind::Node, 2)).unwrap();
    let view = ChangeView::new(base, Arc::new(changes));

    // THEN the view reports the edge as dangling
    let err = validate_references(&view, ReferencePolicy::Strict).unwrap_err();
    assert_eq!(
        err,
        GeoAtlasError::DanglingReference {
            source_key: key(EntityKind::Edge, 10),
            target: key(EntityKind::Node, 2),
        }
    );
}
