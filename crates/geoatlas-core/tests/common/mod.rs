#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use geoatlas_core::{
    Entity, EntityId, EntityKind, Geometry, ReferencePolicy, Snapshot, SnapshotBuilder,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Node with the given tags and no geometry
pub fn node(id: EntityId, tags: &[(&str, &str)]) -> Entity {
    let mut builder = Entity::builder(EntityKind::Node, id);
    for (k, v) in tags {
        builder = builder.tag(*k, *v);
    }
    builder.build().unwrap()
}

/// Edge connecting the given nodes
pub fn edge(id: EntityId, nodes: &[EntityId]) -> Entity {
    nodes
        .iter()
        .fold(Entity::builder(EntityKind::Edge, id), |b, n| {
            b.reference(EntityKind::Node, *n)
        })
        .build()
        .unwrap()
}

/// Build a snapshot that tolerates dangling references
pub fn snapshot(entities: impl IntoIterator<Item = Entity>) -> Snapshot {
    let mut builder = SnapshotBuilder::new("test")
        .reference_policy(ReferencePolicy::TolerateDangling)
        .built_at("2026-01-01T00:00:00Z".parse().unwrap());
    builder.extend(entities).unwrap();
    builder.build().unwrap()
}

// ---------------------------------------------------------------------------
// Proptest strategies
// ---------------------------------------------------------------------------

fn arb_tags() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-c]", "[x-z]{0,2}", 0..3)
}

fn arb_geometry() -> impl Strategy<Value = Option<Geometry>> {
    prop::option::of(prop::collection::vec(any::<u8>(), 1..4).prop_map(Geometry::new))
}

/// Arbitrary entity of `kind` with an id drawn from a small range, so that
/// generated snapshot pairs share keys
pub fn arb_entity_of(kind: EntityKind) -> impl Strategy<Value = Entity> {
    (
        -4i64..4,
        arb_tags(),
        arb_geometry(),
        prop::collection::btree_set(-4i64..4, 0..3),
    )
        .prop_map(move |(id, tags, geometry, refs)| {
            let mut builder = Entity::builder(kind, id).tags(tags);
            if let Some(geometry) = geometry {
                builder = builder.geometry(geometry);
            }
            if kind.carries_references() {
                for r in refs {
                    builder = builder.reference(EntityKind::Node, r);
                }
            }
            builder.build().unwrap()
        })
}

pub fn arb_kind() -> impl Strategy<Value = EntityKind> {
    prop::sample::select(EntityKind::ALL.to_vec())
}

pub fn arb_entity() -> impl Strategy<Value = Entity> {
    arb_kind().prop_flat_map(arb_entity_of)
}

/// Arbitrary snapshot; later duplicates of a key are dropped
pub fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
    prop::collection::vec(arb_entity(), 0..16).prop_map(|entities| {
        let mut unique = BTreeMap::new();
        for entity in entities {
            unique.entry(entity.key()).or_insert(entity);
        }
        snapshot(unique.into_values())
    })
}
