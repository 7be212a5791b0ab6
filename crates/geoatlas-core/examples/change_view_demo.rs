//! Change View Demonstration
//!
//! Walks one edit cycle against a tiny snapshot.
//!
//! Key concepts illustrated:
//! 1. Building an immutable snapshot
//! 2. Composing a change set from field overlays
//! 3. Reading through a lazy change view
//! 4. Diffing back to a change set and rendering it for review
//! 5. Region-sharded identifiers

#![allow(clippy::unwrap_used, clippy::expect_used)]

use geoatlas_core::config::GeoAtlasConfig;
use geoatlas_core::identifier::{decode, encode};
use geoatlas_core::logging_facility;
use geoatlas_core::{
    compute_diff, render_human_summary, ChangeSet, ChangeView, Entity, EntityKind, EntityOverlay,
    FeatureChange, Field, FieldOperation, FieldValue, ReferencePolicy, SnapshotBuilder,
};
use std::collections::BTreeMap;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== GeoAtlas Change View Demo ===\n");

    let config = GeoAtlasConfig::from_toml_str(
        "[logging]\nprofile = \"development\"\n\n[snapshot]\nreference_policy = \"strict\"\n",
    )?;
    logging_facility::init_from_config(&config.logging);

    // ===== Part 1: Snapshot =====
    println!("## Part 1: Snapshot\n");

    let region = 42;
    let cafe = encode(region, 1001)?;
    let corner = encode(region, 1002)?;
    let street = encode(region, 2001)?;

    let mut builder =
        SnapshotBuilder::from_config("demo-extract", &config.snapshot).shard("region-42");
    builder.add(
        Entity::builder(EntityKind::Node, cafe)
            .tag("amenity", "cafe")
            .tag("name", "Corner Beans")
            .build()?,
    )?;
    builder.add(Entity::builder(EntityKind::Node, corner).build()?)?;
    builder.add(
        Entity::builder(EntityKind::Edge, street)
            .tag("highway", "residential")
            .reference(EntityKind::Node, cafe)
            .reference(EntityKind::Node, corner)
            .build()?,
    )?;
    let base = Arc::new(builder.build()?);
    println!(
        "✓ Built snapshot with {} entities (digest {})",
        base.len(),
        &base.digest()?[..12]
    );
    println!("  cafe id {} decodes to {:?}\n", cafe, decode(cafe));

    // ===== Part 2: Change set =====
    println!("## Part 2: Change Set\n");

    let mut changes = ChangeSet::new();
    let cuisine = BTreeMap::from([("cuisine".to_string(), "coffee_shop".to_string())]);
    changes.add(FeatureChange::update(
        EntityKind::Node,
        cafe,
        EntityOverlay::new().with_field(Field::Tags, FieldOperation::Add, FieldValue::Tags(cuisine)),
    )?)?;
    let opening = BTreeMap::from([("opening_hours".to_string(), "Mo-Fr 07:00-15:00".to_string())]);
    changes.add_or_merge(FeatureChange::update(
        EntityKind::Node,
        cafe,
        EntityOverlay::new().with_field(Field::Tags, FieldOperation::Add, FieldValue::Tags(opening)),
    )?)?;
    changes.add(FeatureChange::remove(EntityKind::Edge, street))?;

    if let Err(e) = changes.add(FeatureChange::remove(EntityKind::Edge, street)) {
        println!("✓ Second removal rejected: {}", e);
    }
    println!("Change set holds {} changes\n", changes.len());

    // ===== Part 3: View =====
    println!("## Part 3: View\n");

    let view = ChangeView::new(Arc::clone(&base), Arc::new(changes));
    view.validate()?;
    let seen = view.entity(EntityKind::Node, cafe)?.expect("cafe survives");
    println!("✓ Cafe through view: {:?}", seen.tags());
    println!(
        "✓ Edges through view: {}",
        view.identifiers(EntityKind::Edge).count()
    );
    println!(
        "✓ Base still has cuisine {:?}\n",
        base.entity(EntityKind::Node, cafe).and_then(|e| e.tag("cuisine"))
    );

    // ===== Part 4: Diff =====
    println!("## Part 4: Diff\n");

    let target = view.materialize(ReferencePolicy::Strict)?;
    let diff = compute_diff(base.as_ref(), &target)?;
    println!("{}", render_human_summary(&diff));

    println!("=== Demo Complete ===");
    Ok(())
}
