//! GeoAtlas Core - versioned geospatial graph engine
//!
//! This crate provides the foundational data structures and operations for
//! GeoAtlas, including:
//! - The entity model (nodes, edges, areas, lines, points, relations)
//! - A reversible identifier codec for region-sharded datasets
//! - Immutable snapshots and the `EntitySource` read contract
//! - Field-sparse entity overlays
//! - Feature changes and change sets
//! - Lazily merged change views
//! - A deterministic, interruptible snapshot diff
//! - Reference-integrity rules

pub mod change;
pub mod config;
pub mod diff;
pub mod errors;
pub mod identifier;
pub mod logging_facility;
pub mod model;
pub mod overlay;
pub mod rules;
pub mod snapshot;
pub mod view;

// Re-export commonly used types
pub use change::{ChangeAction, ChangeSet, ChangeSummary, FeatureChange};
pub use config::GeoAtlasConfig;
pub use diff::{compute_diff, compute_diff_with, render_human_summary, DiffOptions, Interrupt};
pub use errors::{GaError, GaErrorKind, GeoAtlasError, Result};
pub use identifier::ShardedIdentifier;
pub use model::{
    Entity, EntityBuilder, EntityId, EntityKey, EntityKind, Field, FieldOperation, FieldValue,
    Geometry, Tags,
};
pub use overlay::{EntityOverlay, FieldPatch, FieldState};
pub use rules::ReferencePolicy;
pub use snapshot::{EntitySource, Snapshot, SnapshotBuilder, SnapshotMetadata};
pub use view::ChangeView;
