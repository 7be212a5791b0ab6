//! Entity model: the six feature kinds, their identity, and their attribute shape.
//!
//! Entities expose read accessors only. Every change to an entity is
//! expressed as an [`EntityOverlay`](crate::overlay::EntityOverlay) and
//! resolved through a change view or a merge.

pub mod entity;
pub mod field;
pub mod kind;

pub use entity::{Entity, EntityBuilder, Geometry, Tags};
pub use field::{Field, FieldOperation, FieldValue};
pub use kind::{EntityId, EntityKey, EntityKind};
