//! Field-sparse entity overlays.
//!
//! An [`EntityOverlay`] shadows one entity field by field. Each declared
//! [`Field`] is either unset (the base value shows through) or carries a
//! [`FieldPatch`]: an operation plus the value it applies. Overlays are
//! kind-agnostic; the entity key is supplied when they are resolved.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{GeoAtlasError, Result};
use crate::model::{Entity, EntityId, EntityKey, EntityKind, Field, FieldOperation, FieldValue};

/// Operation and value set on one field of an overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPatch {
    pub operation: FieldOperation,
    pub value: FieldValue,
}

impl FieldPatch {
    pub fn new(operation: FieldOperation, value: FieldValue) -> Self {
        Self { operation, value }
    }
}

/// State of a single field in an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState<'a> {
    /// Defer to the base entity
    Unset,
    Set {
        operation: FieldOperation,
        value: &'a FieldValue,
    },
}

impl FieldState<'_> {
    pub fn is_set(&self) -> bool {
        matches!(self, FieldState::Set { .. })
    }
}

/// Sparse shadow of one entity.
///
/// Built by value: [`EntityOverlay::with_field`] consumes the overlay and
/// returns the updated one, so an overlay shared through a change set is
/// never modified in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityOverlay {
    fields: BTreeMap<Field, FieldPatch>,
}

impl EntityOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `operation` with `value`, replacing any earlier patch
    /// on the same field.
    ///
    /// Shape and operation legality are checked when the overlay is
    /// resolved ([`merge_onto`](Self::merge_onto) or
    /// [`to_entity`](Self::to_entity)), where the entity kind is known.
    pub fn with_field(mut self, field: Field, operation: FieldOperation, value: FieldValue) -> Self {
        self.fields.insert(field, FieldPatch::new(operation, value));
        self
    }

    pub fn field_state(&self, field: Field) -> FieldState<'_> {
        match self.fields.get(&field) {
            Some(patch) => FieldState::Set {
                operation: patch.operation,
                value: &patch.value,
            },
            None => FieldState::Unset,
        }
    }

    pub fn patch(&self, field: Field) -> Option<&FieldPatch> {
        self.fields.get(&field)
    }

    /// Set fields with their patches, in field order
    pub fn patches(&self) -> impl Iterator<Item = (Field, &FieldPatch)> + '_ {
        self.fields.iter().map(|(field, patch)| (*field, patch))
    }

    /// True when no field is set; such an overlay is a removal marker
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn set_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.keys().copied()
    }

    /// True when every field `kind` requires is set with REPLACE or
    /// OVERWRITE, so the overlay can stand alone as a new entity.
    pub fn is_full_for(&self, kind: EntityKind) -> bool {
        kind.required_fields().iter().all(|field| {
            self.fields
                .get(field)
                .is_some_and(|patch| patch.operation.is_full())
        })
    }

    /// Resolve this overlay against `base`.
    ///
    /// Unset fields copy the base value. ADD unions into the base
    /// collection; for tags, keys already present keep their base value.
    /// REMOVE subtracts (tags by key, references by element). REPLACE and
    /// OVERWRITE take the overlay value verbatim.
    ///
    /// # Errors
    ///
    /// `Validation` when ADD or REMOVE targets the scalar geometry field,
    /// a value has the wrong shape for its field, REPLACE carries an empty
    /// value, or the resulting references are illegal for the base kind.
    pub fn merge_onto(&self, base: &Entity) -> Result<Entity> {
        let key = base.key();
        let [tags, geometry, references] =
            Field::ALL.map(|field| self.resolve_field(key, field, base.field_value(field)));
        Entity::from_values(key, tags?, geometry?, references?)
    }

    /// Materialize a full overlay as a brand-new entity.
    ///
    /// Fields the kind does not require and the overlay leaves unset come
    /// out empty.
    ///
    /// # Errors
    ///
    /// `InvalidEntity` when the overlay does not fully cover the kind's
    /// required fields; otherwise the same errors as
    /// [`merge_onto`](Self::merge_onto).
    pub fn to_entity(&self, kind: EntityKind, id: EntityId) -> Result<Entity> {
        if !self.is_full_for(kind) {
            let missing: Vec<&str> = kind
                .required_fields()
                .iter()
                .filter(|field| !self.patch(**field).is_some_and(|p| p.operation.is_full()))
                .map(|field| field.name())
                .collect();
            return Err(GeoAtlasError::InvalidEntity {
                key: EntityKey::new(kind, id),
                reason: format!(
                    "overlay is not full: missing REPLACE/OVERWRITE for {}",
                    missing.join(", ")
                ),
            });
        }
        self.merge_onto(&Entity::builder(kind, id).build()?)
    }

    /// Full overlay reproducing `entity`: REPLACE for non-empty values,
    /// OVERWRITE for empty ones.
    pub fn from_entity(entity: &Entity) -> Self {
        entity
            .kind()
            .required_fields()
            .iter()
            .fold(Self::new(), |overlay, field| {
                let value = entity.field_value(*field);
                overlay.with_field(*field, value.full_operation(), value)
            })
    }

    fn resolve_field(&self, key: EntityKey, field: Field, base: FieldValue) -> Result<FieldValue> {
        match self.fields.get(&field) {
            Some(patch) => apply_patch(key, field, patch, base),
            None => Ok(base),
        }
    }
}

fn apply_patch(key: EntityKey, field: Field, patch: &FieldPatch, base: FieldValue) -> Result<FieldValue> {
    if patch.value.field() != field {
        return Err(GeoAtlasError::validation(
            key,
            field,
            format!(
                "{} carries a {} value",
                patch.operation,
                patch.value.field()
            ),
        ));
    }

    match patch.operation {
        FieldOperation::Add | FieldOperation::Remove if !field.is_collection() => Err(
            GeoAtlasError::operation_not_supported(key, field, patch.operation),
        ),
        FieldOperation::Add => Ok(match (base, &patch.value) {
            (FieldValue::Tags(mut tags), FieldValue::Tags(added)) => {
                for (k, v) in added {
                    tags.entry(k.clone()).or_insert_with(|| v.clone());
                }
                FieldValue::Tags(tags)
            }
            (FieldValue::References(mut refs), FieldValue::References(added)) => {
                refs.extend(added.iter().copied());
                FieldValue::References(refs)
            }
            (base, _) => base,
        }),
        FieldOperation::Remove => Ok(match (base, &patch.value) {
            (FieldValue::Tags(mut tags), FieldValue::Tags(removed)) => {
                tags.retain(|k, _| !removed.contains_key(k));
                FieldValue::Tags(tags)
            }
            (FieldValue::References(mut refs), FieldValue::References(removed)) => {
                refs.retain(|r| !removed.contains(r));
                FieldValue::References(refs)
            }
            (base, _) => base,
        }),
        FieldOperation::Replace if patch.value.is_empty() => Err(GeoAtlasError::validation(
            key,
            field,
            "REPLACE requires a non-empty value; use OVERWRITE to clear a field",
        )),
        FieldOperation::Replace | FieldOperation::Overwrite => Ok(patch.value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Geometry;
    use std::collections::BTreeSet;

    fn node() -> Entity {
        Entity::builder(EntityKind::Node, 1)
            .tag("name", "A")
            .tag("amenity", "cafe")
            .geometry(Geometry::new(vec![1, 2, 3]))
            .build()
            .unwrap()
    }

    fn tags(pairs: &[(&str, &str)]) -> FieldValue {
        FieldValue::Tags(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_with_field_leaves_original_untouched() {
        let empty = EntityOverlay::new();
        let set = empty
            .clone()
            .with_field(Field::Tags, FieldOperation::Replace, tags(&[("a", "b")]));
        assert!(empty.is_empty());
        assert!(set.field_state(Field::Tags).is_set());
        assert_eq!(set.field_state(Field::Geometry), FieldState::Unset);
    }

    #[test]
    fn test_unset_overlay_is_identity() {
        let base = node();
        assert_eq!(EntityOverlay::new().merge_onto(&base).unwrap(), base);
    }

    #[test]
    fn test_tag_add_keeps_base_value_for_existing_keys() {
        let merged = EntityOverlay::new()
            .with_field(
                Field::Tags,
                FieldOperation::Add,
                tags(&[("name", "Z"), ("cuisine", "tea")]),
            )
            .merge_onto(&node())
            .unwrap();
        assert_eq!(merged.tag("name"), Some("A"));
        assert_eq!(merged.tag("cuisine"), Some("tea"));
        assert_eq!(merged.tags().len(), 3);
    }

    #[test]
    fn test_tag_remove_by_key() {
        let merged = EntityOverlay::new()
            .with_field(Field::Tags, FieldOperation::Remove, tags(&[("amenity", "")]))
            .merge_onto(&node())
            .unwrap();
        assert_eq!(merged.tag("amenity"), None);
        assert_eq!(merged.tag("name"), Some("A"));
    }

    #[test]
    fn test_add_on_geometry_is_rejected() {
        let err = EntityOverlay::new()
            .with_field(Field::Geometry, FieldOperation::Add, FieldValue::Geometry(None))
            .merge_onto(&node())
            .unwrap_err();
        assert!(matches!(
            err,
            GeoAtlasError::Validation {
                field: Field::Geometry,
                ..
            }
        ));
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let result = EntityOverlay::new()
            .with_field(Field::Tags, FieldOperation::Overwrite, FieldValue::Geometry(None))
            .merge_onto(&node());
        assert!(result.is_err());
    }

    #[test]
    fn test_replace_with_empty_is_rejected_overwrite_is_not() {
        let base = node();
        let replace = EntityOverlay::new().with_field(
            Field::Geometry,
            FieldOperation::Replace,
            FieldValue::Geometry(None),
        );
        assert!(replace.merge_onto(&base).is_err());

        let overwrite = EntityOverlay::new().with_field(
            Field::Geometry,
            FieldOperation::Overwrite,
            FieldValue::Geometry(None),
        );
        assert_eq!(overwrite.merge_onto(&base).unwrap().geometry(), None);
    }

    #[test]
    fn test_reference_add_and_remove() {
        let edge = Entity::builder(EntityKind::Edge, 4)
            .reference(EntityKind::Node, 1)
            .reference(EntityKind::Node, 2)
            .build()
            .unwrap();
        let merged = EntityOverlay::new()
            .with_field(
                Field::References,
                FieldOperation::Remove,
                FieldValue::References(BTreeSet::from([EntityKey::new(EntityKind::Node, 1)])),
            )
            .merge_onto(&edge)
            .unwrap();
        assert_eq!(
            merged.references().iter().copied().collect::<Vec<_>>(),
            vec![EntityKey::new(EntityKind::Node, 2)]
        );
    }

    #[test]
    fn test_from_entity_round_trips_through_to_entity() {
        let base = node();
        let overlay = EntityOverlay::from_entity(&base);
        assert!(overlay.is_full_for(EntityKind::Node));
        assert_eq!(overlay.to_entity(EntityKind::Node, 1).unwrap(), base);
    }

    #[test]
    fn test_from_entity_uses_overwrite_for_empty_values() {
        let bare = Entity::builder(EntityKind::Point, 2).build().unwrap();
        let overlay = EntityOverlay::from_entity(&bare);
        assert!(matches!(
            overlay.field_state(Field::Geometry),
            FieldState::Set {
                operation: FieldOperation::Overwrite,
                ..
            }
        ));
    }

    #[test]
    fn test_to_entity_requires_full_overlay() {
        let partial =
            EntityOverlay::new().with_field(Field::Tags, FieldOperation::Replace, tags(&[("a", "b")]));
        assert!(!partial.is_full_for(EntityKind::Node));
        assert!(matches!(
            partial.to_entity(EntityKind::Node, 3),
            Err(GeoAtlasError::InvalidEntity { .. })
        ));
    }

    #[test]
    fn test_edge_needs_references_to_be_full() {
        let overlay = EntityOverlay::new()
            .with_field(Field::Tags, FieldOperation::Overwrite, tags(&[]))
            .with_field(Field::Geometry, FieldOperation::Overwrite, FieldValue::Geometry(None));
        assert!(overlay.is_full_for(EntityKind::Node));
        assert!(!overlay.is_full_for(EntityKind::Edge));
    }

    #[test]
    fn test_serializes_as_field_map() {
        let overlay =
            EntityOverlay::new().with_field(Field::Tags, FieldOperation::Replace, tags(&[("a", "b")]));
        let json = serde_json::to_value(&overlay).unwrap();
        assert_eq!(json["tags"]["operation"], "replace");
        let back: EntityOverlay = serde_json::from_value(json).unwrap();
        assert_eq!(back, overlay);
    }
}
