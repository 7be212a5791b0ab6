use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{GeoAtlasError, Result};
use crate::model::{Entity, EntityId, EntityKey, EntityKind, FieldOperation, FieldValue};
use crate::overlay::{EntityOverlay, FieldPatch};

/// Top-level action of a feature change
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    /// Brand-new entity; the overlay is full
    Add,
    /// Entity disappears; the overlay is empty
    Remove,
    /// Overlay fields are merged onto an existing base entity
    Update,
}

impl ChangeAction {
    pub const ALL: [ChangeAction; 3] = [ChangeAction::Add, ChangeAction::Remove, ChangeAction::Update];

    pub fn name(&self) -> &'static str {
        match self {
            ChangeAction::Add => "ADD",
            ChangeAction::Remove => "REMOVE",
            ChangeAction::Update => "UPDATE",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entity's complete mutation record: an overlay bound to a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FeatureChangeRecord", into = "FeatureChangeRecord")]
pub struct FeatureChange {
    key: EntityKey,
    action: ChangeAction,
    overlay: EntityOverlay,
}

impl FeatureChange {
    /// Bind `overlay` to `(kind, id)`, deriving the action: REMOVE for an
    /// empty overlay, ADD for a full one, UPDATE otherwise.
    pub fn new(kind: EntityKind, id: EntityId, overlay: EntityOverlay) -> Self {
        let action = if overlay.is_empty() {
            ChangeAction::Remove
        } else if overlay.is_full_for(kind) {
            ChangeAction::Add
        } else {
            ChangeAction::Update
        };
        Self {
            key: EntityKey::new(kind, id),
            action,
            overlay,
        }
    }

    /// Removal marker carrying only the key
    pub fn remove(kind: EntityKind, id: EntityId) -> Self {
        Self {
            key: EntityKey::new(kind, id),
            action: ChangeAction::Remove,
            overlay: EntityOverlay::new(),
        }
    }

    /// UPDATE against an implied base entity, even when the overlay is full.
    ///
    /// # Errors
    ///
    /// `InvalidEntity` when the overlay sets no field.
    pub fn update(kind: EntityKind, id: EntityId, overlay: EntityOverlay) -> Result<Self> {
        let key = EntityKey::new(kind, id);
        if overlay.is_empty() {
            return Err(GeoAtlasError::InvalidEntity {
                key,
                reason: "update carries no field content".to_string(),
            });
        }
        Ok(Self {
            key,
            action: ChangeAction::Update,
            overlay,
        })
    }

    pub fn key(&self) -> EntityKey {
        self.key
    }

    pub fn kind(&self) -> EntityKind {
        self.key.kind
    }

    pub fn id(&self) -> EntityId {
        self.key.id
    }

    pub fn action(&self) -> ChangeAction {
        self.action
    }

    pub fn overlay(&self) -> &EntityOverlay {
        &self.overlay
    }

    /// Resolve this change against the base entity for the same key.
    ///
    /// ADD materializes the overlay, REMOVE yields `None`, UPDATE merges
    /// the overlay onto `base`.
    ///
    /// # Errors
    ///
    /// `MissingBase` for an UPDATE without a base entity; overlay
    /// validation errors otherwise.
    pub fn apply_to(&self, base: Option<&Entity>) -> Result<Option<Entity>> {
        match self.action {
            ChangeAction::Add => self.overlay.to_entity(self.key.kind, self.key.id).map(Some),
            ChangeAction::Remove => Ok(None),
            ChangeAction::Update => {
                let base = base.ok_or(GeoAtlasError::MissingBase { key: self.key })?;
                self.overlay.merge_onto(base).map(Some)
            }
        }
    }

    /// Pre-merge two changes for the same key into one.
    ///
    /// Fields set by one side only are kept. Equal patches collapse.
    /// ADD+ADD and REMOVE+REMOVE on the same collection field union their
    /// values. Two REMOVE markers collapse into one. The result is an ADD
    /// when either side is.
    ///
    /// # Errors
    ///
    /// `MergeConflict` when the keys differ, when a REMOVE marker meets a
    /// change with content, or when both sides set the same field in any
    /// other way.
    pub fn merge(&self, other: &FeatureChange) -> Result<FeatureChange> {
        let conflict = |field: &str, left: String, right: String| GeoAtlasError::MergeConflict {
            key: self.key,
            field: field.to_string(),
            left,
            right,
        };

        if self.key != other.key {
            return Err(conflict("key", self.key.to_string(), other.key.to_string()));
        }
        match (self.action, other.action) {
            (ChangeAction::Remove, ChangeAction::Remove) => return Ok(self.clone()),
            (ChangeAction::Remove, _) | (_, ChangeAction::Remove) => {
                return Err(conflict(
                    "action",
                    self.action.to_string(),
                    other.action.to_string(),
                ));
            }
            _ => {}
        }

        let mut merged = self.overlay.clone();
        for (field, theirs) in other.overlay.patches() {
            let patch = match self.overlay.patch(field) {
                None => theirs.clone(),
                Some(ours) if ours == theirs => continue,
                Some(ours) => union_patches(ours, theirs).ok_or_else(|| {
                    conflict(field.name(), describe_patch(ours), describe_patch(theirs))
                })?,
            };
            merged = merged.with_field(field, patch.operation, patch.value);
        }

        // An ADD on either side means no base entity is implied.
        if self.action == ChangeAction::Add || other.action == ChangeAction::Add {
            Ok(FeatureChange::new(self.key.kind, self.key.id, merged))
        } else {
            FeatureChange::update(self.key.kind, self.key.id, merged)
        }
    }
}

impl fmt::Display for FeatureChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.key)
    }
}

fn describe_patch(patch: &FieldPatch) -> String {
    format!("{} {}", patch.operation, patch.value.describe())
}

/// Union two same-operation collection patches; `None` when they clash
fn union_patches(ours: &FieldPatch, theirs: &FieldPatch) -> Option<FieldPatch> {
    if ours.operation != theirs.operation
        || !matches!(ours.operation, FieldOperation::Add | FieldOperation::Remove)
    {
        return None;
    }
    let value = match (&ours.value, &theirs.value) {
        (FieldValue::Tags(a), FieldValue::Tags(b)) => {
            let mut tags = a.clone();
            for (k, v) in b {
                match tags.get(k) {
                    Some(existing) if existing != v && ours.operation == FieldOperation::Add => {
                        return None;
                    }
                    _ => {
                        tags.insert(k.clone(), v.clone());
                    }
                }
            }
            FieldValue::Tags(tags)
        }
        (FieldValue::References(a), FieldValue::References(b)) => {
            FieldValue::References(a.union(b).copied().collect())
        }
        _ => return None,
    };
    Some(FieldPatch::new(ours.operation, value))
}

/// Stable structural representation of a [`FeatureChange`]
#[derive(Serialize, Deserialize)]
struct FeatureChangeRecord {
    kind: EntityKind,
    id: EntityId,
    action: ChangeAction,
    #[serde(default, skip_serializing_if = "EntityOverlay::is_empty")]
    overlay: EntityOverlay,
}

impl TryFrom<FeatureChangeRecord> for FeatureChange {
    type Error = GeoAtlasError;

    fn try_from(record: FeatureChangeRecord) -> Result<Self> {
        let key = EntityKey::new(record.kind, record.id);
        let consistent = match record.action {
            ChangeAction::Add => record.overlay.is_full_for(record.kind),
            ChangeAction::Remove => record.overlay.is_empty(),
            ChangeAction::Update => !record.overlay.is_empty(),
        };
        if !consistent {
            return Err(GeoAtlasError::InvalidEntity {
                key,
                reason: format!("overlay is inconsistent with action {}", record.action),
            });
        }
        Ok(Self {
            key,
            action: record.action,
            overlay: record.overlay,
        })
    }
}

impl From<FeatureChange> for FeatureChangeRecord {
    fn from(change: FeatureChange) -> Self {
        Self {
            kind: change.key.kind,
            id: change.key.id,
            action: change.action,
            overlay: change.overlay,
        }
    }
}
