use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::entity::Geometry;
use super::kind::EntityKey;
use crate::errors::{GeoAtlasError, Result};

/// The declared field list shared by every entity kind.
///
/// `Tags` and `References` are collection fields; `Geometry` is scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Tags,
    Geometry,
    References,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Tags, Field::Geometry, Field::References];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Tags => "tags",
            Field::Geometry => "geometry",
            Field::References => "references",
        }
    }

    pub fn is_collection(&self) -> bool {
        !matches!(self, Field::Geometry)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operation applied to one field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOperation {
    /// Collection gains elements; elements already present are untouched
    Add,
    /// Listed elements are removed from the collection
    Remove,
    /// Field is set to a new, non-empty value
    Replace,
    /// Field is set to a new value that may be empty or absent
    Overwrite,
}

impl FieldOperation {
    pub fn name(&self) -> &'static str {
        match self {
            FieldOperation::Add => "ADD",
            FieldOperation::Remove => "REMOVE",
            FieldOperation::Replace => "REPLACE",
            FieldOperation::Overwrite => "OVERWRITE",
        }
    }

    /// Replace and Overwrite discard the base value entirely
    pub fn is_full(&self) -> bool {
        matches!(self, FieldOperation::Replace | FieldOperation::Overwrite)
    }
}

impl fmt::Display for FieldOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed value carried by a field overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Tags(BTreeMap<String, String>),
    Geometry(Option<Geometry>),
    References(BTreeSet<EntityKey>),
}

impl FieldValue {
    /// The field this value's shape belongs to
    pub fn field(&self) -> Field {
        match self {
            FieldValue::Tags(_) => Field::Tags,
            FieldValue::Geometry(_) => Field::Geometry,
            FieldValue::References(_) => Field::References,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Tags(tags) => tags.is_empty(),
            FieldValue::Geometry(geometry) => geometry.is_none(),
            FieldValue::References(references) => references.is_empty(),
        }
    }

    /// Replace for a non-empty value, Overwrite for an empty one
    pub fn full_operation(&self) -> FieldOperation {
        if self.is_empty() {
            FieldOperation::Overwrite
        } else {
            FieldOperation::Replace
        }
    }

    /// Short rendering used in conflict reports and summaries
    pub fn describe(&self) -> String {
        match self {
            FieldValue::Tags(tags) => {
                let pairs: Vec<String> = tags.iter().map(|(k, v)| format!("{k}={v}")).collect();
                format!("{{{}}}", pairs.join(", "))
            }
            FieldValue::Geometry(Some(geometry)) => format!("geometry({} bytes)", geometry.len()),
            FieldValue::Geometry(None) => "geometry(none)".to_string(),
            FieldValue::References(references) => {
                let keys: Vec<String> = references.iter().map(|k| k.to_string()).collect();
                format!("[{}]", keys.join(", "))
            }
        }
    }
}

/// Check that `value` is a legal value for `field` on the entity `key`.
///
/// Covers the value shape, whether the kind carries the field at all, and
/// which kinds a reference set may point at.
pub(crate) fn check_value(key: EntityKey, field: Field, value: &FieldValue) -> Result<()> {
    if value.field() != field {
        return Err(GeoAtlasError::validation(
            key,
            field,
            format!("expected a {} value, got a {} value", field, value.field()),
        ));
    }
    if let FieldValue::References(references) = value {
        if !key.kind.carries_references() && !references.is_empty() {
            return Err(GeoAtlasError::validation(
                key,
                field,
                format!("{} entities carry no references", key.kind),
            ));
        }
        if let Some(bad) = references.iter().find(|r| !key.kind.may_reference(r.kind)) {
            return Err(GeoAtlasError::validation(
                key,
                field,
                format!("{} may not reference {}", key.kind, bad),
            ));
        }
    }
    Ok(())
}
