use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

use super::field::{check_value, Field, FieldValue};
use super::kind::{EntityId, EntityKey, EntityKind};
use crate::errors::{GeoAtlasError, Result};

/// Tag mapping of an entity; keys are unique and iterate in sorted order
pub type Tags = BTreeMap<String, String>;

/// Opaque geometry payload (typically WKB).
///
/// The core never interprets these bytes; it only copies and compares them.
/// The structural representation is base64 text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Geometry(Vec<u8>);

impl Geometry {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.as_bytes())
            .map(Geometry)
            .map_err(serde::de::Error::custom)
    }
}

/// One map feature: identity plus tags, geometry and (for edges and
/// relations) references to other entities.
///
/// `PartialEq` compares every attribute; use [`Entity::same_feature`] to
/// compare identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntityRecord", into = "EntityRecord")]
pub struct Entity {
    kind: EntityKind,
    id: EntityId,
    tags: Tags,
    geometry: Option<Geometry>,
    references: BTreeSet<EntityKey>,
}

impl Entity {
    pub fn builder(kind: EntityKind, id: EntityId) -> EntityBuilder {
        EntityBuilder {
            kind,
            id,
            tags: Tags::new(),
            geometry: None,
            references: BTreeSet::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind, self.id)
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Connected nodes of an edge, members of a relation; empty otherwise
    pub fn references(&self) -> &BTreeSet<EntityKey> {
        &self.references
    }

    /// True when both entities denote the same logical feature
    pub fn same_feature(&self, other: &Entity) -> bool {
        self.key() == other.key()
    }

    /// Current value of `field` as an owned overlay value
    pub fn field_value(&self, field: Field) -> FieldValue {
        match field {
            Field::Tags => FieldValue::Tags(self.tags.clone()),
            Field::Geometry => FieldValue::Geometry(self.geometry.clone()),
            Field::References => FieldValue::References(self.references.clone()),
        }
    }

    /// Fields whose values differ between `self` and `other`, in field order
    pub fn differing_fields(&self, other: &Entity) -> Vec<Field> {
        let mut fields = Vec::new();
        if self.tags != other.tags {
            fields.push(Field::Tags);
        }
        if self.geometry != other.geometry {
            fields.push(Field::Geometry);
        }
        if self.references != other.references {
            fields.push(Field::References);
        }
        fields
    }

    /// Rebuild an entity from per-field values, validating each one.
    pub(crate) fn from_values(
        key: EntityKey,
        tags: FieldValue,
        geometry: FieldValue,
        references: FieldValue,
    ) -> Result<Self> {
        for (field, value) in [
            (Field::Tags, &tags),
            (Field::Geometry, &geometry),
            (Field::References, &references),
        ] {
            check_value(key, field, value)?;
        }
        match (tags, geometry, references) {
            (FieldValue::Tags(tags), FieldValue::Geometry(geometry), FieldValue::References(references)) => {
                Ok(Self {
                    kind: key.kind,
                    id: key.id,
                    tags,
                    geometry,
                    references,
                })
            }
            _ => Err(GeoAtlasError::Internal {
                message: format!("field values for {} passed validation with the wrong shape", key),
            }),
        }
    }
}

/// Builder used by ingestion and tests to construct entities
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    kind: EntityKind,
    id: EntityId,
    tags: Tags,
    geometry: Option<Geometry>,
    references: BTreeSet<EntityKey>,
}

impl EntityBuilder {
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn reference(mut self, kind: EntityKind, id: EntityId) -> Self {
        self.references.insert(EntityKey::new(kind, id));
        self
    }

    pub fn references(mut self, references: impl IntoIterator<Item = EntityKey>) -> Self {
        self.references.extend(references);
        self
    }

    /// Validate and produce the entity.
    ///
    /// # Errors
    ///
    /// `Validation` when references are set on a kind that carries none, or
    /// point at a kind this entity may not reference.
    pub fn build(self) -> Result<Entity> {
        Entity::from_values(
            EntityKey::new(self.kind, self.id),
            FieldValue::Tags(self.tags),
            FieldValue::Geometry(self.geometry),
            FieldValue::References(self.references),
        )
    }
}

/// Stable structural representation of an [`Entity`] for serialization adapters
#[derive(Serialize, Deserialize)]
struct EntityRecord {
    kind: EntityKind,
    id: EntityId,
    #[serde(default)]
    tags: Tags,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    references: BTreeSet<EntityKey>,
}

impl TryFrom<EntityRecord> for Entity {
    type Error = GeoAtlasError;

    fn try_from(record: EntityRecord) -> Result<Self> {
        EntityBuilder {
            kind: record.kind,
            id: record.id,
            tags: record.tags,
            geometry: record.geometry,
            references: record.references,
        }
        .build()
    }
}

impl From<Entity> for EntityRecord {
    fn from(entity: Entity) -> Self {
        Self {
            kind: entity.kind,
            id: entity.id,
            tags: entity.tags,
            geometry: entity.geometry,
            references: entity.references,
        }
    }
}
