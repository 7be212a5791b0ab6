use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use super::digest::compute_snapshot_digest;
use super::metadata::SnapshotMetadata;
use super::source::EntitySource;
use crate::errors::{GeoAtlasError, Result};
use crate::model::{Entity, EntityId, EntityKey, EntityKind};

/// Immutable collection of entities plus metadata.
///
/// Built once through [`SnapshotBuilder`](super::SnapshotBuilder) and never
/// mutated afterwards; share it between readers with `Arc<Snapshot>`.
/// Entities are kept in key order, so every listing is kind-then-id
/// ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord", into = "SnapshotRecord")]
pub struct Snapshot {
    metadata: SnapshotMetadata,
    entities: BTreeMap<EntityKey, Entity>,
}

impl Snapshot {
    /// Assemble a snapshot from already de-duplicated entities.
    ///
    /// Per-kind sizes in `metadata` are recomputed from `entities`.
    pub(crate) fn from_parts(mut metadata: SnapshotMetadata, entities: BTreeMap<EntityKey, Entity>) -> Self {
        metadata.sizes.clear();
        for kind in EntityKind::ALL {
            let size = entities.range(kind_range(kind)).count() as u64;
            metadata.set_size(kind, size);
        }
        Self { metadata, entities }
    }

    pub fn entity(&self, kind: EntityKind, id: EntityId) -> Option<&Entity> {
        self.entities.get(&EntityKey::new(kind, id))
    }

    /// Identifiers of `kind`, ascending
    pub fn identifiers(&self, kind: EntityKind) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.range(kind_range(kind)).map(|(key, _)| key.id)
    }

    /// Entities of `kind`, ascending by id
    pub fn entities(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.range(kind_range(kind)).map(|(_, entity)| entity)
    }

    /// Every entity, kind-then-id ascending
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.entities.contains_key(&key)
    }

    /// Content digest; see [`compute_snapshot_digest`].
    ///
    /// # Errors
    ///
    /// `Serialization` if the canonical JSON encoding fails.
    pub fn digest(&self) -> Result<String> {
        compute_snapshot_digest(self)
    }
}

impl EntitySource for Snapshot {
    fn entity(&self, kind: EntityKind, id: EntityId) -> Result<Option<Cow<'_, Entity>>> {
        Ok(Snapshot::entity(self, kind, id).map(Cow::Borrowed))
    }

    fn identifiers(&self, kind: EntityKind) -> Box<dyn Iterator<Item = EntityId> + '_> {
        Box::new(Snapshot::identifiers(self, kind))
    }

    fn metadata(&self) -> SnapshotMetadata {
        self.metadata.clone()
    }

    fn contains(&self, key: EntityKey) -> Result<bool> {
        Ok(Snapshot::contains(self, key))
    }
}

pub(super) fn kind_range(kind: EntityKind) -> RangeInclusive<EntityKey> {
    EntityKey::new(kind, EntityId::MIN)..=EntityKey::new(kind, EntityId::MAX)
}

/// Insert `entity`, rejecting a second entity with the same key.
pub(super) fn insert_unique(entities: &mut BTreeMap<EntityKey, Entity>, entity: Entity) -> Result<()> {
    let key = entity.key();
    if entities.contains_key(&key) {
        return Err(GeoAtlasError::DuplicateIdentifier { key });
    }
    entities.insert(key, entity);
    Ok(())
}

/// Stable structural representation of a [`Snapshot`]: metadata followed
/// by every entity in kind-then-id order.
///
/// Converting back into a snapshot rejects duplicate identifiers and
/// recomputes the per-kind sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub metadata: SnapshotMetadata,
    pub entities: Vec<Entity>,
}

impl TryFrom<SnapshotRecord> for Snapshot {
    type Error = GeoAtlasError;

    fn try_from(record: SnapshotRecord) -> Result<Self> {
        let mut entities = BTreeMap::new();
        for entity in record.entities {
            insert_unique(&mut entities, entity)?;
        }
        Ok(Snapshot::from_parts(record.metadata, entities))
    }
}

impl From<Snapshot> for SnapshotRecord {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            metadata: snapshot.metadata,
            entities: snapshot.entities.into_values().collect(),
        }
    }
}
