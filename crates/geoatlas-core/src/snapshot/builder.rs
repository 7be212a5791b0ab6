use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::metadata::SnapshotMetadata;
use super::store::{insert_unique, Snapshot};
use crate::config::SnapshotConfig;
use crate::errors::Result;
use crate::model::{Entity, EntityKey};
use crate::rules::validation::{validate_references, ReferencePolicy};
use crate::{log_op_end, log_op_error, log_op_start};

/// Ingestion-side builder for [`Snapshot`].
///
/// The only checks performed are identifier uniqueness within a kind (on
/// [`add`](Self::add)) and, under [`ReferencePolicy::Strict`], reference
/// integrity (on [`build`](Self::build)).
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    origin: String,
    shard: Option<String>,
    properties: BTreeMap<String, String>,
    built_at: Option<DateTime<Utc>>,
    policy: ReferencePolicy,
    entities: BTreeMap<EntityKey, Entity>,
}

impl SnapshotBuilder {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            shard: None,
            properties: BTreeMap::new(),
            built_at: None,
            policy: ReferencePolicy::default(),
            entities: BTreeMap::new(),
        }
    }

    /// Builder whose reference policy comes from `config`
    pub fn from_config(origin: impl Into<String>, config: &SnapshotConfig) -> Self {
        Self::new(origin).reference_policy(config.reference_policy)
    }

    pub fn shard(mut self, name: impl Into<String>) -> Self {
        self.shard = Some(name.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Pin the build timestamp instead of taking the clock at `build`
    pub fn built_at(mut self, at: DateTime<Utc>) -> Self {
        self.built_at = Some(at);
        self
    }

    pub fn reference_policy(mut self, policy: ReferencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Add one entity.
    ///
    /// # Errors
    ///
    /// `DuplicateIdentifier` when an entity with the same `(kind, id)` was
    /// already added; the builder is left unchanged.
    pub fn add(&mut self, entity: Entity) -> Result<()> {
        insert_unique(&mut self.entities, entity)
    }

    /// Add every entity of `entities`, stopping at the first duplicate.
    ///
    /// # Errors
    ///
    /// `DuplicateIdentifier`, as for [`add`](Self::add).
    pub fn extend(&mut self, entities: impl IntoIterator<Item = Entity>) -> Result<()> {
        entities.into_iter().try_for_each(|entity| self.add(entity))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Freeze the collected entities into a snapshot.
    ///
    /// # Errors
    ///
    /// `DanglingReference` under [`ReferencePolicy::Strict`] when a
    /// reference points at an entity that was never added.
    pub fn build(self) -> Result<Snapshot> {
        log_op_start!(
            "snapshot_build",
            origin = %self.origin,
            entity_count = self.entities.len() as u64
        );
        let start = std::time::Instant::now();

        let policy = self.policy;
        let metadata = SnapshotMetadata {
            origin: self.origin,
            shard: self.shard,
            sizes: BTreeMap::new(),
            built_at: self.built_at.unwrap_or_else(Utc::now),
            properties: self.properties,
        };
        let snapshot = Snapshot::from_parts(metadata, self.entities);

        validate_references(&snapshot, policy).map_err(|e| {
            log_op_error!(
                "snapshot_build",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "snapshot_build",
            duration_ms = start.elapsed().as_millis() as u64,
            entity_count = snapshot.len() as u64
        );
        Ok(snapshot)
    }
}
