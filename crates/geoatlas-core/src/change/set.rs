use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::feature::{ChangeAction, FeatureChange};
use crate::errors::{GeoAtlasError, Result};
use crate::model::{EntityId, EntityKey, EntityKind};
use crate::snapshot::digest::hash_canonical;
use crate::{log_op_end, log_op_error, log_op_start};

/// Insertion-ordered collection of feature changes, at most one per key.
///
/// Merge semantics do not depend on insertion order (keys are unique);
/// the order is kept for audit and replay. Once handed to a
/// [`ChangeView`](crate::view::ChangeView) behind an `Arc` the set is
/// immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FeatureChange>", into = "Vec<FeatureChange>")]
pub struct ChangeSet {
    changes: Vec<FeatureChange>,
    index: HashMap<EntityKey, usize>,
}

/// Change counts per kind and action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub counts: BTreeMap<EntityKind, BTreeMap<ChangeAction, u64>>,
}

impl ChangeSummary {
    pub fn count(&self, kind: EntityKind, action: ChangeAction) -> u64 {
        self.counts
            .get(&kind)
            .and_then(|per_action| per_action.get(&action))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self, action: ChangeAction) -> u64 {
        self.counts
            .values()
            .filter_map(|per_action| per_action.get(&action))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `change`.
    ///
    /// # Errors
    ///
    /// `DuplicateKey` when a change for the same `(kind, id)` is already
    /// present. The set is left exactly as it was, so a caller may catch
    /// the error and continue with the rest of a batch.
    pub fn add(&mut self, change: FeatureChange) -> Result<()> {
        let key = change.key();
        log_op_start!("change_set_add", entity_kind = key.kind.name(), entity_id = key.id);
        let start = std::time::Instant::now();

        self.insert(change).map_err(|e| {
            log_op_error!(
                "change_set_add",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                entity_kind = key.kind.name(),
                entity_id = key.id
            );
            e
        })?;

        log_op_end!(
            "change_set_add",
            duration_ms = start.elapsed().as_millis() as u64,
            change_count = self.changes.len() as u64
        );
        Ok(())
    }

    /// Insert `change`, or pre-merge it into the change already held for
    /// the same key (see [`FeatureChange::merge`]).
    ///
    /// # Errors
    ///
    /// `MergeConflict` when the two changes cannot be merged; the set is
    /// left unchanged.
    pub fn add_or_merge(&mut self, change: FeatureChange) -> Result<()> {
        match self.index.get(&change.key()) {
            Some(&position) => {
                let merged = self.changes[position].merge(&change)?;
                self.changes[position] = merged;
                Ok(())
            }
            None => self.insert(change),
        }
    }

    /// Unlogged insert shared by `add`, the diff engine and deserialization
    pub(crate) fn insert(&mut self, change: FeatureChange) -> Result<()> {
        let key = change.key();
        if self.index.contains_key(&key) {
            return Err(GeoAtlasError::DuplicateKey { key });
        }
        self.index.insert(key, self.changes.len());
        self.changes.push(change);
        Ok(())
    }

    pub fn change_for(&self, kind: EntityKind, id: EntityId) -> Option<&FeatureChange> {
        self.index
            .get(&EntityKey::new(kind, id))
            .map(|&position| &self.changes[position])
    }

    /// Changes in insertion order; each call starts over
    pub fn iter(&self) -> std::slice::Iter<'_, FeatureChange> {
        self.changes.iter()
    }

    pub fn all(&self) -> &[FeatureChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn summary(&self) -> ChangeSummary {
        let mut summary = ChangeSummary::default();
        for change in &self.changes {
            *summary
                .counts
                .entry(change.kind())
                .or_default()
                .entry(change.action())
                .or_insert(0) += 1;
        }
        summary
    }

    /// SHA256 of the canonical JSON encoding, hex-encoded.
    ///
    /// Equal change sets (same changes, same order) have equal digests.
    ///
    /// # Errors
    ///
    /// `Serialization` if the JSON encoding fails.
    pub fn digest(&self) -> Result<String> {
        hash_canonical(&self.changes)
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a FeatureChange;
    type IntoIter = std::slice::Iter<'a, FeatureChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<Vec<FeatureChange>> for ChangeSet {
    type Error = GeoAtlasError;

    fn try_from(changes: Vec<FeatureChange>) -> Result<Self> {
        let mut set = ChangeSet::new();
        for change in changes {
            set.insert(change)?;
        }
        Ok(set)
    }
}

impl From<ChangeSet> for Vec<FeatureChange> {
    fn from(set: ChangeSet) -> Self {
        set.changes
    }
}
