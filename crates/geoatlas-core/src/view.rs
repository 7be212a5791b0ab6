//! Lazily merged change views.
//!
//! A [`ChangeView`] is a read-through wrapper over a shared base source and
//! a shared change set. Nothing is materialized up front: every query looks
//! up the change for its key and resolves it against the base entity, so
//! memory stays proportional to the edit, not to the snapshot.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{btree_set, BTreeSet};
use std::iter::Peekable;
use std::sync::Arc;

use crate::change::{ChangeAction, ChangeSet};
use crate::errors::Result;
use crate::model::{Entity, EntityId, EntityKind};
use crate::rules::validation::ReferencePolicy;
use crate::snapshot::{EntitySource, Snapshot, SnapshotBuilder, SnapshotMetadata};
use crate::{log_op_end, log_op_error, log_op_start};

/// Virtual snapshot: `base` with `changes` applied per query.
///
/// Views implement [`EntitySource`] themselves, so a view can serve as the
/// base of another view or as either side of a diff.
#[derive(Debug)]
pub struct ChangeView<S: ?Sized = Snapshot> {
    base: Arc<S>,
    changes: Arc<ChangeSet>,
}

impl<S: ?Sized> Clone for ChangeView<S> {
    fn clone(&self) -> Self {
        Self {
            base: Arc::clone(&self.base),
            changes: Arc::clone(&self.changes),
        }
    }
}

impl<S: EntitySource + ?Sized> ChangeView<S> {
    pub fn new(base: Arc<S>, changes: Arc<ChangeSet>) -> Self {
        Self { base, changes }
    }

    pub fn base(&self) -> &Arc<S> {
        &self.base
    }

    pub fn changes(&self) -> &Arc<ChangeSet> {
        &self.changes
    }

    /// Resolve `(kind, id)`.
    ///
    /// With a change for the key: ADD yields the overlay's entity, REMOVE
    /// yields `None`, UPDATE merges onto the base entity. Without one, the
    /// base entity is returned unchanged.
    ///
    /// # Errors
    ///
    /// `MissingBase` for an UPDATE whose base entity is absent; overlay
    /// validation errors from the merge.
    pub fn entity(&self, kind: EntityKind, id: EntityId) -> Result<Option<Entity>> {
        let base = self.base.entity(kind, id)?;
        match self.changes.change_for(kind, id) {
            Some(change) => change.apply_to(base.as_deref()),
            None => Ok(base.map(Cow::into_owned)),
        }
    }

    /// Base identifiers minus removed plus added, ascending
    pub fn identifiers(&self, kind: EntityKind) -> impl Iterator<Item = EntityId> + '_ {
        let mut added = BTreeSet::new();
        let mut removed = BTreeSet::new();
        for change in self.changes.iter().filter(|c| c.kind() == kind) {
            match change.action() {
                ChangeAction::Add => {
                    added.insert(change.id());
                }
                ChangeAction::Remove => {
                    removed.insert(change.id());
                }
                ChangeAction::Update => {}
            }
        }
        MergedIdentifiers {
            base: self.base.identifiers(kind).peekable(),
            added: added.into_iter().peekable(),
            removed,
        }
    }

    /// Base metadata with per-kind sizes recounted through the view
    pub fn metadata(&self) -> SnapshotMetadata {
        let mut metadata = self.base.metadata();
        for kind in EntityKind::ALL {
            let size = self.identifiers(kind).count() as u64;
            metadata.set_size(kind, size);
        }
        metadata
    }

    /// Resolve every changed key once, surfacing the first failure.
    ///
    /// # Errors
    ///
    /// The first error [`entity`](Self::entity) reports, in change set
    /// insertion order.
    pub fn validate(&self) -> Result<()> {
        log_op_start!("change_view_validate", change_count = self.changes.len() as u64);
        let start = std::time::Instant::now();

        let result = self
            .changes
            .iter()
            .try_for_each(|change| self.entity(change.kind(), change.id()).map(|_| ()));

        match result {
            Ok(()) => {
                log_op_end!(
                    "change_view_validate",
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Ok(())
            }
            Err(e) => {
                log_op_error!(
                    "change_view_validate",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(e)
            }
        }
    }

    /// Compact the view into a standalone snapshot.
    ///
    /// Origin, shard and properties are carried over from the base.
    ///
    /// # Errors
    ///
    /// Resolution errors from [`entity`](Self::entity), and
    /// `DanglingReference` under [`ReferencePolicy::Strict`].
    pub fn materialize(&self, policy: ReferencePolicy) -> Result<Snapshot> {
        let base_metadata = self.base.metadata();
        let mut builder = SnapshotBuilder::new(base_metadata.origin).reference_policy(policy);
        if let Some(shard) = base_metadata.shard {
            builder = builder.shard(shard);
        }
        for (key, value) in base_metadata.properties {
            builder = builder.property(key, value);
        }
        for kind in EntityKind::ALL {
            for id in self.identifiers(kind) {
                if let Some(entity) = self.entity(kind, id)? {
                    builder.add(entity)?;
                }
            }
        }
        builder.build()
    }
}

impl<S: EntitySource + ?Sized> EntitySource for ChangeView<S> {
    fn entity(&self, kind: EntityKind, id: EntityId) -> Result<Option<Cow<'_, Entity>>> {
        Ok(ChangeView::entity(self, kind, id)?.map(Cow::Owned))
    }

    fn identifiers(&self, kind: EntityKind) -> Box<dyn Iterator<Item = EntityId> + '_> {
        Box::new(ChangeView::identifiers(self, kind))
    }

    fn metadata(&self) -> SnapshotMetadata {
        ChangeView::metadata(self)
    }
}

/// Ascending merge of base identifiers with added ones, skipping removals
struct MergedIdentifiers<'a> {
    base: Peekable<Box<dyn Iterator<Item = EntityId> + 'a>>,
    added: Peekable<btree_set::IntoIter<EntityId>>,
    removed: BTreeSet<EntityId>,
}

impl Iterator for MergedIdentifiers<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        loop {
            let next = match (self.base.peek().copied(), self.added.peek().copied()) {
                (Some(b), Some(a)) => match a.cmp(&b) {
                    Ordering::Less => self.added.next(),
                    Ordering::Greater => self.base.next(),
                    Ordering::Equal => {
                        self.added.next();
                        self.base.next()
                    }
                },
                (Some(_), None) => self.base.next(),
                (None, Some(_)) => self.added.next(),
                (None, None) => return None,
            }?;
            if !self.removed.contains(&next) {
                return Some(next);
            }
        }
    }
}
