use std::borrow::Cow;

use super::metadata::SnapshotMetadata;
use crate::errors::Result;
use crate::model::{Entity, EntityId, EntityKey, EntityKind};

/// Read contract shared by snapshots and change views.
///
/// Implementations are immutable for their whole lifetime, so every method
/// takes `&self` and concurrent readers need no locking.
pub trait EntitySource: Send + Sync {
    /// Entity stored under `(kind, id)`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Sources that resolve entities lazily (change views) surface merge
    /// failures here. A plain snapshot never fails.
    fn entity(&self, kind: EntityKind, id: EntityId) -> Result<Option<Cow<'_, Entity>>>;

    /// Identifiers present for `kind`, ascending.
    ///
    /// Each call starts a fresh, finite iteration.
    fn identifiers(&self, kind: EntityKind) -> Box<dyn Iterator<Item = EntityId> + '_>;

    fn metadata(&self) -> SnapshotMetadata;

    /// # Errors
    ///
    /// Same as [`EntitySource::entity`].
    fn contains(&self, key: EntityKey) -> Result<bool> {
        Ok(self.entity(key.kind, key.id)?.is_some())
    }
}
