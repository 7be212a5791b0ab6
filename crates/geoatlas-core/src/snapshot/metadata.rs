use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::EntityKind;

/// Descriptive record attached to every snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Where the data came from (extract name, URL, editor session)
    pub origin: String,

    /// Administrative shard this snapshot covers, if sharded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<String>,

    /// Entity count per kind; kinds with no entities are omitted
    #[serde(default)]
    pub sizes: BTreeMap<EntityKind, u64>,

    /// Build timestamp (RFC3339 in the structural representation)
    pub built_at: DateTime<Utc>,

    /// Free-form descriptive properties
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl SnapshotMetadata {
    pub fn size(&self, kind: EntityKind) -> u64 {
        self.sizes.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_size(&self) -> u64 {
        self.sizes.values().sum()
    }

    pub(crate) fn set_size(&mut self, kind: EntityKind, size: u64) {
        if size == 0 {
            self.sizes.remove(&kind);
        } else {
            self.sizes.insert(kind, size);
        }
    }
}
