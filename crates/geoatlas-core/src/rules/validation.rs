use serde::{Deserialize, Serialize};

use crate::errors::{GeoAtlasError, Result};
use crate::snapshot::EntitySource;
use crate::{log_op_end, log_op_error, log_op_start};

use super::invariants;

/// How reference integrity is enforced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    /// Every reference must resolve within the same source
    #[default]
    Strict,
    /// Dangling references are accepted (partial extracts, shard edges)
    TolerateDangling,
}

/// Validate reference integrity of `source` under `policy`
///
/// # Errors
///
/// Under [`ReferencePolicy::Strict`], returns `DanglingReference` for the
/// first unresolved reference (kind-then-id order). For exhaustive
/// reporting, call [`invariants::find_dangling_references`] directly.
pub fn validate_references<S: EntitySource + ?Sized>(source: &S, policy: ReferencePolicy) -> Result<()> {
    if policy == ReferencePolicy::TolerateDangling {
        tracing::debug!(op = "validate_references", "reference validation skipped");
        return Ok(());
    }

    log_op_start!("validate_references");
    let start = std::time::Instant::now();

    let result = invariants::find_dangling_references(source).and_then(|dangling| {
        match dangling.first() {
            Some(first) => Err(GeoAtlasError::DanglingReference {
                source_key: first.source_key,
                target: first.target,
            }),
            None => Ok(()),
        }
    });

    match result {
        Ok(()) => {
            log_op_end!(
                "validate_references",
                duration_ms = start.elapsed().as_millis() as u64
            );
            Ok(())
        }
        Err(e) => {
            log_op_error!(
                "validate_references",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, EntityKey, EntityKind};
    use crate::snapshot::SnapshotBuilder;

    #[test]
    fn test_strict_reports_first_dangling_reference() {
        let mut builder =
            SnapshotBuilder::new("test").reference_policy(ReferencePolicy::TolerateDangling);
        builder
            .extend([
                Entity::builder(EntityKind::Edge, 2)
                    .reference(EntityKind::Node, 8)
                    .build()
                    .unwrap(),
                Entity::builder(EntityKind::Edge, 1)
                    .reference(EntityKind::Node, 9)
                    .build()
                    .unwrap(),
            ])
            .unwrap();
        let snapshot = builder.build().unwrap();

        assert_eq!(
            validate_references(&snapshot, ReferencePolicy::Strict),
            Err(GeoAtlasError::DanglingReference {
                source_key: EntityKey::new(EntityKind::Edge, 1),
                target: EntityKey::new(EntityKind::Node, 9),
            })
        );
        assert!(validate_references(&snapshot, ReferencePolicy::TolerateDangling).is_ok());
    }

    #[test]
    fn test_policy_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ReferencePolicy::TolerateDangling).unwrap(),
            "\"tolerate_dangling\""
        );
    }
}
