use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::Result;
use crate::model::{EntityKey, EntityKind};
use crate::snapshot::EntitySource;

/// A reference that does not resolve within its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DanglingReference {
    pub source_key: EntityKey,
    pub target: EntityKey,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source_key, self.target)
    }
}

/// Find every reference whose target is absent from `source`
///
/// Returned kind-then-id ascending by referencing entity, then by target.
///
/// # Errors
///
/// Propagates resolution failures from lazily merged sources.
pub fn find_dangling_references<S: EntitySource + ?Sized>(source: &S) -> Result<Vec<DanglingReference>> {
    let mut dangling = Vec::new();

    for kind in EntityKind::ALL.into_iter().filter(EntityKind::carries_references) {
        for id in source.identifiers(kind) {
            let Some(entity) = source.entity(kind, id)? else {
                continue;
            };
            for target in entity.references() {
                if !source.contains(*target)? {
                    dangling.push(DanglingReference {
                        source_key: entity.key(),
                        target: *target,
                    });
                }
            }
        }
    }

    Ok(dangling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;
    use crate::rules::validation::ReferencePolicy;
    use crate::snapshot::SnapshotBuilder;

    #[test]
    fn test_finds_dangling_edge_and_relation_references() {
        let mut builder =
            SnapshotBuilder::new("test").reference_policy(ReferencePolicy::TolerateDangling);
        builder
            .extend([
                Entity::builder(EntityKind::Node, 1).build().unwrap(),
                Entity::builder(EntityKind::Edge, 10)
                    .reference(EntityKind::Node, 1)
                    .reference(EntityKind::Node, 2)
                    .build()
                    .unwrap(),
                Entity::builder(EntityKind::Relation, 20)
                    .reference(EntityKind::Edge, 10)
                    .reference(EntityKind::Area, 5)
                    .build()
                    .unwrap(),
            ])
            .unwrap();
        let snapshot = builder.build().unwrap();

        let found = find_dangling_references(&snapshot).unwrap();
        assert_eq!(
            found,
            vec![
                DanglingReference {
                    source_key: EntityKey::new(EntityKind::Edge, 10),
                    target: EntityKey::new(EntityKind::Node, 2),
                },
                DanglingReference {
                    source_key: EntityKey::new(EntityKind::Relation, 20),
                    target: EntityKey::new(EntityKind::Area, 5),
                },
            ]
        );
    }
}
