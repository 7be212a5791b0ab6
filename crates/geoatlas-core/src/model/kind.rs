use serde::{Deserialize, Serialize};
use std::fmt;

use super::field::Field;

/// Identifier of an entity within its kind namespace.
///
/// Either the external source identifier or a synthetic identifier produced
/// by [`crate::identifier::encode`]; the full signed range is valid.
pub type EntityId = i64;

/// The six feature kinds of a snapshot.
///
/// Declaration order is the canonical iteration order used by the diff
/// engine and by every ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    Edge,
    Area,
    Line,
    Point,
    Relation,
}

const WITHOUT_REFERENCES: &[Field] = &[Field::Tags, Field::Geometry];
const WITH_REFERENCES: &[Field] = &[Field::Tags, Field::Geometry, Field::References];

impl EntityKind {
    /// Every kind, in canonical order
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Node,
        EntityKind::Edge,
        EntityKind::Area,
        EntityKind::Line,
        EntityKind::Point,
        EntityKind::Relation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
            EntityKind::Area => "area",
            EntityKind::Line => "line",
            EntityKind::Point => "point",
            EntityKind::Relation => "relation",
        }
    }

    /// Edges reference their connected nodes and relations their members;
    /// the other kinds carry no reference set.
    pub fn carries_references(&self) -> bool {
        matches!(self, EntityKind::Edge | EntityKind::Relation)
    }

    /// Fields an overlay must fully cover to stand alone as a new entity
    pub fn required_fields(&self) -> &'static [Field] {
        if self.carries_references() {
            WITH_REFERENCES
        } else {
            WITHOUT_REFERENCES
        }
    }

    /// Whether an entity of this kind may reference an entity of `target`
    pub fn may_reference(&self, target: EntityKind) -> bool {
        match self {
            EntityKind::Edge => target == EntityKind::Node,
            EntityKind::Relation => true,
            _ => false,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a feature: `(kind, id)`.
///
/// Two entities with the same key are the same logical feature even when
/// their attributes differ. Ordered by kind, then id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityKey {
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order_matches_declaration() {
        let mut sorted = EntityKind::ALL;
        sorted.sort();
        assert_eq!(sorted, EntityKind::ALL);
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(EntityKind::Node.required_fields(), WITHOUT_REFERENCES);
        assert_eq!(EntityKind::Relation.required_fields(), WITH_REFERENCES);
        assert!(EntityKind::Edge.required_fields().contains(&Field::References));
    }

    #[test]
    fn test_reference_targets() {
        assert!(EntityKind::Edge.may_reference(EntityKind::Node));
        assert!(!EntityKind::Edge.may_reference(EntityKind::Area));
        assert!(EntityKind::Relation.may_reference(EntityKind::Relation));
        assert!(!EntityKind::Point.may_reference(EntityKind::Node));
    }

    #[test]
    fn test_key_ordering_is_kind_then_id() {
        let a = EntityKey::new(EntityKind::Node, 10);
        let b = EntityKey::new(EntityKind::Edge, -5);
        let c = EntityKey::new(EntityKind::Edge, 3);
        assert!(a < b);
        assert!(b < c);
        assert_eq!(c.to_string(), "edge/3");
    }
}
