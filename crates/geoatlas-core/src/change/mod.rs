//! Feature changes and change sets.
//!
//! A [`FeatureChange`] binds an [`EntityOverlay`](crate::overlay::EntityOverlay)
//! to an entity key with a derived top-level action. A [`ChangeSet`]
//! collects them, rejecting a second change for a key already present.

pub mod feature;
pub mod set;

pub use feature::{ChangeAction, FeatureChange};
pub use set::{ChangeSet, ChangeSummary};
