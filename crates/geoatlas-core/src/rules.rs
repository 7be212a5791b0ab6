//! Reference-integrity rules.
//!
//! `invariants` exposes exhaustive `find_*` checks; `validation` turns them
//! into a pass/fail verdict under a [`ReferencePolicy`].

pub mod invariants;
pub mod validation;

pub use invariants::{find_dangling_references, DanglingReference};
pub use validation::{validate_references, ReferencePolicy};
