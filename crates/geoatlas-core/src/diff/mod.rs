//! Snapshot diff engine.
//!
//! Compares two entity sources and produces the change set that turns the
//! first into the second.
//!
//! ## Entry point
//!
//! ```ignore
//! use geoatlas_core::diff::engine::compute_diff;
//!
//! let changes = compute_diff(&before, &after)?;
//! let summary = geoatlas_core::diff::human_summary::render_human_summary(&changes);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce equal change sets with equal
//!   digests, ordered kind-then-id ascending.
//! - **Reconstruction**: `ChangeView::new(before, diff)` resolves every key
//!   exactly as `after` does.
//! - **Atomic interruption**: an interrupted diff returns `Interrupted` and
//!   nothing else.

pub mod engine;
pub mod human_summary;
pub mod options;

pub use engine::{compute_diff, compute_diff_with};
pub use human_summary::render_human_summary;
pub use options::{DiffOptions, Interrupt};
