//! Snapshot diff computation engine.
//!
//! The core entry point is [`compute_diff`], which compares any two
//! [`EntitySource`]s and produces the [`ChangeSet`] that turns the first
//! into the second.

use crate::change::{ChangeSet, FeatureChange};
use crate::diff::options::DiffOptions;
use crate::errors::{GeoAtlasError, Result};
use crate::model::{Entity, EntityId, EntityKind};
use crate::overlay::EntityOverlay;
use crate::snapshot::EntitySource;
use crate::{log_op_end, log_op_error, log_op_start};

/// Compute the change set turning `before` into `after`.
///
/// Equivalent to [`compute_diff_with`] with default options.
///
/// # Errors
///
/// Resolution errors from either source, or `Internal` if the determinism
/// guard trips.
pub fn compute_diff<B, A>(before: &B, after: &A) -> Result<ChangeSet>
where
    B: EntitySource + ?Sized,
    A: EntitySource + ?Sized,
{
    compute_diff_with(before, after, &DiffOptions::default())
}

/// Compute the change set turning `before` into `after`.
///
/// Kinds are visited in [`EntityKind::ALL`] order and, within a kind, the
/// union of both identifier sequences ascending. Per identifier:
///
/// - absent before, present after → ADD with a full overlay
/// - present before, absent after → REMOVE
/// - structurally equal → nothing
/// - differing → UPDATE with one field per differing attribute (REPLACE
///   for a non-empty new value, OVERWRITE otherwise)
///
/// The result is deterministic: identical inputs produce equal change sets
/// with equal digests.
///
/// # Errors
///
/// - `Interrupted` when `options.interrupt` is triggered; no partial change
///   set is returned
/// - resolution errors from either source
/// - `Internal` if the determinism guard trips
pub fn compute_diff_with<B, A>(before: &B, after: &A, options: &DiffOptions) -> Result<ChangeSet>
where
    B: EntitySource + ?Sized,
    A: EntitySource + ?Sized,
{
    log_op_start!(
        "compute_diff",
        request_id = options.context.request_id.as_str(),
        trace_id = options.context.trace_str()
    );
    let start = std::time::Instant::now();

    let changes = diff_impl(before, after, options).map_err(|e| {
        log_op_error!(
            "compute_diff",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = options.context.request_id.as_str()
        );
        e
    })?;

    log_op_end!(
        "compute_diff",
        duration_ms = start.elapsed().as_millis() as u64,
        change_count = changes.len() as u64,
        request_id = options.context.request_id.as_str()
    );
    Ok(changes)
}

fn diff_impl<B, A>(before: &B, after: &A, options: &DiffOptions) -> Result<ChangeSet>
where
    B: EntitySource + ?Sized,
    A: EntitySource + ?Sized,
{
    let mut changes = ChangeSet::new();
    let mut processed: u64 = 0;

    for kind in EntityKind::ALL {
        let mut left = before.identifiers(kind).peekable();
        let mut right = after.identifiers(kind).peekable();

        loop {
            // Union of both ascending sequences
            let id = match (left.peek().copied(), right.peek().copied()) {
                (Some(l), Some(r)) => {
                    let id = l.min(r);
                    if l == id {
                        left.next();
                    }
                    if r == id {
                        right.next();
                    }
                    id
                }
                (Some(l), None) => {
                    left.next();
                    l
                }
                (None, Some(r)) => {
                    right.next();
                    r
                }
                (None, None) => break,
            };

            if options.should_stop(processed) {
                return Err(GeoAtlasError::Interrupted {
                    op: "compute_diff",
                    processed,
                });
            }
            processed += 1;

            let old = before.entity(kind, id)?;
            let new = after.entity(kind, id)?;
            if let Some(change) = diff_entity(kind, id, old.as_deref(), new.as_deref())? {
                changes.insert(change)?;
            }
        }
    }

    tracing::debug!(op = "compute_diff", processed, "identifier walk complete");

    // Determinism guard: round-trip through JSON must produce an equal set
    let serialized = serde_json::to_string(&changes)?;
    let reparsed: ChangeSet = serde_json::from_str(&serialized)?;
    if reparsed != changes {
        return Err(GeoAtlasError::Internal {
            message: "diff is not deterministic: round-trip produced a different change set"
                .to_string(),
        });
    }

    Ok(changes)
}

/// Change for one identifier, or `None` when both sides agree
fn diff_entity(
    kind: EntityKind,
    id: EntityId,
    old: Option<&Entity>,
    new: Option<&Entity>,
) -> Result<Option<FeatureChange>> {
    match (old, new) {
        (None, None) => Ok(None),
        (None, Some(new)) => Ok(Some(FeatureChange::new(
            kind,
            id,
            EntityOverlay::from_entity(new),
        ))),
        (Some(_), None) => Ok(Some(FeatureChange::remove(kind, id))),
        (Some(old), Some(new)) if old == new => Ok(None),
        (Some(old), Some(new)) => {
            let overlay = old
                .differing_fields(new)
                .into_iter()
                .fold(EntityOverlay::new(), |overlay, field| {
                    let value = new.field_value(field);
                    overlay.with_field(field, value.full_operation(), value)
                });
            FeatureChange::update(kind, id, overlay).map(Some)
        }
    }
}
