//! Human-readable summary renderer for change sets.

use crate::change::{ChangeAction, ChangeSet, FeatureChange};
use crate::model::EntityKind;

/// Render a Markdown summary of a [`ChangeSet`].
///
/// The summary is intended for review workflows. It is informational only
/// and lists changes in the set's own order.
pub fn render_human_summary(changes: &ChangeSet) -> String {
    let mut out = String::new();

    out.push_str("## Change Set\n\n");

    if changes.is_empty() {
        out.push_str("_No changes._\n");
        return out;
    }

    let summary = changes.summary();
    out.push_str(&format!(
        "**Changes**: {} ({} added, {} removed, {} updated)\n\n",
        changes.len(),
        summary.total(ChangeAction::Add),
        summary.total(ChangeAction::Remove),
        summary.total(ChangeAction::Update),
    ));

    // Counts
    out.push_str("### Counts\n\n");
    out.push_str("| Kind | ADD | REMOVE | UPDATE |\n|---|---|---|---|\n");
    for kind in EntityKind::ALL {
        if !summary.counts.contains_key(&kind) {
            continue;
        }
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            kind,
            summary.count(kind, ChangeAction::Add),
            summary.count(kind, ChangeAction::Remove),
            summary.count(kind, ChangeAction::Update),
        ));
    }
    out.push('\n');

    // Per-change lines
    out.push_str("### Changes\n\n");
    for change in changes {
        out.push_str(&render_change(change));
    }

    out
}

fn render_change(change: &FeatureChange) -> String {
    match change.action() {
        ChangeAction::Update => {
            let patches: Vec<String> = change
                .overlay()
                .patches()
                .map(|(field, patch)| {
                    format!("{} {} {}", field, patch.operation, patch.value.describe())
                })
                .collect();
            format!(
                "- **{}** `{}`: {}\n",
                change.action(),
                change.key(),
                patches.join("; ")
            )
        }
        _ => format!("- **{}** `{}`\n", change.action(), change.key()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_change_set() {
        let out = render_human_summary(&ChangeSet::new());
        assert!(out.contains("_No changes._"));
    }

    #[test]
    fn test_remove_line() {
        let mut set = ChangeSet::new();
        set.add(FeatureChange::remove(EntityKind::Edge, 4)).unwrap();
        let out = render_human_summary(&set);
        assert!(out.contains("| edge | 0 | 1 | 0 |"));
        assert!(out.contains("- **REMOVE** `edge/4`"));
        assert!(!out.contains("| node |"));
    }
}
