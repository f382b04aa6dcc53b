//! Comparator logic for diffing two project snapshots.
//!
//! Every function here is a pure function of its two input snapshots: no
//! I/O, no shared state, no mutation of the documents. Data flows one way —
//! raw diffs from [`block_diff`] and [`costume_diff`], categorized records
//! from [`costume_changes`], and a grouped, deterministic summary from
//! [`commits`].

use std::collections::{HashMap, HashSet};

use crate::differ::changes::{ChangeKind, CostumeChange, CostumeChanges, ScriptChange};
use crate::error::Result;
use crate::snapshot::Snapshot;

/// Compute the block-count delta per sprite between two snapshots.
///
/// Sprites are paired by name. A sprite present only in `new` is reported as
/// a wholesale addition of all its blocks; a sprite present only in `old` as
/// a wholesale removal. Sprites whose count did not change are omitted.
///
/// Output order follows `new`'s sprite order, then old-only sprites in
/// `old`'s order.
pub fn block_diff(old: &Snapshot, new: &Snapshot) -> Result<Vec<ScriptChange>> {
    let old_counts = old.block_counts()?;
    let new_counts = new.block_counts()?;

    // First occurrence wins when a name repeats.
    let mut old_by_name: HashMap<&str, usize> = HashMap::new();
    for (name, count) in &old_counts {
        old_by_name.entry(name.as_str()).or_insert(*count);
    }
    let new_names: HashSet<&str> = new_counts.iter().map(|(name, _)| name.as_str()).collect();

    let mut changes = Vec::new();
    for (name, count) in &new_counts {
        let before = old_by_name.get(name.as_str()).copied().unwrap_or(0);
        let delta = *count as i64 - before as i64;
        if delta != 0 {
            changes.push(ScriptChange::new(name, delta));
        }
    }
    for (name, count) in &old_counts {
        if !new_names.contains(name.as_str()) && *count > 0 {
            changes.push(ScriptChange::new(name, -(*count as i64)));
        }
    }

    Ok(changes)
}

/// Costume records present in `comparand` but absent in `reference`.
///
/// Output preserves `comparand`'s own document order: membership is tested
/// against a set, never recovered by re-sorting a set difference.
///
/// `costume_diff(old, new)` yields additions; `costume_diff(new, old)`
/// yields removals. The asymmetry is purely in argument order.
pub fn costume_diff(reference: &Snapshot, comparand: &Snapshot) -> Result<Vec<CostumeChange>> {
    let reference: HashSet<CostumeChange> = reference
        .costumes()?
        .into_iter()
        .flat_map(|(_, costumes)| costumes)
        .collect();

    let mut changes = Vec::new();
    for (_, costumes) in comparand.costumes()? {
        for change in costumes {
            if !reference.contains(&change) {
                changes.push(change);
            }
        }
    }
    Ok(changes)
}

/// Categorize costume changes between two snapshots.
///
/// A rename (same bytes, new display name) or a content edit (same display
/// name, new identity path) surfaces in the raw diff as one addition plus
/// one removal for the same sprite. Pairs sharing the path-erased key
/// `(sprite, display name)` are re-labeled as modifications, reported with
/// the add-side path, and dropped from both raw lists.
///
/// When several costumes in one sprite share a display name, pairing is by
/// name only, so collisions merge best-effort in insertion order. Accepted
/// limitation, not an error.
pub fn costume_changes(old: &Snapshot, new: &Snapshot) -> Result<CostumeChanges> {
    let added_raw = costume_diff(old, new)?;
    let removed_raw = costume_diff(new, old)?;

    // Multiset of removal keys still available for pairing.
    let mut removal_keys: HashMap<(String, String), usize> = HashMap::new();
    for change in &removed_raw {
        *removal_keys
            .entry((change.sprite.clone(), change.name.clone()))
            .or_insert(0) += 1;
    }

    let mut added = Vec::new();
    let mut modified = Vec::new();
    let mut merged: HashMap<(String, String), usize> = HashMap::new();
    for change in added_raw {
        let available = removal_keys
            .get_mut(&(change.sprite.clone(), change.name.clone()))
            .filter(|n| **n > 0);
        match available {
            Some(n) => {
                *n -= 1;
                *merged
                    .entry((change.sprite.clone(), change.name.clone()))
                    .or_insert(0) += 1;
                modified.push(change);
            }
            None => added.push(change),
        }
    }

    let mut removed = Vec::new();
    for change in removed_raw {
        let consumed = merged
            .get_mut(&(change.sprite.clone(), change.name.clone()))
            .filter(|n| **n > 0);
        match consumed {
            Some(n) => *n -= 1,
            None => removed.push(change),
        }
    }

    Ok(CostumeChanges {
        added,
        removed,
        modified,
    })
}

/// Stable grouping of `(sprite, clause)` records.
///
/// Sprites keep their first-seen order; clauses keep their insertion order
/// within each sprite.
fn group_by_sprite(records: Vec<(String, String)>) -> Vec<(String, Vec<String>)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<String>> = HashMap::new();
    for (sprite, clause) in records {
        if !groups.contains_key(&sprite) {
            order.push(sprite.clone());
        }
        groups.entry(sprite).or_default().push(clause);
    }
    order
        .into_iter()
        .map(|sprite| {
            let clauses = groups.remove(&sprite).unwrap_or_default();
            (sprite, clauses)
        })
        .collect()
}

/// Render one category of costume changes into per-sprite clauses.
///
/// Each sprite group becomes a single `"{verb} {comma-joined names}"`
/// clause.
fn format_costumes(changes: &[CostumeChange], kind: ChangeKind) -> Vec<(String, String)> {
    let records = changes
        .iter()
        .map(|change| (change.sprite.clone(), change.name.clone()))
        .collect();
    group_by_sprite(records)
        .into_iter()
        .map(|(sprite, names)| (sprite, format!("{} {}", kind.verb(), names.join(", "))))
        .collect()
}

/// Synthesize the per-sprite commit summary for the change from `old` to
/// `new`.
///
/// Each returned line matches `"{sprite}: {clause}(, {clause})*"`, with
/// clauses in the order blocks, add, modify, remove and sprites in
/// first-seen order across all categories. Joining the lines with `", "`
/// yields a single-line commit message; identical snapshots yield an empty
/// list.
pub fn commits(old: &Snapshot, new: &Snapshot) -> Result<Vec<String>> {
    let costumes = costume_changes(old, new)?;

    let blocks: Vec<(String, String)> = block_diff(old, new)?
        .into_iter()
        .map(|change| (change.sprite.clone(), change.clause()))
        .collect();
    let added = format_costumes(&costumes.added, ChangeKind::Add);
    let modified = format_costumes(&costumes.modified, ChangeKind::Modify);
    let removed = format_costumes(&costumes.removed, ChangeKind::Remove);

    let records = [blocks, added, modified, removed].concat();

    Ok(group_by_sprite(records)
        .into_iter()
        .map(|(sprite, clauses)| format!("{}: {}", sprite, clauses.join(", ")))
        .collect())
}
