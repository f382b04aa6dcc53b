//! Change types and result structures for the snapshot differ.

use serde::Serialize;

/// Kind of costume change detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    Add,
    Remove,
    Modify,
}

impl ChangeKind {
    /// Verb used when the change is rendered into a commit clause.
    pub fn verb(&self) -> &'static str {
        match self {
            ChangeKind::Add => "add",
            ChangeKind::Remove => "remove",
            ChangeKind::Modify => "modify",
        }
    }
}

/// A single costume change record: one `(sprite, identity path, display
/// name)` tuple.
///
/// Records are immutable once constructed; the classifier builds new records
/// from matched pairs instead of patching existing ones.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CostumeChange {
    /// Name of the sprite owning the costume.
    pub sprite: String,
    /// Content-addressable identity path, e.g. `"a1b2c3.svg"`.
    pub path: String,
    /// Display name of the costume. Not guaranteed unique within a sprite.
    pub name: String,
}

impl CostumeChange {
    pub fn new(sprite: &str, path: &str, name: &str) -> Self {
        Self {
            sprite: sprite.to_string(),
            path: path.to_string(),
            name: name.to_string(),
        }
    }
}

/// Categorized costume changes between two snapshots.
///
/// The three lists are disjoint: a rename or content edit that would
/// otherwise surface as one addition plus one removal is reported once,
/// under `modified`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CostumeChanges {
    pub added: Vec<CostumeChange>,
    pub removed: Vec<CostumeChange>,
    pub modified: Vec<CostumeChange>,
}

/// Block-count delta for one sprite.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScriptChange {
    /// Name of the sprite whose block graph changed.
    pub sprite: String,
    /// Signed change in block-graph entry count.
    pub delta: i64,
}

impl ScriptChange {
    pub fn new(sprite: &str, delta: i64) -> Self {
        Self {
            sprite: sprite.to_string(),
            delta,
        }
    }

    /// Clause fragment, e.g. `"+2 blocks"` or `"-1 blocks"`.
    ///
    /// The sign is explicit only for positive deltas; negative deltas carry
    /// their own sign.
    pub fn clause(&self) -> String {
        let sign = if self.delta > 0 { "+" } else { "" };
        format!("{}{} blocks", sign, self.delta)
    }

    /// Full commit line for this change, e.g. `"Sprite1: +2 blocks"`.
    pub fn format(&self) -> String {
        format!("{}: {}", self.sprite, self.clause())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_kind_verb() {
        assert_eq!(ChangeKind::Add.verb(), "add");
        assert_eq!(ChangeKind::Remove.verb(), "remove");
        assert_eq!(ChangeKind::Modify.verb(), "modify");
    }

    #[test]
    fn test_script_change_positive_sign() {
        let change = ScriptChange::new("Sprite1", 3);
        assert_eq!(change.format(), "Sprite1: +3 blocks");
    }

    #[test]
    fn test_script_change_negative_sign() {
        let change = ScriptChange::new("Stage", -2);
        assert_eq!(change.format(), "Stage: -2 blocks");
    }
}
