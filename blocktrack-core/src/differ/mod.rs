//! Snapshot-diff engine for comparing two project versions.
//!
//! Given two [`Snapshot`](crate::snapshot::Snapshot)s of the same project,
//! this module computes the change in block-graph size per sprite, the
//! costumes that were added, removed, or re-keyed, and renders everything
//! into a deterministic, grouped summary suitable for use as a commit
//! message.
//!
//! # Example
//!
//! ```
//! use blocktrack_core::{commits, Snapshot};
//! use serde_json::json;
//!
//! let old = Snapshot::new(json!({"targets": [
//!     {"name": "Stage", "blocks": {}, "costumes": []}
//! ]}));
//! let new = Snapshot::new(json!({"targets": [
//!     {"name": "Stage", "blocks": {"a": {}}, "costumes": []}
//! ]}));
//!
//! let lines = commits(&old, &new).unwrap();
//! assert_eq!(lines, vec!["Stage: +1 blocks".to_string()]);
//! ```

pub mod changes;
pub mod comparator;

pub use changes::{ChangeKind, CostumeChange, CostumeChanges, ScriptChange};
pub use comparator::{block_diff, commits, costume_changes, costume_diff};
