//! blocktrack core - snapshot diffing for Scratch projects.
//!
//! This crate tracks the evolution of a Scratch project's `project.json`
//! across successive snapshots and synthesizes a human-readable summary of
//! what changed between two of them, suitable as a version-control commit
//! message.
//!
//! # Features
//!
//! - **Block deltas**: per-sprite change in block-graph size
//! - **Costume diffing**: added, removed, and re-keyed costumes, with
//!   rename/content-edit pairs collapsed into modifications
//! - **Deterministic summaries**: grouped, comma-separated commit lines
//!   with stable ordering
//!
//! The crate is pure: it performs no I/O and holds no state across calls.
//! Reading the snapshots from disk, staging the commit, and unlinking
//! orphaned costume files are the daemon's job.

pub mod differ;
pub mod error;
pub mod snapshot;

pub use differ::{
    block_diff, commits, costume_changes, costume_diff, ChangeKind, CostumeChange, CostumeChanges,
    ScriptChange,
};
pub use error::{DiffError, Result};
pub use snapshot::{costume_path, Snapshot};
