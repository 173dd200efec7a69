//! Structural diff/patch over a generic JSON-shaped state tree.
//!
//! The host diffs its canonical state against the last-broadcast snapshot
//! each sync interval and ships only the resulting edit script; clients
//! apply the script in order to reproduce the successor snapshot exactly.
//!
//! Comparison is keyed by container type: maps are compared key-by-key,
//! sequences element-by-element by index, and primitive leaves by value
//! equality. Sequences are *not* content-addressed: an insert or removal
//! in the middle of a list shows up as a cascade of per-index replaces plus
//! a tail add/remove. That is a known inefficiency of the scheme, not a
//! correctness issue, and downstream code must not rely on any other
//! semantic.

pub mod apply;
pub mod diff;
pub mod path;

pub use apply::{PatchError, apply_patch};
pub use diff::diff;
pub use path::{PathSegment, format_path};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single tree-edit operation.
///
/// Applying a patch (an ordered sequence of these) to the snapshot it was
/// derived from must reproduce the successor snapshot exactly; operations
/// are not commutative and must be executed in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PatchOp {
    /// Insert a new map key or sequence element at `path`.
    Add {
        /// Location of the node to create.
        path: Vec<PathSegment>,
        /// The value to insert.
        value: Value,
    },
    /// Remove the map key or sequence element at `path`.
    Remove {
        /// Location of the node to delete.
        path: Vec<PathSegment>,
    },
    /// Overwrite the node at `path` with `value`.
    Replace {
        /// Location of the node to overwrite. Empty means the root.
        path: Vec<PathSegment>,
        /// The replacement value.
        value: Value,
    },
}

impl PatchOp {
    /// Returns the path this operation targets.
    pub fn path(&self) -> &[PathSegment] {
        match self {
            Self::Add { path, .. } | Self::Remove { path } | Self::Replace { path, .. } => path,
        }
    }
}
