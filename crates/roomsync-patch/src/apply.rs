//! In-place application of edit scripts.

use serde_json::Value;

use crate::path::{format_path, PathSegment};
use crate::PatchOp;

/// Errors raised while applying a patch.
///
/// The engine performs no validation beyond best-effort traversal: a patch
/// that names a path which no longer exists indicates a data-integrity bug
/// upstream (a diverged or reordered sync stream), not a condition this
/// layer recovers from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// A path segment did not resolve to an existing node.
    #[error("path {0} does not exist in the target tree")]
    PathNotFound(String),

    /// A key segment was applied to a non-map, or an index segment to a
    /// non-sequence.
    #[error("path {0} traverses a node of the wrong kind")]
    WrongKind(String),

    /// An add targeted a sequence index beyond its length.
    #[error("add at {0} is past the end of the sequence")]
    IndexOutOfRange(String),
}

/// Apply `ops` to `state` in order, mutating it in place.
///
/// Applying the script produced by [`crate::diff`]`(a, b)` to a copy of `a`
/// yields exactly `b`. Operations are executed strictly in sequence; on the
/// first failure the state is left partially patched and the error names
/// the offending path.
pub fn apply_patch(state: &mut Value, ops: &[PatchOp]) -> Result<(), PatchError> {
    for op in ops {
        apply_op(state, op)?;
    }
    Ok(())
}

fn apply_op(state: &mut Value, op: &PatchOp) -> Result<(), PatchError> {
    let path = op.path();

    // Whole-root replace is the one operation with an empty path.
    if path.is_empty() {
        return match op {
            PatchOp::Replace { value, .. } => {
                *state = value.clone();
                Ok(())
            }
            _ => Err(PatchError::PathNotFound(format_path(path))),
        };
    }

    let (parent_path, last) = (&path[..path.len() - 1], &path[path.len() - 1]);
    let parent = resolve_mut(state, parent_path, path)?;

    match (op, last) {
        (PatchOp::Add { value, .. }, PathSegment::Key(key)) => {
            let map = parent
                .as_object_mut()
                .ok_or_else(|| PatchError::WrongKind(format_path(path)))?;
            map.insert(key.clone(), value.clone());
            Ok(())
        }
        (PatchOp::Add { value, .. }, PathSegment::Index(index)) => {
            let seq = parent
                .as_array_mut()
                .ok_or_else(|| PatchError::WrongKind(format_path(path)))?;
            if *index > seq.len() {
                return Err(PatchError::IndexOutOfRange(format_path(path)));
            }
            seq.insert(*index, value.clone());
            Ok(())
        }
        (PatchOp::Remove { .. }, PathSegment::Key(key)) => {
            let map = parent
                .as_object_mut()
                .ok_or_else(|| PatchError::WrongKind(format_path(path)))?;
            map.remove(key)
                .map(|_| ())
                .ok_or_else(|| PatchError::PathNotFound(format_path(path)))
        }
        (PatchOp::Remove { .. }, PathSegment::Index(index)) => {
            let seq = parent
                .as_array_mut()
                .ok_or_else(|| PatchError::WrongKind(format_path(path)))?;
            if *index >= seq.len() {
                return Err(PatchError::PathNotFound(format_path(path)));
            }
            seq.remove(*index);
            Ok(())
        }
        (PatchOp::Replace { value, .. }, last) => {
            let slot = child_mut(parent, last)
                .ok_or_else(|| PatchError::PathNotFound(format_path(path)))?;
            *slot = value.clone();
            Ok(())
        }
    }
}

/// Walk `segments` down from `root`, returning the node they name.
/// `full_path` is only used for error rendering.
fn resolve_mut<'a>(
    root: &'a mut Value,
    segments: &[PathSegment],
    full_path: &[PathSegment],
) -> Result<&'a mut Value, PatchError> {
    let mut node = root;
    for segment in segments {
        node = child_mut(node, segment)
            .ok_or_else(|| PatchError::PathNotFound(format_path(full_path)))?;
    }
    Ok(node)
}

fn child_mut<'a>(node: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match segment {
        PathSegment::Key(key) => node.as_object_mut()?.get_mut(key),
        PathSegment::Index(index) => node.as_array_mut()?.get_mut(*index),
    }
}
