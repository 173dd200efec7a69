//! Recursive structural comparison producing a minimal ordered edit script.

use serde_json::Value;

use crate::path::PathSegment;
use crate::PatchOp;

/// Compute the ordered edit script transforming `previous` into `current`.
///
/// Returns an empty vector when the two trees are structurally equal.
/// Applying the result to `previous` with [`crate::apply_patch`] reproduces
/// `current` exactly.
pub fn diff(previous: &Value, current: &Value) -> Vec<PatchOp> {
    let mut ops = Vec::new();
    diff_value(previous, current, &mut Vec::new(), &mut ops);
    ops
}

fn diff_value(
    previous: &Value,
    current: &Value,
    path: &mut Vec<PathSegment>,
    ops: &mut Vec<PatchOp>,
) {
    match (previous, current) {
        (Value::Object(prev), Value::Object(curr)) => {
            // Removed keys first; map removals never shift other entries.
            for key in prev.keys() {
                if !curr.contains_key(key) {
                    path.push(PathSegment::Key(key.clone()));
                    ops.push(PatchOp::Remove { path: path.clone() });
                    path.pop();
                }
            }
            for (key, curr_child) in curr {
                path.push(PathSegment::Key(key.clone()));
                match prev.get(key) {
                    None => ops.push(PatchOp::Add {
                        path: path.clone(),
                        value: curr_child.clone(),
                    }),
                    Some(prev_child) => diff_value(prev_child, curr_child, path, ops),
                }
                path.pop();
            }
        }
        (Value::Array(prev), Value::Array(curr)) => {
            let common = prev.len().min(curr.len());
            for index in 0..common {
                path.push(PathSegment::Index(index));
                diff_value(&prev[index], &curr[index], path, ops);
                path.pop();
            }
            // Grown tail: adds in increasing index order (each lands at the
            // then-current end).
            for (index, value) in curr.iter().enumerate().skip(common) {
                path.push(PathSegment::Index(index));
                ops.push(PatchOp::Add {
                    path: path.clone(),
                    value: value.clone(),
                });
                path.pop();
            }
            // Shrunk tail: removes from the highest index down so earlier
            // removes never shift later targets.
            for index in (common..prev.len()).rev() {
                path.push(PathSegment::Index(index));
                ops.push(PatchOp::Remove { path: path.clone() });
                path.pop();
            }
        }
        // Mismatched container kinds or differing leaves: one replace of
        // the whole subtree. Equal leaves produce nothing.
        (prev, curr) => {
            if prev != curr {
                ops.push(PatchOp::Replace {
                    path: path.clone(),
                    value: curr.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply_patch;
    use serde_json::json;

    fn round_trip(a: &Value, b: &Value) {
        let patch = diff(a, b);
        let mut state = a.clone();
        apply_patch(&mut state, &patch).unwrap();
        assert_eq!(&state, b, "patch {patch:?} did not reproduce target");
    }

    #[test]
    fn equal_trees_produce_empty_patch() {
        let state = json!({"players": {"h": {"x": 1}}, "food": [1, 2, 3]});
        assert!(diff(&state, &state).is_empty());
        assert!(diff(&Value::Null, &Value::Null).is_empty());
    }

    #[test]
    fn changed_leaf_is_a_single_replace() {
        let a = json!({"players": {"h": {"x": 100, "y": 200}}});
        let b = json!({"players": {"h": {"x": 150, "y": 200}}});
        let patch = diff(&a, &b);
        assert_eq!(patch.len(), 1);
        assert!(matches!(&patch[0], PatchOp::Replace { value, .. } if value == &json!(150)));
        round_trip(&a, &b);
    }

    #[test]
    fn added_and_removed_keys() {
        let a = json!({"keep": 1, "drop": 2});
        let b = json!({"keep": 1, "new": 3});
        let patch = diff(&a, &b);
        assert_eq!(patch.len(), 2);
        assert!(patch.iter().any(|op| matches!(op, PatchOp::Remove { .. })));
        assert!(patch.iter().any(|op| matches!(op, PatchOp::Add { .. })));
        round_trip(&a, &b);
    }

    #[test]
    fn array_growth_and_shrink() {
        let a = json!([1, 2]);
        let b = json!([1, 2, 3, 4]);
        round_trip(&a, &b);
        round_trip(&b, &a);
        round_trip(&json!([]), &b);
        round_trip(&b, &json!([]));
    }

    #[test]
    fn middle_insert_cascades_per_index() {
        // Index-based comparison: inserting in the middle is represented as
        // per-index replaces plus one tail add, never a splice.
        let a = json!([10, 20, 30]);
        let b = json!([10, 15, 20, 30]);
        let patch = diff(&a, &b);
        let replaces = patch
            .iter()
            .filter(|op| matches!(op, PatchOp::Replace { .. }))
            .count();
        let adds = patch
            .iter()
            .filter(|op| matches!(op, PatchOp::Add { .. }))
            .count();
        assert_eq!(replaces, 2);
        assert_eq!(adds, 1);
        round_trip(&a, &b);
    }

    #[test]
    fn container_to_primitive_is_one_whole_subtree_replace() {
        let a = json!({"slot": {"nested": [1, 2, 3]}});
        let b = json!({"slot": 7});
        let patch = diff(&a, &b);
        assert_eq!(patch.len(), 1);
        assert!(matches!(&patch[0], PatchOp::Replace { value, .. } if value == &json!(7)));
        round_trip(&a, &b);
        round_trip(&b, &a);
    }

    #[test]
    fn object_to_array_is_one_replace() {
        let a = json!({"slot": {"a": 1}});
        let b = json!({"slot": [1]});
        assert_eq!(diff(&a, &b).len(), 1);
        round_trip(&a, &b);
    }

    #[test]
    fn root_type_change_replaces_root() {
        let a = json!({"a": 1});
        let b = json!(42);
        let patch = diff(&a, &b);
        assert_eq!(patch.len(), 1);
        assert!(patch[0].path().is_empty());
        round_trip(&a, &b);
    }

    #[test]
    fn deep_nested_round_trips() {
        let a = json!({
            "players": {
                "h": {"x": 0, "y": 0, "score": 0, "inventory": ["axe"]},
                "c": {"x": 5, "y": 5, "score": 2, "inventory": []}
            },
            "food": [{"x": 1, "y": 2}, {"x": 3, "y": 4}],
            "round": 1
        });
        let b = json!({
            "players": {
                "h": {"x": 150, "y": 250, "score": 0, "inventory": ["axe", "torch"]},
                "c": {"x": 5, "y": 5, "score": 3, "inventory": []}
            },
            "food": [{"x": 1, "y": 2}],
            "round": 2,
            "winner": null
        });
        round_trip(&a, &b);
        round_trip(&b, &a);
    }

    #[test]
    fn null_transitions_round_trip() {
        round_trip(&json!({"w": null}), &json!({"w": "h"}));
        round_trip(&json!({"w": "h"}), &json!({"w": null}));
    }
}
