/// Structural diff between two state trees, and forward/backward replay.
///
/// Mappings and sequences are both handled natively. Sequences are compared
/// index by index: a shared prefix recurses, growth becomes `Add` edits at
/// ascending indices, shrinkage becomes `Delete` edits at descending indices.
/// Reordering shows up as element updates; moves are not detected.
use serde_json::Value;

use crate::error::MalformedEditError;
use crate::operation::{Edit, EditList, EditPath, PathSegment};

/// Computes the edits that turn `old` into `new`.
///
/// Returns `None` when the two values are structurally equal.
pub fn compute(old: &Value, new: &Value) -> Option<EditList> {
    let mut edits = Vec::new();
    diff_values(old, new, &EditPath::root(), &mut edits);
    if edits.is_empty() {
        None
    } else {
        Some(EditList::new(edits))
    }
}

/// Returns a copy of `state` with every edit applied in order.
pub fn apply_forward(state: &Value, edits: &EditList) -> Result<Value, MalformedEditError> {
    let mut working = state.clone();
    apply_forward_in_place(&mut working, edits)?;
    Ok(working)
}

/// Returns a copy of `state` with every edit reverted.
pub fn apply_backward(state: &Value, edits: &EditList) -> Result<Value, MalformedEditError> {
    let mut working = state.clone();
    apply_backward_in_place(&mut working, edits)?;
    Ok(working)
}

/// Applies `edits` in recorded order to a working copy owned by the caller.
pub(crate) fn apply_forward_in_place(
    working: &mut Value,
    edits: &EditList,
) -> Result<(), MalformedEditError> {
    for edit in edits {
        apply_edit(working, edit)?;
    }
    Ok(())
}

/// Applies the inverse of each edit, last edit first.
pub(crate) fn apply_backward_in_place(
    working: &mut Value,
    edits: &EditList,
) -> Result<(), MalformedEditError> {
    for edit in edits.edits().iter().rev() {
        apply_edit(working, &edit.inverse())?;
    }
    Ok(())
}

fn diff_values(old: &Value, new: &Value, path: &EditPath, out: &mut Vec<Edit>) {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            for (key, old_value) in old_map {
                match new_map.get(key) {
                    Some(new_value) => {
                        diff_values(old_value, new_value, &path.child(key.as_str()), out)
                    }
                    None => out.push(Edit::Delete {
                        path: path.child(key.as_str()),
                        old: old_value.clone(),
                    }),
                }
            }
            for (key, new_value) in new_map {
                if !old_map.contains_key(key) {
                    out.push(Edit::Add {
                        path: path.child(key.as_str()),
                        value: new_value.clone(),
                    });
                }
            }
        }
        (Value::Array(old_items), Value::Array(new_items)) => {
            let shared = old_items.len().min(new_items.len());
            for i in 0..shared {
                diff_values(&old_items[i], &new_items[i], &path.child(i), out);
            }
            for (i, value) in new_items.iter().enumerate().skip(shared) {
                out.push(Edit::Add {
                    path: path.child(i),
                    value: value.clone(),
                });
            }
            for i in (shared..old_items.len()).rev() {
                out.push(Edit::Delete {
                    path: path.child(i),
                    old: old_items[i].clone(),
                });
            }
        }
        _ if old == new => {}
        _ => out.push(Edit::Update {
            path: path.clone(),
            old: old.clone(),
            new: new.clone(),
        }),
    }
}

fn apply_edit(root: &mut Value, edit: &Edit) -> Result<(), MalformedEditError> {
    tracing::trace!(path = %edit.path(), kind = ?edit.kind(), "applying edit");
    match edit {
        Edit::Update { path, new, .. } => {
            let slot = resolve_mut(root, path.segments(), path)?;
            *slot = new.clone();
            Ok(())
        }
        Edit::Add { path, value } => {
            let (parent, last) = path
                .split_last()
                .ok_or_else(|| MalformedEditError::new(path, "cannot add at the root"))?;
            match (resolve_mut(root, parent, path)?, last) {
                (Value::Object(map), PathSegment::Key(key)) => {
                    map.insert(key.clone(), value.clone());
                    Ok(())
                }
                (Value::Array(items), PathSegment::Index(i)) if *i <= items.len() => {
                    items.insert(*i, value.clone());
                    Ok(())
                }
                (Value::Array(_), PathSegment::Index(_)) => {
                    Err(MalformedEditError::new(path, "insert index out of range"))
                }
                _ => Err(MalformedEditError::new(path, "container kind mismatch")),
            }
        }
        Edit::Delete { path, .. } => {
            let (parent, last) = path
                .split_last()
                .ok_or_else(|| MalformedEditError::new(path, "cannot delete the root"))?;
            match (resolve_mut(root, parent, path)?, last) {
                (Value::Object(map), PathSegment::Key(key)) => map
                    .remove(key)
                    .map(|_| ())
                    .ok_or_else(|| MalformedEditError::new(path, "key not present")),
                (Value::Array(items), PathSegment::Index(i)) if *i < items.len() => {
                    items.remove(*i);
                    Ok(())
                }
                (Value::Array(_), PathSegment::Index(_)) => {
                    Err(MalformedEditError::new(path, "index out of range"))
                }
                _ => Err(MalformedEditError::new(path, "container kind mismatch")),
            }
        }
    }
}

/// Walks `segments` from `root`. `full` is only used for error reporting.
fn resolve_mut<'a>(
    root: &'a mut Value,
    segments: &[PathSegment],
    full: &EditPath,
) -> Result<&'a mut Value, MalformedEditError> {
    let mut current = root;
    for segment in segments {
        current = match (current, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map
                .get_mut(key)
                .ok_or_else(|| MalformedEditError::new(full, format!("missing key `{key}`")))?,
            (Value::Array(items), PathSegment::Index(i)) => items
                .get_mut(*i)
                .ok_or_else(|| MalformedEditError::new(full, format!("missing index {i}")))?,
            _ => {
                return Err(MalformedEditError::new(
                    full,
                    format!("segment `{segment}` does not match container kind"),
                ))
            }
        };
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::EditKind;
    use serde_json::json;

    fn roundtrip(old: Value, new: Value) -> EditList {
        let edits = compute(&old, &new).expect("values differ");
        assert_eq!(apply_forward(&old, &edits).expect("forward"), new);
        assert_eq!(apply_backward(&new, &edits).expect("backward"), old);
        edits
    }

    #[test]
    fn test_equal_values_produce_no_diff() {
        let state = json!({"a": [1, 2, {"b": null}], "c": "x"});
        assert!(compute(&state, &state.clone()).is_none());
        assert!(compute(&json!([]), &json!([])).is_none());
        assert!(compute(&json!(3), &json!(3)).is_none());
    }

    #[test]
    fn test_object_add_update_delete() {
        let edits = roundtrip(
            json!({"keep": 1, "change": "a", "drop": true}),
            json!({"keep": 1, "change": "b", "new": [1]}),
        );
        let kinds: Vec<EditKind> = edits.iter().map(Edit::kind).collect();
        assert_eq!(kinds.len(), 3);
        assert!(kinds.contains(&EditKind::Add));
        assert!(kinds.contains(&EditKind::Update));
        assert!(kinds.contains(&EditKind::Delete));
    }

    #[test]
    fn test_nested_update_records_leaf_path() {
        let edits = roundtrip(json!({"a": {"b": {"c": 1}}}), json!({"a": {"b": {"c": 2}}}));
        assert_eq!(edits.len(), 1);
        assert_eq!(edits.edits()[0].path().to_string(), "/a/b/c");
    }

    #[test]
    fn test_sequence_state_without_wrapping() {
        let edits = roundtrip(json!([1, 2]), json!([1, 5, 6, 7]));
        assert_eq!(edits.edits()[0].path().to_string(), "/1");
        assert_eq!(edits.edits()[1].path().to_string(), "/2");
        assert_eq!(edits.edits()[2].path().to_string(), "/3");
    }

    #[test]
    fn test_sequence_shrink_deletes_from_tail() {
        let edits = roundtrip(json!(["a", "b", "c", "d"]), json!(["a"]));
        let paths: Vec<String> = edits.iter().map(|e| e.path().to_string()).collect();
        assert_eq!(paths, vec!["/3", "/2", "/1"]);
    }

    #[test]
    fn test_sequence_reorder_is_element_updates() {
        let edits = roundtrip(json!([1, 2, 3]), json!([3, 2, 1]));
        assert!(edits.iter().all(|e| e.kind() == EditKind::Update));
    }

    #[test]
    fn test_type_change_is_single_update() {
        let edits = roundtrip(json!({"a": {"x": 1}}), json!({"a": [1]}));
        assert_eq!(edits.len(), 1);
        assert_eq!(edits.edits()[0].kind(), EditKind::Update);

        let edits = roundtrip(json!({"x": 1}), json!([1]));
        assert!(edits.edits()[0].path().is_root());
    }

    #[test]
    fn test_apply_does_not_mutate_input() {
        let old = json!({"a": 1});
        let new = json!({"a": 2});
        let edits = compute(&old, &new).expect("diff");
        let _ = apply_forward(&old, &edits).expect("forward");
        assert_eq!(old, json!({"a": 1}));
    }

    #[test]
    fn test_missing_path_is_malformed() {
        let edits = compute(&json!({"a": {"b": 1}}), &json!({"a": {"b": 2}})).expect("diff");
        let err = apply_forward(&json!({"z": 0}), &edits).unwrap_err();
        assert_eq!(err.path, "/a/b");
        assert!(err.reason.contains("missing key"));
    }

    #[test]
    fn test_kind_mismatch_is_malformed() {
        let edits = compute(&json!([1]), &json!([1, 2])).expect("diff");
        let err = apply_forward(&json!({"0": 1}), &edits).unwrap_err();
        assert_eq!(err.reason, "container kind mismatch");
    }

    #[test]
    fn test_insert_past_end_is_malformed() {
        let edits = EditList::new(vec![Edit::Add {
            path: EditPath::root().child(5usize),
            value: json!(1),
        }]);
        let err = apply_forward(&json!([]), &edits).unwrap_err();
        assert_eq!(err.reason, "insert index out of range");
    }

    #[test]
    fn test_delete_root_is_malformed() {
        let edits = EditList::new(vec![Edit::Delete {
            path: EditPath::root(),
            old: json!({}),
        }]);
        assert!(apply_forward(&json!({}), &edits).is_err());
    }
}
