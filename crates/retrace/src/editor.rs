/// Built-in JSON document editor used as the replayed transition function.
///
/// `SET`, `REMOVE` and `PUSH` address the document with slash paths such as
/// `/items/0/title`; `/` (or an empty path) is the whole document.
use serde::Deserialize;
use serde_json::Value;

use retrace_mod_history::{Input, State};

pub const SET: &str = "SET";
pub const REMOVE: &str = "REMOVE";
pub const PUSH: &str = "PUSH";

#[derive(Debug, Deserialize)]
struct EditRequest {
    path: String,
    #[serde(default)]
    value: Value,
}

/// Returns a transition function whose initial state is `initial`.
pub fn document_editor(initial: Value) -> impl Fn(Option<&State>, Option<&Input>) -> State {
    move |state: Option<&State>, input: Option<&Input>| {
        let current = state.unwrap_or(&initial);
        match input {
            Some(input) => apply(current, input),
            None => current.clone(),
        }
    }
}

/// Applies one input to `state`. Inputs that cannot be applied leave the
/// state unchanged.
pub fn apply(state: &State, input: &Input) -> State {
    let mut next = state.clone();
    let request = match input.trigger.as_str() {
        SET | REMOVE | PUSH => input
            .payload
            .clone()
            .map(serde_json::from_value::<EditRequest>),
        _ => return next,
    };
    let request = match request {
        Some(Ok(request)) => request,
        Some(Err(e)) => {
            tracing::warn!(trigger = %input.trigger, "Ignoring malformed payload: {e}");
            return next;
        }
        None => {
            tracing::warn!(trigger = %input.trigger, "Ignoring input without payload");
            return next;
        }
    };

    let applied = match input.trigger.as_str() {
        SET => set(&mut next, &request.path, request.value),
        REMOVE => remove(&mut next, &request.path),
        _ => push(&mut next, &request.path, request.value),
    };
    if applied {
        next
    } else {
        tracing::warn!(trigger = %input.trigger, path = %request.path, "Path not applicable; state unchanged");
        state.clone()
    }
}

/// Splits `/a/b/c` into the parent pointer `/a/b` and the last token `c`.
/// Returns `None` for the root path.
fn split_path(path: &str) -> Option<(&str, String)> {
    if path.is_empty() || path == "/" {
        return None;
    }
    let idx = path.rfind('/')?;
    let token = path[idx + 1..].replace("~1", "/").replace("~0", "~");
    Some((&path[..idx], token))
}

fn set(doc: &mut Value, path: &str, value: Value) -> bool {
    let Some((parent, token)) = split_path(path) else {
        *doc = value;
        return true;
    };
    match doc.pointer_mut(parent) {
        Some(Value::Object(map)) => {
            map.insert(token, value);
            true
        }
        Some(Value::Array(items)) => match token.parse::<usize>() {
            Ok(i) if i < items.len() => {
                items[i] = value;
                true
            }
            Ok(i) if i == items.len() => {
                items.push(value);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

fn remove(doc: &mut Value, path: &str) -> bool {
    let Some((parent, token)) = split_path(path) else {
        return false;
    };
    match doc.pointer_mut(parent) {
        Some(Value::Object(map)) => map.remove(&token).is_some(),
        Some(Value::Array(items)) => match token.parse::<usize>() {
            Ok(i) if i < items.len() => {
                items.remove(i);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

fn push(doc: &mut Value, path: &str, value: Value) -> bool {
    let target = if path == "/" { Some(doc) } else { doc.pointer_mut(path) };
    match target {
        Some(Value::Array(items)) => {
            items.push(value);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(state: Value, trigger: &str, payload: Value) -> Value {
        apply(&state, &Input::with_payload(trigger, payload))
    }

    #[test]
    fn test_set_object_key() {
        let s = run(json!({"a": 1}), SET, json!({"path": "/b", "value": [1]}));
        assert_eq!(s, json!({"a": 1, "b": [1]}));
    }

    #[test]
    fn test_set_nested_array_index() {
        let s = run(json!({"a": [1, 2]}), SET, json!({"path": "/a/1", "value": 9}));
        assert_eq!(s, json!({"a": [1, 9]}));
        let s = run(s, SET, json!({"path": "/a/2", "value": 3}));
        assert_eq!(s, json!({"a": [1, 9, 3]}));
    }

    #[test]
    fn test_set_root_replaces_document() {
        let s = run(json!({"a": 1}), SET, json!({"path": "/", "value": "x"}));
        assert_eq!(s, json!("x"));
    }

    #[test]
    fn test_set_escaped_key() {
        let s = run(json!({}), SET, json!({"path": "/a~1b", "value": 1}));
        assert_eq!(s, json!({"a/b": 1}));
    }

    #[test]
    fn test_remove() {
        let s = run(json!({"a": [1, 2, 3], "b": 0}), REMOVE, json!({"path": "/a/0"}));
        assert_eq!(s, json!({"a": [2, 3], "b": 0}));
        let s = run(s, REMOVE, json!({"path": "/b"}));
        assert_eq!(s, json!({"a": [2, 3]}));
    }

    #[test]
    fn test_push() {
        let s = run(json!({"a": []}), PUSH, json!({"path": "/a", "value": {"x": 1}}));
        assert_eq!(s, json!({"a": [{"x": 1}]}));
        let s = run(json!([]), PUSH, json!({"path": "/", "value": 1}));
        assert_eq!(s, json!([1]));
    }

    #[test]
    fn test_inapplicable_inputs_leave_state_unchanged() {
        let state = json!({"a": [1]});
        assert_eq!(run(state.clone(), SET, json!({"path": "/a/5", "value": 0})), state);
        assert_eq!(run(state.clone(), REMOVE, json!({"path": "/missing"})), state);
        assert_eq!(run(state.clone(), REMOVE, json!({"path": "/"})), state);
        assert_eq!(run(state.clone(), PUSH, json!({"path": "/x", "value": 0})), state);
        assert_eq!(run(state.clone(), SET, json!("not an object")), state);
        assert_eq!(run(state.clone(), "OTHER", json!(null)), state);
        assert_eq!(apply(&state, &Input::new(SET)), state);
    }

    #[test]
    fn test_document_editor_bootstraps_from_initial() {
        let editor = document_editor(json!({"seed": true}));
        assert_eq!(editor(None, None), json!({"seed": true}));
        let current = json!({"n": 1});
        assert_eq!(editor(Some(&current), None), current);
    }
}
