//! Edits on a JSON tree addressed by path segments.
//!
//! Follows real-time database semantics: writing null deletes, and a node
//! left without children disappears.

use serde_json::{Map, Value};

/// The node at `path`, or `None` when nothing is stored there.
pub fn get<'a>(tree: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut node = tree;
    for segment in path {
        node = node.as_object()?.get(*segment)?;
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

/// Replaces the node at `path`. A null value removes it.
pub fn set(tree: &mut Value, path: &[&str], value: Value) {
    if value.is_null() {
        remove(tree, path);
        return;
    }
    let Some((first, rest)) = path.split_first() else {
        *tree = value;
        return;
    };
    if !tree.is_object() {
        *tree = Value::Object(Map::new());
    }
    if let Value::Object(map) = tree {
        let child = map.entry(first.to_string()).or_insert(Value::Null);
        set(child, rest, value);
    }
}

/// Removes the node at `path`, pruning parents left empty.
pub fn remove(tree: &mut Value, path: &[&str]) {
    let Some((first, rest)) = path.split_first() else {
        *tree = Value::Null;
        return;
    };

    let mut now_empty = false;
    if let Value::Object(map) = tree {
        if rest.is_empty() {
            map.remove(*first);
        } else if let Some(child) = map.get_mut(*first) {
            remove(child, rest);
            if child.is_null() {
                map.remove(*first);
            }
        }
        now_empty = map.is_empty();
    }
    if now_empty {
        *tree = Value::Null;
    }
}

/// Sets each child of `changes` beneath `path`, leaving siblings alone.
pub fn merge(tree: &mut Value, path: &[&str], changes: Map<String, Value>) {
    for (key, value) in changes {
        let mut child_path = path.to_vec();
        child_path.extend(key.split('/').filter(|s| !s.is_empty()));
        set(tree, &child_path, value);
    }
}
