//! Datalog attribute access: `attr(N, K, V)` and
//! `attr_edge(S, D, T, K, V)` -- exact-match and nested-path lookup over
//! node/edge metadata, needed only for ENRICHMENT-phase guarantee rules.
//! Free functions, not trait methods: no state, no store access, keep the
//! evaluator's surface area narrow.

use serde_json::Value;

use crate::domain::{Edge, Node};

/// A bound Datalog variable value. Leaves are converted to this rather
/// than left as `serde_json::Value` so callers never need to re-parse a
/// stringified primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Str(s) => write!(f, "{s}"),
            AttrValue::Num(n) => write!(f, "{n}"),
            AttrValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

fn primitive_to_attr(value: &Value) -> Option<AttrValue> {
    match value {
        Value::String(s) => Some(AttrValue::Str(s.clone())),
        Value::Number(n) => n.as_f64().map(AttrValue::Num),
        Value::Bool(b) => Some(AttrValue::Bool(*b)),
        _ => None,
    }
}

/// Split `key` into path segments, failing (returning `None`) if any
/// segment is empty -- leading, trailing, or doubled `.`.
fn split_path(key: &str) -> Option<Vec<&str>> {
    if !key.contains('.') {
        return None;
    }
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

fn walk_path<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = current.as_object()?.get(*segment)?;
    }
    Some(current)
}

/// Core lookup shared by `attr` and `attr_edge`: exact key first, nested
/// path fallback, no serialization of non-primitive leaves.
fn lookup(metadata: &serde_json::Map<String, Value>, key: &str) -> Option<AttrValue> {
    if let Some(value) = metadata.get(key) {
        if let Some(attr) = primitive_to_attr(value) {
            return Some(attr);
        }
        // Exact key exists but its value is non-primitive: the exact-match
        // step only binds when the match is itself a primitive, so fall
        // through to the nested-path attempt below rather than returning early.
    }

    let segments = split_path(key)?;
    let root = Value::Object(metadata.clone());
    let leaf = walk_path(&root, &segments)?;
    primitive_to_attr(leaf)
}

/// `attr(N, K, V)`: look up `K` in `node`'s metadata.
pub fn attr(node: &Node, key: &str) -> Option<AttrValue> {
    lookup(&node.metadata, key)
}

/// `attr_edge(S, D, T, K, V)`: look up `K` in `edge`'s metadata, the same
/// rules applied to the matching edge.
pub fn attr_edge(edge: &Edge, key: &str) -> Option<AttrValue> {
    lookup(&edge.metadata, key)
}
