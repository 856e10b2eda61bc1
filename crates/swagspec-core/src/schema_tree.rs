//! Nested object-schema construction from flat property declarations
//!
//! `fold` grows an `{type: object, properties: {...}}` tree one declaration
//! at a time. A slash-delimited name (`address/street`) walks or creates the
//! intermediate object nodes; the last segment receives the caller's
//! attributes. `required` and `example` are lifted onto the node that owns
//! the property, so the leaf never carries them.

use serde_json::{Map, Value};

/// Keys consumed into the tree structure instead of being kept on a leaf.
const CONTROL_KEYS: &[&str] = &["name", "mime"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    #[error("property name must not be blank")]
    BlankName,
    #[error("property path '{0}' contains an empty segment")]
    EmptySegment(String),
}

/// Fold one property declaration into `node`, returning the updated tree.
///
/// `node` is taken by value: callers hand over the current tree and get the
/// next one back, so no two declarations ever alias the same map.
///
/// # Errors
///
/// Returns [`AttributeError::BlankName`] for an empty or whitespace-only
/// path and [`AttributeError::EmptySegment`] for paths like `a//b`.
pub fn fold(
    node: Option<Value>,
    path: &str,
    attributes: Map<String, Value>,
) -> Result<Value, AttributeError> {
    let segments = split_path(path)?;
    let mut root = object_node(node);
    graft(&mut root, &segments, attributes);
    Ok(Value::Object(root))
}

fn split_path(path: &str) -> Result<Vec<&str>, AttributeError> {
    if path.trim().is_empty() {
        return Err(AttributeError::BlankName);
    }
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|s| s.trim().is_empty()) {
        return Err(AttributeError::EmptySegment(path.to_string()));
    }
    Ok(segments)
}

/// Coerce `node` into an object schema that owns a `properties` map,
/// keeping whatever it already had.
fn object_node(node: Option<Value>) -> Map<String, Value> {
    let mut map = match node {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    map.entry("type")
        .or_insert_with(|| Value::String("object".to_string()));
    object_slot(map.entry("properties").or_insert(Value::Null));
    map
}

fn object_slot(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced by an object"),
    }
}

fn graft(node: &mut Map<String, Value>, segments: &[&str], attributes: Map<String, Value>) {
    match segments {
        [] => {}
        [leaf] => place_leaf(node, leaf, attributes),
        [head, rest @ ..] => {
            let properties = object_slot(node.entry("properties").or_insert(Value::Null));
            let slot = properties
                .entry(head.to_string())
                .or_insert(Value::Null);
            let mut child = object_node(Some(slot.take()));
            graft(&mut child, rest, attributes);
            *slot = Value::Object(child);
        }
    }
}

fn place_leaf(node: &mut Map<String, Value>, leaf: &str, mut attributes: Map<String, Value>) {
    let required = attributes.shift_remove("required");
    let example = attributes.shift_remove("example");
    for key in CONTROL_KEYS {
        attributes.shift_remove(*key);
    }

    if required == Some(Value::Bool(true)) {
        let slot = node.entry("required").or_insert(Value::Null);
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(names) = slot {
            if !names.iter().any(|n| n.as_str() == Some(leaf)) {
                names.push(Value::String(leaf.to_string()));
            }
        }
    }

    if let Some(example) = example.filter(|e| !e.is_null()) {
        object_slot(node.entry("example").or_insert(Value::Null)).insert(leaf.to_string(), example);
    }

    object_slot(node.entry("properties").or_insert(Value::Null))
        .insert(leaf.to_string(), Value::Object(attributes));
}
