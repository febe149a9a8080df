/// Input resolution
///
/// Builds the input object a node's computation receives: the node's stored
/// data overlaid with the outputs carried by its incoming edges.

use crate::runtime::error::EngineError;
use crate::workflow::types::{Edge, Node};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Resolve the inputs of `node`
///
/// Starts from a shallow copy of `node.data`. Each incoming edge writes its
/// source's output at `edge.data.path` when set, else under its target handle.
/// An upstream node that was skipped or produced nothing contributes `null`.
///
/// When several edges write the same key or path the last edge in `incoming`
/// wins. That order follows the editor's edge list and is not meaningful.
pub fn resolve_inputs(
    node: &Node,
    incoming: &[Edge],
    outputs: &HashMap<String, Value>,
) -> Result<Map<String, Value>, EngineError> {
    let mut inputs = node.data.clone();

    for edge in incoming {
        let handle = edge
            .target_handle
            .as_deref()
            .ok_or_else(|| EngineError::MissingTargetHandle {
                edge_id: edge.id.clone(),
            })?;

        let value = outputs.get(&edge.source).cloned().unwrap_or(Value::Null);

        match edge.path() {
            Some(path) => {
                tracing::debug!("Edge '{}' writes '{}' into {}.{}", edge.id, edge.source, node.id, path);
                set_nested_value(&mut inputs, path, value);
            }
            None => {
                tracing::debug!("Edge '{}' writes '{}' into {}.{}", edge.id, edge.source, node.id, handle);
                inputs.insert(handle.to_string(), value);
            }
        }
    }

    Ok(inputs)
}

/// Write `value` at a dot-separated `path`, creating intermediate objects
///
/// An intermediate segment that is missing or holds a non-object value is
/// replaced by an empty object. Sibling keys are left untouched.
pub fn set_nested_value(target: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return;
    };

    let mut current = target;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(map) = slot else {
            return;
        };
        current = map;
    }

    current.insert(last.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outputs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn handle_overrides_default_data() {
        let node = Node::new("n", "sumDiffNode", json!({ "a": 1, "b": 2 }));
        let incoming = vec![Edge::new("e1", "src", "n", "a")];

        let inputs = resolve_inputs(&node, &incoming, &outputs(&[("src", json!(99))])).unwrap();
        assert_eq!(Value::Object(inputs), json!({ "a": 99, "b": 2 }));
    }

    #[test]
    fn path_writes_nested_without_dropping_keys() {
        let node = Node::new("n", "textTemplateNode", json!({ "a": 1, "nested": { "y": 2 } }));
        let incoming = vec![Edge::new("e1", "src", "n", "x").with_path("nested.x")];

        let inputs = resolve_inputs(&node, &incoming, &outputs(&[("src", json!(7))])).unwrap();
        assert_eq!(
            Value::Object(inputs),
            json!({ "a": 1, "nested": { "x": 7, "y": 2 } })
        );
    }

    #[test]
    fn missing_upstream_output_is_null() {
        let node = Node::new("n", "notesNode", json!({ "text": "hi" }));
        let incoming = vec![Edge::new("e1", "skipped", "n", "input")];

        let inputs = resolve_inputs(&node, &incoming, &HashMap::new()).unwrap();
        assert_eq!(inputs["input"], Value::Null);
        assert_eq!(inputs["text"], json!("hi"));
    }

    #[test]
    fn last_edge_wins_on_collision() {
        let node = Node::new("n", "notesNode", json!({}));
        let incoming = vec![
            Edge::new("e1", "first", "n", "text"),
            Edge::new("e2", "second", "n", "text"),
        ];

        let inputs = resolve_inputs(
            &node,
            &incoming,
            &outputs(&[("first", json!("one")), ("second", json!("two"))]),
        )
        .unwrap();
        assert_eq!(inputs["text"], json!("two"));
    }

    #[test]
    fn edge_without_handle_is_rejected() {
        let node = Node::new("n", "notesNode", json!({}));
        let mut edge = Edge::new("bad", "src", "n", "text");
        edge.target_handle = None;

        let err = resolve_inputs(&node, &[edge], &HashMap::new()).unwrap_err();
        assert!(matches!(err, EngineError::MissingTargetHandle { edge_id } if edge_id == "bad"));
    }

    #[test]
    fn non_object_intermediate_is_replaced() {
        let mut target = json!({ "a": "scalar", "keep": true }).as_object().cloned().unwrap();
        set_nested_value(&mut target, "a.b.c", json!(1));
        assert_eq!(
            Value::Object(target),
            json!({ "a": { "b": { "c": 1 } }, "keep": true })
        );
    }
}
