/// Built-in node computations
///
/// One computation per editor node type, registered under the type name the
/// editor stores in `Node::node_type`:
/// - Value and text nodes (dataNode, notesNode, sumDiffNode, textReplaceNode,
///   textTemplateNode, fileReaderNode)
/// - Rule nodes (ruleCheckerNode, ruleGateNode)
/// - LLM prompt node (promptLLMNode)

use crate::config::NodesConfig;
use crate::runtime::executor::NodeRegistry;
use crate::workflow::types::GATE_NODE_TYPE;
use serde_json::Value;

// Plain value, arithmetic and text computations
pub mod basic;

// Condition evaluation and gating
pub mod rules;

// Chat-completion prompt node
pub mod llm;

pub use llm::PromptLlm;

impl NodeRegistry {
    /// Registry holding every built-in node type
    pub fn with_builtins(config: &NodesConfig) -> Self {
        let mut registry = Self::new();
        registry
            .register("dataNode", basic::data)
            .register("notesNode", basic::notes)
            .register("sumDiffNode", basic::sum_diff)
            .register("textReplaceNode", basic::text_replace)
            .register("textTemplateNode", basic::text_template)
            .register("fileReaderNode", basic::file_reader)
            .register("ruleCheckerNode", rules::check_rules)
            .register(GATE_NODE_TYPE, rules::gate)
            .register("promptLLMNode", PromptLlm::new(config));

        tracing::debug!("Registered built-in node types: {:?}", registry.types());
        registry
    }
}

/// Text form of an input value
///
/// Strings are taken verbatim, `null` becomes empty, anything else is its
/// JSON rendering.
pub(crate) fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Numeric form of an input value; `None` when it is not a finite number
///
/// Rejects "NaN", "inf" and "infinity", which `f64::from_str` would accept.
pub(crate) fn number_of(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// JSON number for `n`, integral when it has no fractional part
pub(crate) fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nodes_config() -> NodesConfig {
        NodesConfig {
            llm_api_url: "http://127.0.0.1:9/v1/chat/completions".into(),
            llm_model: "test-model".into(),
            llm_api_key: None,
        }
    }

    #[test]
    fn builtins_cover_editor_types() {
        let registry = NodeRegistry::with_builtins(&nodes_config());
        assert_eq!(
            registry.types(),
            vec![
                "dataNode",
                "fileReaderNode",
                "notesNode",
                "promptLLMNode",
                "ruleCheckerNode",
                "ruleGateNode",
                "sumDiffNode",
                "textReplaceNode",
                "textTemplateNode",
            ]
        );
    }

    #[test]
    fn coercions() {
        assert_eq!(text_of(Some(&json!("a"))), "a");
        assert_eq!(text_of(Some(&json!(null))), "");
        assert_eq!(text_of(None), "");
        assert_eq!(text_of(Some(&json!(12))), "12");

        assert_eq!(number_of(Some(&json!(" 4.5 "))), Some(4.5));
        assert_eq!(number_of(Some(&json!(3))), Some(3.0));
        assert_eq!(number_of(Some(&json!("x"))), None);
        assert_eq!(number_of(Some(&json!(true))), None);
        assert_eq!(number_of(Some(&json!("NaN"))), None);
        assert_eq!(number_of(Some(&json!("-infinity"))), None);

        assert_eq!(number_value(3.0), json!(3));
        assert_eq!(number_value(-0.5), json!(-0.5));
    }
}
