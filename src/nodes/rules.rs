/// Rule checking and gating
///
/// `ruleCheckerNode` evaluates a list of conditions against its own inputs;
/// `ruleGateNode` emits the boolean the engine uses to open or close the
/// subtree nested under it.

use super::{number_of, text_of};
use anyhow::Result;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One comparison between two named inputs
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub left_id: String,
    /// Missing or unknown operators make the condition false
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub right_id: String,
}

/// ruleCheckerNode: `true` when every condition holds
///
/// A missing or empty condition list passes.
pub async fn check_rules(inputs: Map<String, Value>) -> Result<Value> {
    let conditions: Vec<Condition> = match inputs.get("conditions") {
        None | Some(Value::Null) => Vec::new(),
        Some(raw) => serde_json::from_value(raw.clone())?,
    };

    let passed = conditions.iter().all(|condition| evaluate(condition, &inputs));
    tracing::debug!("Checked {} conditions: {}", conditions.len(), passed);
    Ok(Value::Bool(passed))
}

/// ruleGateNode: the wired `condition` when boolean, else `isEnabled`
pub async fn gate(inputs: Map<String, Value>) -> Result<Value> {
    let open = inputs
        .get("condition")
        .and_then(Value::as_bool)
        .or_else(|| inputs.get("isEnabled").and_then(Value::as_bool))
        .unwrap_or(true);
    Ok(Value::Bool(open))
}

/// Evaluate a single condition; unknown operators never hold
pub fn evaluate(condition: &Condition, inputs: &Map<String, Value>) -> bool {
    let left = inputs.get(&condition.left_id);
    let right = inputs.get(&condition.right_id);

    match condition.operator.as_str() {
        "isEmpty" => emptiness(left) == Some(true),
        "isNotEmpty" => emptiness(left) == Some(false),

        "isEqualTo" => left == right,
        "isNotEqualTo" => left != right,
        "contains" => contains(left, right),
        "doesNotContain" => !contains(left, right),
        "startsWith" => text_of(left).starts_with(&text_of(right)),
        "endsWith" => text_of(left).ends_with(&text_of(right)),

        "isGreaterThan" => compare(left, right, |a, b| a > b),
        "isLessThan" => compare(left, right, |a, b| a < b),
        "isGreaterThanOrEqualTo" => compare(left, right, |a, b| a >= b),
        "isLessThanOrEqualTo" => compare(left, right, |a, b| a <= b),

        "hasLength" => match (left, number_of(right)) {
            (Some(Value::Array(items)), Some(len)) => items.len() as f64 == len,
            _ => false,
        },

        "hasKey" => lookup(left, right).is_some(),
        "doesNotHaveKey" => is_collection(left) && lookup(left, right).is_none(),
        "hasValueForKey" => lookup(left, right).is_some_and(|v| !v.is_null()),
        "doesNotHaveValueForKey" => is_collection(left) && lookup(left, right).map_or(true, Value::is_null),

        other => {
            tracing::debug!("Unknown rule operator '{}'", other);
            false
        }
    }
}

/// `Some(is_empty)` for strings, arrays and objects; `None` otherwise
fn emptiness(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::String(s) => Some(s.is_empty()),
        Value::Array(items) => Some(items.is_empty()),
        Value::Object(map) => Some(map.is_empty()),
        _ => None,
    }
}

/// Array membership for lists, substring test for everything else
///
/// Lists are not stringified first, so `[12]` does not contain `"1"`.
fn contains(left: Option<&Value>, right: Option<&Value>) -> bool {
    match left {
        Some(Value::Array(items)) => items.contains(right.unwrap_or(&Value::Null)),
        _ => text_of(left).contains(&text_of(right)),
    }
}

fn compare(left: Option<&Value>, right: Option<&Value>, op: impl Fn(f64, f64) -> bool) -> bool {
    match (number_of(left), number_of(right)) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

fn is_collection(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Object(_) | Value::Array(_)))
}

/// Member of an object by key, or of an array by index
fn lookup<'a>(collection: Option<&'a Value>, key: Option<&Value>) -> Option<&'a Value> {
    let key = text_of(key);
    match collection? {
        Value::Object(map) => map.get(&key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
