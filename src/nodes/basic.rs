/// Value, arithmetic and text nodes

use super::{number_of, number_value, text_of};
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};

/// dataNode: emits its stored `value`
pub async fn data(inputs: Map<String, Value>) -> Result<Value> {
    Ok(inputs.get("value").cloned().unwrap_or(Value::Null))
}

/// notesNode: appends a note to the upstream text
pub async fn notes(inputs: Map<String, Value>) -> Result<Value> {
    let input = text_of(inputs.get("input"));
    let text = text_of(inputs.get("text"));
    Ok(Value::String(format!("{input}\n\nNote: {text}")))
}

/// sumDiffNode: `{ sum, diff }` of `number1` and `number2`
pub async fn sum_diff(inputs: Map<String, Value>) -> Result<Value> {
    let (Some(a), Some(b)) = (number_of(inputs.get("number1")), number_of(inputs.get("number2"))) else {
        anyhow::bail!("Invalid input: both inputs must be valid numbers");
    };

    Ok(json!({
        "sum": number_value(a + b),
        "diff": number_value(a - b),
    }))
}

/// textReplaceNode: replaces the first occurrence of `searchValue`
///
/// Returns `text` untouched when it or the search value is empty.
pub async fn text_replace(inputs: Map<String, Value>) -> Result<Value> {
    let text = text_of(inputs.get("text"));
    let search = text_of(inputs.get("searchValue"));
    if text.is_empty() || search.is_empty() {
        return Ok(inputs.get("text").cloned().unwrap_or(Value::Null));
    }

    let replacement = text_of(inputs.get("newValue"));
    Ok(Value::String(text.replacen(&search, &replacement, 1)))
}

/// textTemplateNode: fills `$key` placeholders of `template` from `textInputs`
///
/// Each key replaces only its first placeholder.
pub async fn text_template(inputs: Map<String, Value>) -> Result<Value> {
    let mut result = text_of(inputs.get("template"));

    if let Some(Value::Object(text_inputs)) = inputs.get("textInputs") {
        for (key, value) in text_inputs {
            let placeholder = format!("${key}");
            result = result.replacen(&placeholder, &text_of(Some(value)), 1);
        }
    }

    Ok(Value::String(result))
}

/// fileReaderNode: text of an already-loaded `content` or of the file at `path`
pub async fn file_reader(inputs: Map<String, Value>) -> Result<Value> {
    if let Some(Value::String(content)) = inputs.get("content") {
        return Ok(Value::String(content.clone()));
    }

    match inputs.get("path").and_then(Value::as_str) {
        Some(path) if !path.is_empty() => {
            tracing::debug!("📄 Reading file: {}", path);
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read file '{path}'"))?;
            Ok(Value::String(text))
        }
        _ => Ok(Value::String(String::new())),
    }
}
