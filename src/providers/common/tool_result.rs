use serde_json::Value;

/// Flatten a provider-native tool result into one string
///
/// Strings pass through. Arrays are flattened fragment by fragment, in
/// order, and joined with newlines. Objects contribute their `text`,
/// `content` or `output` field when present, otherwise they are rendered as
/// compact JSON so no information is dropped.
pub fn flatten_tool_result(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items
            .iter()
            .map(flatten_tool_result)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => {
            if let Some(kind) = map.get("type").and_then(|t| t.as_str()) {
                if kind == "image" {
                    return "[image]".to_string();
                }
            }
            for key in ["text", "content", "output"] {
                if let Some(inner) = map.get(key) {
                    return flatten_tool_result(inner);
                }
            }
            value.to_string()
        }
    }
}

/// Substitute the configured placeholder for empty output
pub fn or_placeholder(content: String, placeholder: &str) -> String {
    if content.trim().is_empty() {
        placeholder.to_string()
    } else {
        content
    }
}
