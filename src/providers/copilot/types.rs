use serde::Deserialize;
use serde_json::Value;

/// One line of a Copilot CLI event log (`~/.copilot/session-state/*.jsonl`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopilotEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
    pub id: String,
    pub timestamp: String,
    pub parent_id: Option<String>,
}

/// A tool call announced inside `assistant.message`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRequest {
    pub tool_call_id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Event types that only carry session state
pub const STATE_EVENTS: &[&str] = &[
    "session.start",
    "session.model_change",
    "session.info",
    "session.error",
    "session.truncation",
    "assistant.turn_start",
    "assistant.turn_end",
];

/// Event types the converter understands, used for format detection
pub const KNOWN_EVENTS: &[&str] = &[
    "session.start",
    "session.model_change",
    "session.info",
    "user.message",
    "assistant.message",
    "assistant.reasoning",
    "tool.execution_start",
    "tool.execution_complete",
];

impl CopilotEvent {
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }
}

/// Tool arguments may arrive as a JSON-encoded string
pub fn decode_arguments(arguments: &Value) -> Value {
    match arguments {
        Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone())),
        other => other.clone(),
    }
}
