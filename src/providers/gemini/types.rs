use serde::Deserialize;
use serde_json::Value;

/// Gemini CLI session document (`~/.gemini/tmp/<projectHash>/chats/session-*.json`)
///
/// Messages are kept as raw values so a malformed entry only loses itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiSession {
    pub session_id: Option<String>,
    pub project_hash: Option<String>,
    pub start_time: Option<String>,
    #[serde(default)]
    pub messages: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiMessage {
    pub id: String,
    pub timestamp: String,

    #[serde(rename = "type")]
    pub message_type: String, // "user", "gemini", "info", "error"

    /// Plain string, or an array of `{text}` parts
    #[serde(default)]
    pub content: Value,

    pub tool_calls: Option<Vec<ToolCall>>,

    pub thoughts: Option<Vec<Thought>>,

    pub tokens: Option<GeminiTokens>,

    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: Option<Value>,
    /// Array of `functionResponse` parts
    pub result: Option<Value>,
    pub status: Option<String>,
    pub result_display: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thought {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeminiTokens {
    pub input: Option<u64>,
    pub output: Option<u64>,
    pub cached: Option<u64>,
    pub thoughts: Option<u64>,
    pub tool: Option<u64>,
}

impl GeminiMessage {
    /// Text content, joining text parts when content is an array
    pub fn text(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            Value::Array(parts) => parts
                .iter()
                .filter_map(|p| p.as_str().or_else(|| p.get("text").and_then(|t| t.as_str())))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => String::new(),
        }
    }
}

impl Thought {
    pub fn render(&self) -> String {
        match (self.subject.trim(), self.description.trim()) {
            ("", description) => description.to_string(),
            (subject, "") => subject.to_string(),
            (subject, description) => format!("{}: {}", subject, description),
        }
    }
}
