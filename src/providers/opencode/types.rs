use serde::Deserialize;
use serde_json::Value;

/// One entry of OpenCode's aggregated session JSONL
///
/// OpenCode stores sessions as separate message and part files; the export
/// step aggregates them into one line per message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCodeEntry {
    pub session_id: Option<String>,
    /// RFC 3339 string or epoch milliseconds
    pub timestamp: Value,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub message: OpenCodeMessage,
    pub cwd: Option<String>,
    pub tokens: Option<OpenCodeTokens>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCodeMessage {
    pub role: String,
    #[serde(default)]
    pub content: Vec<OpenCodePart>,
    #[serde(alias = "modelID")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenCodePart {
    Text {
        text: String,
    },
    Reasoning {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        #[serde(alias = "toolUseId")]
        tool_use_id: String,
        #[serde(default)]
        content: Value,
        #[serde(alias = "isError")]
        is_error: Option<bool>,
    },
    File {
        #[serde(default)]
        filename: String,
        #[serde(default)]
        mime: String,
        #[serde(default)]
        url: String,
    },
    Patch {
        #[serde(default)]
        files: Vec<String>,
        #[serde(default)]
        hash: String,
    },
    #[serde(other)]
    Unknown,
}

/// OpenCode's per-message token block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenCodeTokens {
    pub input: Option<u64>,
    pub output: Option<u64>,
    pub reasoning: Option<u64>,
    pub cache: Option<OpenCodeCache>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenCodeCache {
    pub read: Option<u64>,
    pub write: Option<u64>,
}
