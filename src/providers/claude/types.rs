//! Type definitions for native Claude Code JSONL format

use serde::Deserialize;
use serde_json::Value;

/// Claude JSONL entry type discriminator
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClaudeEntryType {
    User,
    Assistant,
    System,
    #[serde(rename = "file-history-snapshot")]
    FileHistorySnapshot,
    Summary,
    #[serde(other)]
    Other,
}

/// Native Claude Code JSONL entry
///
/// Claude Code logs are already close to the canonical shape; they mostly
/// need system events dropped, user markup split into blocks and tool
/// results flattened.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeEntry {
    /// Unique message identifier
    pub uuid: Option<String>,

    /// ISO 8601 timestamp
    pub timestamp: Option<String>,

    /// Entry type
    #[serde(rename = "type")]
    pub entry_type: ClaudeEntryType,

    pub session_id: Option<String>,

    pub cwd: Option<String>,

    pub git_branch: Option<String>,

    /// Parent message UUID (for threading)
    pub parent_uuid: Option<String>,

    /// Message payload (`{role, content, model?, usage?, id?}`)
    pub message: Option<ClaudeMessage>,

    pub request_id: Option<String>,

    /// Message ID (for file-history-snapshot)
    pub message_id: Option<String>,

    /// Snapshot data (for file-history-snapshot)
    pub snapshot: Option<Value>,

    /// Structured tool output, kept verbatim
    pub tool_use_result: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeMessage {
    pub id: Option<String>,
    pub role: Option<String>,
    pub content: Option<Value>,
    pub model: Option<String>,
    pub usage: Option<Value>,
}

impl ClaudeEntry {
    /// Entries that never produce a canonical line
    pub fn should_filter(&self) -> bool {
        matches!(
            self.entry_type,
            ClaudeEntryType::Summary | ClaudeEntryType::System | ClaudeEntryType::Other
        )
    }
}
