use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ProviderId;

pub mod converter;

#[cfg(test)]
mod tests;

/// One line of a canonical transcript (based on Claude Code JSONL)
///
/// This is the unified shape every provider adapter emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptLine {
    /// Line type
    #[serde(rename = "type")]
    pub kind: LineKind,

    /// Message payload (absent for snapshots)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// Unique line identifier
    pub uuid: String,

    /// ISO 8601 timestamp
    pub timestamp: String,

    /// Parent line UUID (for threading)
    pub parent_uuid: Option<String>,

    /// Current working directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    /// Git branch name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,

    /// Session identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Provider-native tool result payload, kept verbatim for rich rendering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_result_raw: Option<Value>,

    /// Provider request/response id; streamed fragments of one response share it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Line type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    User,
    Assistant,
    Snapshot,
}

/// Speaker role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn line_kind(self) -> LineKind {
        match self {
            Role::User => LineKind::User,
            Role::Assistant => LineKind::Assistant,
        }
    }
}

/// Message structure
///
/// `model` is only ever populated on assistant messages; use the
/// constructors to keep that true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    pub content: MessageContent,

    /// Model name (assistant messages only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Token usage reported for this message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl Message {
    pub fn user(content: MessageContent) -> Self {
        Self {
            role: Role::User,
            content,
            model: None,
            usage: None,
        }
    }

    pub fn assistant(content: MessageContent, model: Option<String>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            model: model.filter(|m| !m.is_empty()),
            usage: None,
        }
    }

    pub fn new(role: Role, content: MessageContent, model: Option<String>) -> Self {
        match role {
            Role::User => Self::user(content),
            Role::Assistant => Self::assistant(content, model),
        }
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }

    /// Content blocks, treating plain text content as a single text block
    pub fn blocks(&self) -> Vec<&ContentBlock> {
        match &self.content {
            MessageContent::Blocks(blocks) => blocks.iter().collect(),
            MessageContent::Text(_) => Vec::new(),
        }
    }
}

/// Content can be either plain text or structured blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(text) => text.is_empty(),
            MessageContent::Blocks(blocks) => blocks.is_empty(),
        }
    }

    /// Collapse a single text block into plain text content
    pub fn from_blocks(mut blocks: Vec<ContentBlock>) -> Self {
        if blocks.len() == 1 {
            if let ContentBlock::Text { .. } = &blocks[0] {
                if let Some(ContentBlock::Text { text }) = blocks.pop() {
                    return MessageContent::Text(text);
                }
            }
        }
        MessageContent::Blocks(blocks)
    }
}

/// Content block vocabulary shared by every provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ContentBlock {
    /// Plain text block
    Text { text: String },
    /// Thinking/reasoning block (extended thinking from Claude, thoughts from Gemini, etc.)
    Thinking { thinking: String },
    /// Tool invocation block; input stays opaque
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    /// Tool execution result block, content always flattened to a string
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<ToolResultMetadata>,
    },
    /// Slash-command markup typed by the user
    Command { kind: CommandKind, text: String },
    /// Shell input/output captured around a user-run command
    ShellStream { kind: StreamKind, text: String },
    /// System or project instructions injected into the conversation
    Instructions { text: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn thinking(thinking: impl Into<String>) -> Self {
        ContentBlock::Thinking {
            thinking: thinking.into(),
        }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: None,
            metadata: None,
        }
    }

    pub fn is_tool_use(&self) -> bool {
        matches!(self, ContentBlock::ToolUse { .. })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Name,
    Message,
    Args,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Input,
    Stdout,
    Stderr,
}

/// Execution details some providers report with tool output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

impl ToolResultMetadata {
    pub fn is_empty(&self) -> bool {
        self.exit_code.is_none() && self.duration_seconds.is_none()
    }
}

/// Token usage statistics for one message (Claude's snake_case field names)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens consumed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,

    /// Output tokens generated (including thinking and tool tokens where the provider splits them)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,

    /// Cache creation tokens (prompt caching)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_creation_input_tokens: Option<u64>,

    /// Cache read tokens (prompt caching)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_read_input_tokens: Option<u64>,

    /// Reasoning tokens, when reported separately
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_tokens: Option<u64>,

    /// Tool-use tokens, when reported separately
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_tokens: Option<u64>,
}

impl TokenUsage {
    pub fn is_empty(&self) -> bool {
        self.input_tokens.is_none()
            && self.output_tokens.is_none()
            && self.cache_creation_input_tokens.is_none()
            && self.cache_read_input_tokens.is_none()
            && self.thinking_tokens.is_none()
            && self.tool_tokens.is_none()
    }

    /// Add another usage record field by field, keeping unknown fields unknown
    pub fn accumulate(&mut self, other: &TokenUsage) {
        fn add(into: &mut Option<u64>, value: Option<u64>) {
            if let Some(v) = value {
                *into = Some(into.unwrap_or(0).saturating_add(v));
            }
        }
        add(&mut self.input_tokens, other.input_tokens);
        add(&mut self.output_tokens, other.output_tokens);
        add(
            &mut self.cache_creation_input_tokens,
            other.cache_creation_input_tokens,
        );
        add(&mut self.cache_read_input_tokens, other.cache_read_input_tokens);
        add(&mut self.thinking_tokens, other.thinking_tokens);
        add(&mut self.tool_tokens, other.tool_tokens);
    }
}

/// Canonical transcript produced by every adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTranscript {
    pub messages: Vec<TranscriptLine>,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    pub provider: ProviderId,
    pub metadata: TranscriptSummary,
}

/// Timing and size summary embedded in the transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSummary {
    pub first_timestamp: String,
    pub last_timestamp: String,
    pub message_count: usize,
}

impl ParsedTranscript {
    /// Assemble a transcript, deriving the summary from the lines
    pub fn from_lines(
        messages: Vec<TranscriptLine>,
        session_id: String,
        cwd: Option<String>,
        provider: ProviderId,
    ) -> Self {
        let metadata = summarize(&messages);
        Self {
            messages,
            session_id,
            cwd,
            provider,
            metadata,
        }
    }
}

/// Parse an ISO 8601 timestamp into UTC
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Min/max timestamps and count
///
/// Parseable timestamps are compared chronologically; when none parse the
/// raw strings are compared lexically. Line order is never trusted.
pub fn summarize(lines: &[TranscriptLine]) -> TranscriptSummary {
    let mut first: Option<(DateTime<Utc>, &str)> = None;
    let mut last: Option<(DateTime<Utc>, &str)> = None;

    for line in lines {
        if let Some(ts) = parse_timestamp(&line.timestamp) {
            if first.is_none_or(|(f, _)| ts < f) {
                first = Some((ts, &line.timestamp));
            }
            if last.is_none_or(|(l, _)| ts > l) {
                last = Some((ts, &line.timestamp));
            }
        }
    }

    let (first_timestamp, last_timestamp) = match (first, last) {
        (Some((_, f)), Some((_, l))) => (f.to_string(), l.to_string()),
        _ => {
            let mut raw: Vec<&str> = lines
                .iter()
                .map(|l| l.timestamp.as_str())
                .filter(|t| !t.is_empty())
                .collect();
            raw.sort_unstable();
            (
                raw.first().map(|s| s.to_string()).unwrap_or_default(),
                raw.last().map(|s| s.to_string()).unwrap_or_default(),
            )
        }
    };

    TranscriptSummary {
        first_timestamp,
        last_timestamp,
        message_count: lines.len(),
    }
}
