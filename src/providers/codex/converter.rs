use anyhow::{Context, Result};
use serde_json::{json, Value};

use super::types::{CodexMessage, CodexPayload, EventMsgPayload, ResponseItemPayload};
use crate::providers::canonical::converter::synthetic_uuid;
use crate::providers::canonical::{
    ContentBlock, Message, MessageContent, Role, TokenUsage, ToolResultMetadata, TranscriptLine,
};
use crate::providers::common::{flatten_tool_result, or_placeholder};
use crate::providers::ProviderId;

/// Prefixes of user messages Codex injects on the user's behalf
const INJECTED_PREFIXES: &[&str] = &["<user_instructions>", "<environment_context>"];

/// Result of converting one rollout line
#[derive(Debug)]
pub enum CodexItem {
    Lines(Vec<TranscriptLine>),
    Usage(TokenUsage),
    Nothing,
}

/// Rollout conversion state
///
/// Codex spreads session facts across lines: `session_meta` carries the id,
/// `turn_context` the cwd and current model. Every later line is stamped
/// with whatever is known at that point.
#[derive(Debug, Default)]
pub struct CodexConverter {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub git_branch: Option<String>,
    pub model: Option<String>,
    last_total_tokens: Option<u64>,
}

impl CodexConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn convert(&mut self, msg: &CodexMessage, index: usize, placeholder: &str) -> Result<CodexItem> {
        match &msg.payload {
            CodexPayload::SessionMeta(meta) => {
                if let Some(id) = meta.id.clone().filter(|s| !s.is_empty()) {
                    self.session_id = Some(id);
                }
                if meta.cwd.is_some() {
                    self.cwd = meta.cwd.clone();
                }
                if let Some(branch) = meta.git.as_ref().and_then(|g| g.branch.clone()) {
                    self.git_branch = Some(branch);
                }
                tracing::debug!(version = ?meta.cli_version, "Codex session metadata");
                Ok(CodexItem::Nothing)
            }
            CodexPayload::TurnContext(ctx) => {
                if ctx.cwd.is_some() {
                    self.cwd = ctx.cwd.clone();
                }
                if ctx.model.is_some() {
                    self.model = ctx.model.clone();
                }
                Ok(CodexItem::Nothing)
            }
            CodexPayload::ResponseItem(item) => self.convert_response_item(msg, item, index, placeholder),
            CodexPayload::EventMsg(event) => Ok(self.convert_event_msg(event)),
            CodexPayload::Other => Ok(CodexItem::Nothing),
        }
    }

    fn line(&self, msg: &CodexMessage, index: usize, discriminator: &str, message: Message) -> TranscriptLine {
        let session = self.session_id.as_deref().unwrap_or_default();
        TranscriptLine {
            kind: message.role.line_kind(),
            message: Some(message),
            uuid: synthetic_uuid(ProviderId::Codex, session, index, discriminator),
            timestamp: msg.timestamp.clone(),
            parent_uuid: None,
            cwd: self.cwd.clone(),
            git_branch: self.git_branch.clone(),
            session_id: self.session_id.clone(),
            tool_result_raw: None,
            request_id: None,
        }
    }

    fn assistant(&self, content: MessageContent) -> Message {
        Message::assistant(content, self.model.clone())
    }

    fn convert_response_item(
        &self,
        msg: &CodexMessage,
        item: &ResponseItemPayload,
        index: usize,
        placeholder: &str,
    ) -> Result<CodexItem> {
        let data = &item.data;
        let kind = item.item_type.as_str();

        let message = match kind {
            "message" => {
                let role = data["role"].as_str().context("Missing role in message")?;
                let Some((role, blocks)) = message_blocks(role, &data["content"]) else {
                    return Ok(CodexItem::Nothing);
                };
                let content = MessageContent::from_blocks(blocks);
                match role {
                    Role::User => Message::user(content),
                    Role::Assistant => self.assistant(content),
                }
            }
            "reasoning" => {
                let text = reasoning_text(data);
                if text.is_empty() {
                    // Encrypted-only reasoning has nothing to render
                    return Ok(CodexItem::Nothing);
                }
                self.assistant(MessageContent::Blocks(vec![ContentBlock::thinking(text)]))
            }
            "function_call" => {
                let name = data["name"].as_str().context("Missing function name")?;
                let call_id = data["call_id"].as_str().context("Missing call_id")?;
                let input = match &data["arguments"] {
                    Value::String(s) => {
                        serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone()))
                    }
                    other => other.clone(),
                };
                self.tool_use(call_id, name, input)
            }
            "custom_tool_call" => {
                let name = data["name"].as_str().context("Missing tool name")?;
                let call_id = data["call_id"].as_str().context("Missing call_id")?;
                self.tool_use(call_id, name, json!({ "input": data["input"] }))
            }
            "local_shell_call" => {
                let call_id = data["call_id"]
                    .as_str()
                    .or_else(|| data["id"].as_str())
                    .context("Missing call_id")?;
                self.tool_use(call_id, "local_shell", data["action"].clone())
            }
            "web_search_call" => {
                let session = self.session_id.as_deref().unwrap_or_default();
                let id = data["id"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| synthetic_uuid(ProviderId::Codex, session, index, "web_search"));
                self.tool_use(&id, "web_search", data["action"].clone())
            }
            "function_call_output" | "custom_tool_call_output" | "local_shell_call_output" => {
                let call_id = data["call_id"].as_str().context("Missing call_id")?;
                Message::user(MessageContent::Blocks(vec![tool_output_block(
                    call_id,
                    &data["output"],
                    placeholder,
                )]))
            }
            other => {
                tracing::debug!("Skipping Codex response_item type: {}", other);
                return Ok(CodexItem::Nothing);
            }
        };

        Ok(CodexItem::Lines(vec![self.line(msg, index, kind, message)]))
    }

    fn tool_use(&self, id: &str, name: &str, input: Value) -> Message {
        self.assistant(MessageContent::Blocks(vec![ContentBlock::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        }]))
    }

    fn convert_event_msg(&mut self, event: &EventMsgPayload) -> CodexItem {
        match event.event_type.as_str() {
            "token_count" => {
                let info = &event.data["info"];
                if info.is_null() {
                    return CodexItem::Nothing;
                }

                // The same cumulative total is re-emitted when nothing new was billed
                let total = info["total_token_usage"]["total_tokens"].as_u64();
                if total.is_some() && total == self.last_total_tokens {
                    return CodexItem::Nothing;
                }
                self.last_total_tokens = total;

                // last_token_usage is per-turn; total_token_usage is cumulative
                let last = &info["last_token_usage"];
                let usage = TokenUsage {
                    input_tokens: last["input_tokens"].as_u64(),
                    output_tokens: last["output_tokens"].as_u64(),
                    cache_creation_input_tokens: None,
                    cache_read_input_tokens: last["cached_input_tokens"].as_u64(),
                    thinking_tokens: last["reasoning_output_tokens"].as_u64(),
                    tool_tokens: None,
                };
                if usage.is_empty() {
                    CodexItem::Nothing
                } else {
                    CodexItem::Usage(usage)
                }
            }
            // user_message, agent_message and agent_reasoning duplicate response_items
            _ => CodexItem::Nothing,
        }
    }
}

fn is_injected(text: &str) -> bool {
    let trimmed = text.trim_start();
    INJECTED_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}

/// Blocks for a `message` item, with the role it should be rendered under
fn message_blocks(role: &str, content: &Value) -> Option<(Role, Vec<ContentBlock>)> {
    let (role, instructions) = match role {
        "user" => (Role::User, false),
        "assistant" => (Role::Assistant, false),
        // developer/system prompts surface as instructions on a user line
        _ => (Role::User, true),
    };

    let parts: Vec<&Value> = match content {
        Value::Array(items) => items.iter().collect(),
        Value::String(_) => vec![content],
        _ => Vec::new(),
    };

    let mut blocks = Vec::new();
    for part in parts {
        let text = match part {
            Value::String(s) => Some(s.as_str()),
            _ => part["text"].as_str(),
        };
        match (part["type"].as_str(), text) {
            (Some("input_image"), _) => blocks.push(ContentBlock::text("[image]")),
            (_, Some(text)) if instructions || (role == Role::User && is_injected(text)) => {
                blocks.push(ContentBlock::Instructions {
                    text: text.to_string(),
                })
            }
            (_, Some(text)) if !text.is_empty() => blocks.push(ContentBlock::text(text)),
            _ => {}
        }
    }

    (!blocks.is_empty()).then_some((role, blocks))
}

fn reasoning_text(data: &Value) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for key in ["summary", "content"] {
        if let Some(items) = data[key].as_array() {
            parts.extend(items.iter().filter_map(|s| s["text"].as_str()));
        }
    }
    parts.join("\n")
}

/// Tool output, unwrapping the `{output, metadata}` envelope Codex uses for shell calls
fn tool_output_block(call_id: &str, output: &Value, placeholder: &str) -> ContentBlock {
    let envelope = match output {
        Value::String(s) => serde_json::from_str::<Value>(s).ok().filter(|v| {
            v.get("output").is_some() && v.get("metadata").is_some()
        }),
        _ => None,
    };

    if let Some(envelope) = envelope {
        let meta = &envelope["metadata"];
        let metadata = ToolResultMetadata {
            exit_code: meta["exit_code"].as_i64(),
            duration_seconds: meta["duration_seconds"].as_f64(),
        };
        return ContentBlock::ToolResult {
            tool_use_id: call_id.to_string(),
            content: or_placeholder(flatten_tool_result(&envelope["output"]), placeholder),
            is_error: metadata.exit_code.map(|code| code != 0),
            metadata: (!metadata.is_empty()).then_some(metadata),
        };
    }

    let is_error = output
        .get("success")
        .and_then(|v| v.as_bool())
        .map(|success| !success);

    ContentBlock::ToolResult {
        tool_use_id: call_id.to_string(),
        content: or_placeholder(flatten_tool_result(output), placeholder),
        is_error,
        metadata: None,
    }
}
