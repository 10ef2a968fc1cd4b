use serde_json::Value;

use super::tool_result::{flatten_tool_result, or_placeholder};
use crate::providers::canonical::{
    CommandKind, ContentBlock, MessageContent, StreamKind, ToolResultMetadata,
};

const REDACTED_THINKING: &str = "[redacted thinking]";

fn str_field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| value.get(*k).and_then(|v| v.as_str()))
}

fn int_field(value: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|k| value.get(*k).and_then(|v| v.as_i64()))
}

/// Parse a content block leniently
///
/// Accepts both snake_case and camelCase field names, so canonical output
/// from this crate and Claude-style blocks both parse. Unknown types that
/// look like a tool call (`id`, `name`, `input`) or a tool result
/// (`tool_use_id`) become opaque `ToolUse`/`ToolResult` blocks; anything
/// else yields `None`.
pub fn parse_content_block(value: &Value, placeholder: &str) -> Option<ContentBlock> {
    if let Some(text) = value.as_str() {
        return Some(ContentBlock::text(text));
    }

    let kind = value.get("type")?.as_str()?;
    match kind {
        "text" | "input_text" | "output_text" => {
            str_field(value, &["text"]).map(ContentBlock::text)
        }
        "thinking" | "reasoning" => {
            str_field(value, &["thinking", "text"]).map(ContentBlock::thinking)
        }
        "tool_use" | "tool_call" => {
            let id = str_field(value, &["id", "toolUseId", "tool_use_id"])?;
            Some(tool_use_block(value, id))
        }
        "tool_result" => {
            let tool_use_id = str_field(value, &["toolUseId", "tool_use_id"])?;
            Some(tool_result_block(value, tool_use_id, placeholder))
        }
        "redacted_thinking" => Some(ContentBlock::thinking(REDACTED_THINKING)),
        "command" => {
            let kind: CommandKind = serde_json::from_value(value.get("kind")?.clone()).ok()?;
            let text = str_field(value, &["text"])?;
            Some(ContentBlock::Command {
                kind,
                text: text.to_string(),
            })
        }
        "shell_stream" => {
            let kind: StreamKind = serde_json::from_value(value.get("kind")?.clone()).ok()?;
            let text = str_field(value, &["text"])?;
            Some(ContentBlock::ShellStream {
                kind,
                text: text.to_string(),
            })
        }
        "instructions" => str_field(value, &["text"]).map(|text| ContentBlock::Instructions {
            text: text.to_string(),
        }),
        "image" | "input_image" => Some(ContentBlock::text("[image]")),
        // Server-side tools and future tool shapes pass through opaquely
        other => {
            if let Some(tool_use_id) = str_field(value, &["tool_use_id", "toolUseId"]) {
                return Some(tool_result_block(value, tool_use_id, placeholder));
            }
            if let (Some(id), Some(_), Some(_)) =
                (str_field(value, &["id"]), str_field(value, &["name"]), value.get("input"))
            {
                return Some(tool_use_block(value, id));
            }
            tracing::debug!("Dropping unknown content block type: {}", other);
            None
        }
    }
}

fn tool_use_block(value: &Value, id: &str) -> ContentBlock {
    let name = str_field(value, &["name", "toolName"]).unwrap_or("unknown");
    let input = value
        .get("input")
        .or_else(|| value.get("arguments"))
        .cloned()
        .unwrap_or(Value::Null);
    ContentBlock::ToolUse {
        id: id.to_string(),
        name: name.to_string(),
        input,
    }
}

fn tool_result_block(value: &Value, tool_use_id: &str, placeholder: &str) -> ContentBlock {
    let content = value
        .get("content")
        .or_else(|| value.get("output"))
        .map(flatten_tool_result)
        .unwrap_or_default();
    let is_error = value
        .get("isError")
        .or_else(|| value.get("is_error"))
        .and_then(|v| v.as_bool());
    let metadata = value.get("metadata").and_then(|m| {
        let metadata = ToolResultMetadata {
            exit_code: int_field(m, &["exitCode", "exit_code"]),
            duration_seconds: m
                .get("durationSeconds")
                .or_else(|| m.get("duration_seconds"))
                .and_then(|v| v.as_f64()),
        };
        (!metadata.is_empty()).then_some(metadata)
    });
    ContentBlock::ToolResult {
        tool_use_id: tool_use_id.to_string(),
        content: or_placeholder(content, placeholder),
        is_error,
        metadata,
    }
}

/// Parse message content that is either a string or an array of blocks
pub fn parse_message_content(value: &Value, placeholder: &str) -> Option<MessageContent> {
    match value {
        Value::String(s) => Some(MessageContent::Text(s.clone())),
        Value::Array(items) => {
            let blocks: Vec<ContentBlock> = items
                .iter()
                .filter_map(|item| parse_content_block(item, placeholder))
                .collect();
            if blocks.is_empty() {
                None
            } else {
                Some(MessageContent::Blocks(blocks))
            }
        }
        Value::Object(_) => parse_content_block(value, placeholder)
            .map(|block| MessageContent::Blocks(vec![block])),
        _ => None,
    }
}
