use anyhow::{bail, Result};
use serde_json::Value;

use super::types::{GeminiMessage, GeminiTokens, ToolCall};
use crate::providers::canonical::{
    ContentBlock, Message, MessageContent, Role, TokenUsage, TranscriptLine,
};
use crate::providers::common::{flatten_tool_result, or_placeholder};

/// Gemini's separate thought/tool counts folded into output, as Claude reports them
fn convert_tokens(tokens: &GeminiTokens) -> Option<TokenUsage> {
    let output = match (tokens.output, tokens.thoughts, tokens.tool) {
        (None, None, None) => None,
        (o, t, tool) => Some(
            o.unwrap_or(0)
                .saturating_add(t.unwrap_or(0))
                .saturating_add(tool.unwrap_or(0)),
        ),
    };
    let usage = TokenUsage {
        input_tokens: tokens.input,
        output_tokens: output,
        cache_creation_input_tokens: None,
        cache_read_input_tokens: tokens.cached,
        thinking_tokens: tokens.thoughts,
        tool_tokens: tokens.tool,
    };
    (!usage.is_empty()).then_some(usage)
}

/// Flatten a tool call's result parts into display text
///
/// `functionResponse.response` carries `output` for shell-style tools,
/// `error` on failure, or an arbitrary object. `resultDisplay` is the CLI's
/// rendered version and is used when the result itself is empty.
fn tool_result_text(tool_call: &ToolCall) -> String {
    let mut fragments = Vec::new();

    if let Some(Value::Array(parts)) = &tool_call.result {
        for part in parts {
            let text = match part.get("functionResponse") {
                Some(fr) => match fr.get("response") {
                    Some(response) => match (response.get("output"), response.get("error")) {
                        (Some(output), _) => flatten_tool_result(output),
                        (None, Some(error)) => flatten_tool_result(error),
                        (None, None) => response.to_string(),
                    },
                    None => fr.to_string(),
                },
                None => flatten_tool_result(part),
            };
            if !text.is_empty() {
                fragments.push(text);
            }
        }
    } else if let Some(other) = &tool_call.result {
        fragments.push(flatten_tool_result(other));
    }

    let text = fragments.join("\n");
    if !text.trim().is_empty() {
        return text;
    }

    match &tool_call.result_display {
        Some(Value::String(s)) => s.clone(),
        Some(display) => display
            .get("fileDiff")
            .and_then(|d| d.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| flatten_tool_result(display)),
        None => String::new(),
    }
}

fn line(uuid: String, timestamp: &str, message: Message) -> TranscriptLine {
    TranscriptLine {
        kind: message.role.line_kind(),
        message: Some(message),
        uuid,
        timestamp: timestamp.to_string(),
        parent_uuid: None,
        cwd: None,
        git_branch: None,
        session_id: None,
        tool_result_raw: None,
        request_id: None,
    }
}

impl GeminiMessage {
    /// Convert one session entry into canonical lines
    ///
    /// The entry's own text and thoughts come first, then for each tool call
    /// an assistant `tool_use` line and, when a result was recorded, a user
    /// `tool_result` line (`{id}_result`).
    pub fn to_canonical(&self, placeholder: &str) -> Result<Vec<TranscriptLine>> {
        let role = match self.message_type.as_str() {
            "user" => Role::User,
            "gemini" | "assistant" | "model" => Role::Assistant,
            // CLI notices, not conversation
            "info" | "error" | "warning" => return Ok(Vec::new()),
            other => bail!("Unknown Gemini message type: {}", other),
        };

        let model = match role {
            Role::Assistant => self.model.clone(),
            Role::User => None,
        };
        let mut usage = self.tokens.as_ref().and_then(convert_tokens);
        let mut lines = Vec::new();

        let mut blocks: Vec<ContentBlock> = self
            .thoughts
            .iter()
            .flatten()
            .map(|t| t.render())
            .filter(|t| !t.is_empty())
            .map(ContentBlock::thinking)
            .collect();
        let text = self.text();
        if !text.trim().is_empty() {
            blocks.push(ContentBlock::text(text));
        }

        if !blocks.is_empty() {
            let message = Message::new(role, MessageContent::from_blocks(blocks), model.clone())
                .with_usage(usage.take());
            lines.push(line(self.id.clone(), &self.timestamp, message));
        }

        for tool_call in self.tool_calls.iter().flatten() {
            let tool_use = Message::assistant(
                MessageContent::Blocks(vec![ContentBlock::ToolUse {
                    id: tool_call.id.clone(),
                    name: tool_call.name.clone(),
                    input: tool_call.args.clone().unwrap_or(Value::Null),
                }]),
                model.clone().or_else(|| self.model.clone()),
            )
            .with_usage(usage.take());
            lines.push(line(tool_call.id.clone(), &self.timestamp, tool_use));

            if tool_call.result.is_none() && tool_call.result_display.is_none() {
                continue;
            }

            let result = Message::user(MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id: tool_call.id.clone(),
                content: or_placeholder(tool_result_text(tool_call), placeholder),
                is_error: tool_call.status.as_deref().map(|s| s != "success"),
                metadata: None,
            }]));
            let mut result_line = line(format!("{}_result", tool_call.id), &self.timestamp, result);
            result_line.tool_result_raw = tool_call.result.clone();
            lines.push(result_line);
        }

        Ok(lines)
    }
}
