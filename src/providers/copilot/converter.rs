use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use super::types::{decode_arguments, CopilotEvent, ToolRequest, STATE_EVENTS};
use crate::providers::canonical::{ContentBlock, Message, MessageContent, TranscriptLine};
use crate::providers::common::{flatten_tool_result, or_placeholder};

/// Stateful event converter
///
/// `session.start` and `session.model_change` only update state; the current
/// model is stamped on every assistant line that follows.
#[derive(Debug, Default)]
pub struct CopilotConverter {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub git_branch: Option<String>,
    pub model: Option<String>,
    requested_tools: HashSet<String>,
}

impl CopilotConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn convert(&mut self, event: &CopilotEvent, placeholder: &str) -> Result<Vec<TranscriptLine>> {
        match event.event_type.as_str() {
            "session.start" => {
                self.session_start(event);
                Ok(Vec::new())
            }
            "session.model_change" => {
                if let Some(model) = event.data_str("newModel").or_else(|| event.data_str("model")) {
                    self.model = Some(model.to_string());
                }
                Ok(Vec::new())
            }
            "user.message" => self.user_message(event),
            "assistant.message" => self.assistant_message(event),
            "assistant.reasoning" => self.reasoning(event),
            "tool.execution_start" => self.tool_start(event),
            "tool.execution_complete" => self.tool_complete(event, placeholder),
            t if STATE_EVENTS.contains(&t) => Ok(Vec::new()),
            other => bail!("Unknown Copilot event type: {}", other),
        }
    }

    fn session_start(&mut self, event: &CopilotEvent) {
        if let Some(id) = event.data_str("sessionId") {
            self.session_id = Some(id.to_string());
        }
        if let Some(model) = event.data_str("selectedModel") {
            self.model = Some(model.to_string());
        }

        let context = event.data.get("context").unwrap_or(&event.data);
        if let Some(cwd) = context.get("cwd").and_then(|v| v.as_str()) {
            self.cwd = Some(cwd.to_string());
        }
        if let Some(branch) = context.get("branch").and_then(|v| v.as_str()) {
            self.git_branch = Some(branch.to_string());
        }
    }

    fn line(&self, uuid: String, event: &CopilotEvent, message: Message) -> TranscriptLine {
        TranscriptLine {
            kind: message.role.line_kind(),
            message: Some(message),
            uuid,
            timestamp: event.timestamp.clone(),
            parent_uuid: None,
            cwd: self.cwd.clone(),
            git_branch: self.git_branch.clone(),
            session_id: self.session_id.clone(),
            tool_result_raw: None,
            request_id: event.data_str("messageId").map(str::to_string),
        }
    }

    fn user_message(&self, event: &CopilotEvent) -> Result<Vec<TranscriptLine>> {
        let text = event
            .data_str("content")
            .or_else(|| event.data_str("text"))
            .context("user.message without content")?;

        let message = Message::user(MessageContent::Text(text.to_string()));
        Ok(vec![self.line(event.id.clone(), event, message)])
    }

    fn assistant_message(&mut self, event: &CopilotEvent) -> Result<Vec<TranscriptLine>> {
        let mut blocks = Vec::new();

        if let Some(text) = event.data_str("content").filter(|t| !t.trim().is_empty()) {
            blocks.push(ContentBlock::text(text));
        }

        let requests: Vec<ToolRequest> = match event.data.get("toolRequests") {
            Some(value) => serde_json::from_value(value.clone()).context("Malformed toolRequests")?,
            None => Vec::new(),
        };
        for request in requests {
            self.requested_tools.insert(request.tool_call_id.clone());
            blocks.push(ContentBlock::ToolUse {
                id: request.tool_call_id,
                name: request.name,
                input: decode_arguments(&request.arguments),
            });
        }

        if blocks.is_empty() {
            return Ok(Vec::new());
        }

        let message = Message::assistant(MessageContent::from_blocks(blocks), self.model.clone());
        Ok(vec![self.line(event.id.clone(), event, message)])
    }

    fn reasoning(&self, event: &CopilotEvent) -> Result<Vec<TranscriptLine>> {
        let Some(text) = event.data_str("content").filter(|t| !t.trim().is_empty()) else {
            return Ok(Vec::new());
        };
        let message = Message::assistant(
            MessageContent::Blocks(vec![ContentBlock::thinking(text)]),
            self.model.clone(),
        );
        Ok(vec![self.line(event.id.clone(), event, message)])
    }

    fn tool_start(&mut self, event: &CopilotEvent) -> Result<Vec<TranscriptLine>> {
        let call_id = event
            .data_str("toolCallId")
            .context("tool.execution_start without toolCallId")?;

        // Already emitted from the assistant message's toolRequests
        if !self.requested_tools.insert(call_id.to_string()) {
            return Ok(Vec::new());
        }

        let block = ContentBlock::ToolUse {
            id: call_id.to_string(),
            name: event.data_str("toolName").unwrap_or("unknown").to_string(),
            input: event
                .data
                .get("arguments")
                .map(decode_arguments)
                .unwrap_or(Value::Null),
        };
        let message = Message::assistant(MessageContent::Blocks(vec![block]), self.model.clone());
        Ok(vec![self.line(event.id.clone(), event, message)])
    }

    fn tool_complete(&self, event: &CopilotEvent, placeholder: &str) -> Result<Vec<TranscriptLine>> {
        let call_id = event
            .data_str("toolCallId")
            .context("tool.execution_complete without toolCallId")?;
        let success = event.data.get("success").and_then(|v| v.as_bool());

        let content = match (event.data.get("result"), event.data.get("error")) {
            (Some(result), _) if !result.is_null() => result
                .get("content")
                .map(flatten_tool_result)
                .unwrap_or_else(|| flatten_tool_result(result)),
            (_, Some(error)) => error
                .get("message")
                .map(flatten_tool_result)
                .unwrap_or_else(|| flatten_tool_result(error)),
            _ => String::new(),
        };

        let message = Message::user(MessageContent::Blocks(vec![ContentBlock::ToolResult {
            tool_use_id: call_id.to_string(),
            content: or_placeholder(content, placeholder),
            is_error: success.map(|ok| !ok),
            metadata: None,
        }]));
        let mut line = self.line(event.id.clone(), event, message);
        line.tool_result_raw = event.data.get("result").cloned();
        Ok(vec![line])
    }
}
