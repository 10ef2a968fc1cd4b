//! Converter implementation for Claude Code to canonical format

use anyhow::{Context, Result};
use serde_json::Value;

use super::tags::split_user_markup;
use super::types::{ClaudeEntry, ClaudeEntryType, ClaudeMessage};
use crate::providers::canonical::converter::synthetic_uuid;
use crate::providers::canonical::{
    ContentBlock, LineKind, Message, MessageContent, Role, TokenUsage, TranscriptLine,
};
use crate::providers::common::parse_content_block;
use crate::providers::ProviderId;

/// Placeholder Claude Code writes for locally generated assistant turns
const SYNTHETIC_MODEL: &str = "<synthetic>";

impl ClaudeEntry {
    /// Convert one JSONL entry into canonical lines
    ///
    /// Filtered entries yield no lines. Missing uuid/timestamp/message on a
    /// conversational entry is an error, so the line is skipped.
    pub fn to_canonical(&self, index: usize, placeholder: &str) -> Result<Vec<TranscriptLine>> {
        if self.should_filter() {
            return Ok(Vec::new());
        }

        if self.entry_type == ClaudeEntryType::FileHistorySnapshot {
            return self.snapshot_line(index).map(|line| vec![line]);
        }

        let role = match self.entry_type {
            ClaudeEntryType::User => Role::User,
            _ => Role::Assistant,
        };

        let uuid = self
            .uuid
            .clone()
            .context("Missing uuid in Claude entry")?;
        let timestamp = self
            .timestamp
            .clone()
            .context("Missing timestamp in Claude entry")?;
        let message = self
            .message
            .as_ref()
            .context("Missing message in Claude entry")?;

        let Some(content) = convert_content(message, role, placeholder) else {
            return Ok(Vec::new());
        };

        let model = message
            .model
            .clone()
            .filter(|m| m != SYNTHETIC_MODEL);

        let usage = message
            .usage
            .as_ref()
            .and_then(|u| serde_json::from_value::<TokenUsage>(u.clone()).ok())
            .filter(|u| !u.is_empty());

        let parent_uuid = self
            .parent_uuid
            .clone()
            .filter(|s| !s.is_empty() && s != "null");

        Ok(vec![TranscriptLine {
            kind: role.line_kind(),
            message: Some(Message::new(role, content, model).with_usage(usage)),
            uuid,
            timestamp,
            parent_uuid,
            cwd: self.cwd.clone(),
            git_branch: self.git_branch.clone(),
            session_id: self.session_id.clone(),
            tool_result_raw: self.tool_use_result.clone(),
            request_id: self.request_id.clone().or_else(|| message.id.clone()),
        }])
    }

    fn snapshot_line(&self, index: usize) -> Result<TranscriptLine> {
        let snapshot = self.snapshot.as_ref();
        let message_id = self
            .message_id
            .clone()
            .or_else(|| {
                snapshot
                    .and_then(|s| s.get("messageId"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .context("Missing messageId in snapshot")?;
        let timestamp = snapshot
            .and_then(|s| s.get("timestamp"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| self.timestamp.clone())
            .context("Missing timestamp in snapshot")?;

        Ok(TranscriptLine {
            kind: LineKind::Snapshot,
            message: None,
            uuid: synthetic_uuid(ProviderId::ClaudeCode, &message_id, index, "snapshot"),
            timestamp,
            parent_uuid: Some(message_id),
            cwd: self.cwd.clone(),
            git_branch: self.git_branch.clone(),
            session_id: self.session_id.clone(),
            tool_result_raw: None,
            request_id: None,
        })
    }
}

fn user_text_blocks(text: &str) -> Vec<ContentBlock> {
    split_user_markup(text).unwrap_or_else(|| vec![ContentBlock::text(text)])
}

fn convert_content(message: &ClaudeMessage, role: Role, placeholder: &str) -> Option<MessageContent> {
    match message.content.as_ref()? {
        Value::String(text) => match role {
            Role::User => Some(
                split_user_markup(text)
                    .map(MessageContent::Blocks)
                    .unwrap_or_else(|| MessageContent::Text(text.clone())),
            ),
            Role::Assistant => Some(MessageContent::Text(text.clone())),
        },
        Value::Array(items) => {
            let mut blocks = Vec::with_capacity(items.len());
            for item in items {
                let Some(block) = parse_content_block(item, placeholder) else {
                    continue;
                };
                match block {
                    ContentBlock::Text { text } if role == Role::User => {
                        blocks.extend(user_text_blocks(&text))
                    }
                    other => blocks.push(other),
                }
            }
            (!blocks.is_empty()).then_some(MessageContent::Blocks(blocks))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::canonical::{CommandKind, ContentBlock};

    fn convert(json: &str) -> Vec<TranscriptLine> {
        let entry: ClaudeEntry = serde_json::from_str(json).unwrap();
        entry.to_canonical(0, "(no output)").unwrap()
    }

    #[test]
    fn test_convert_user_message() {
        let lines = convert(
            r#"{
                "parentUuid": null,
                "cwd": "/Users/test/project",
                "sessionId": "abc-123",
                "gitBranch": "main",
                "type": "user",
                "message": {"role": "user", "content": "Hello"},
                "uuid": "uuid-1",
                "timestamp": "2025-10-20T07:44:31.563Z"
            }"#,
        );

        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.uuid, "uuid-1");
        assert_eq!(line.kind, LineKind::User);
        assert_eq!(line.session_id.as_deref(), Some("abc-123"));
        assert_eq!(line.git_branch.as_deref(), Some("main"));
        assert_eq!(line.parent_uuid, None);

        match &line.message.as_ref().unwrap().content {
            MessageContent::Text(text) => assert_eq!(text, "Hello"),
            _ => panic!("Expected text content"),
        }
    }

    #[test]
    fn test_convert_assistant_message_with_usage() {
        let lines = convert(
            r#"{
                "parentUuid": "uuid-1",
                "sessionId": "abc-123",
                "type": "assistant",
                "message": {
                    "id": "msg_01",
                    "role": "assistant",
                    "content": [
                        {"type": "thinking", "thinking": "Let me look", "signature": "sig"},
                        {"type": "tool_use", "id": "toolu_1", "name": "Read", "input": {"file_path": "/a.rs"}}
                    ],
                    "model": "claude-sonnet-4-5-20250929",
                    "usage": {"input_tokens": 10, "output_tokens": 20, "cache_read_input_tokens": 5, "service_tier": "standard"}
                },
                "uuid": "uuid-2",
                "timestamp": "2025-10-20T07:44:35.123Z"
            }"#,
        );

        let line = &lines[0];
        assert_eq!(line.parent_uuid.as_deref(), Some("uuid-1"));
        assert_eq!(line.request_id.as_deref(), Some("msg_01"));

        let message = line.message.as_ref().unwrap();
        assert_eq!(message.model.as_deref(), Some("claude-sonnet-4-5-20250929"));
        let usage = message.usage.as_ref().unwrap();
        assert_eq!(usage.input_tokens, Some(10));
        assert_eq!(usage.cache_read_input_tokens, Some(5));
        assert_eq!(usage.cache_creation_input_tokens, None);

        let blocks = message.blocks();
        assert!(matches!(blocks[0], ContentBlock::Thinking { .. }));
        assert!(blocks[1].is_tool_use());
    }

    #[test]
    fn test_tool_result_is_flattened_and_raw_kept() {
        let lines = convert(
            r#"{
                "sessionId": "abc-123",
                "type": "user",
                "message": {
                    "role": "user",
                    "content": [{
                        "type": "tool_result",
                        "tool_use_id": "toolu_1",
                        "content": [{"type": "text", "text": "line 1"}, {"type": "text", "text": "line 2"}]
                    }]
                },
                "toolUseResult": {"stdout": "line 1\nline 2", "stderr": ""},
                "uuid": "uuid-3",
                "timestamp": "2025-10-20T07:44:36.000Z"
            }"#,
        );

        let line = &lines[0];
        assert!(line.tool_result_raw.is_some());
        match line.message.as_ref().unwrap().blocks()[0] {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => {
                assert_eq!(tool_use_id, "toolu_1");
                assert_eq!(content, "line 1\nline 2");
            }
            _ => panic!("Expected tool_result block"),
        }
    }

    #[test]
    fn test_command_markup_split() {
        let lines = convert(
            r#"{
                "type": "user",
                "message": {"role": "user", "content": "<command-name>/clear</command-name>"},
                "uuid": "uuid-4",
                "timestamp": "2025-10-20T07:45:00.000Z"
            }"#,
        );

        assert_eq!(
            lines[0].message.as_ref().unwrap().content,
            MessageContent::Blocks(vec![ContentBlock::Command {
                kind: CommandKind::Name,
                text: "/clear".to_string()
            }])
        );
    }

    #[test]
    fn test_synthetic_model_dropped() {
        let lines = convert(
            r#"{
                "type": "assistant",
                "message": {"role": "assistant", "content": "No response requested.", "model": "<synthetic>"},
                "uuid": "uuid-5",
                "timestamp": "2025-10-20T07:45:00.000Z"
            }"#,
        );
        assert_eq!(lines[0].message.as_ref().unwrap().model, None);
    }

    #[test]
    fn test_snapshot_line() {
        let lines = convert(
            r#"{
                "type": "file-history-snapshot",
                "messageId": "msg-123",
                "snapshot": {"messageId": "msg-123", "trackedFileBackups": {}, "timestamp": "2025-10-23T03:50:05.757Z"},
                "isSnapshotUpdate": false
            }"#,
        );

        assert_eq!(lines[0].kind, LineKind::Snapshot);
        assert_eq!(lines[0].timestamp, "2025-10-23T03:50:05.757Z");
        assert_eq!(lines[0].parent_uuid.as_deref(), Some("msg-123"));
        assert!(lines[0].message.is_none());
    }

    #[test]
    fn test_missing_uuid_is_error() {
        let entry: ClaudeEntry = serde_json::from_str(
            r#"{"type": "user", "timestamp": "2025-10-20T07:45:00.000Z", "message": {"role": "user", "content": "x"}}"#,
        )
        .unwrap();
        assert!(entry.to_canonical(0, "(no output)").is_err());
    }

    #[test]
    fn test_server_tool_use_line_kept() {
        let lines = convert(
            r#"{
                "parentUuid": "uuid-1",
                "sessionId": "abc-123",
                "type": "assistant",
                "message": {
                    "id": "msg_02",
                    "role": "assistant",
                    "model": "claude-sonnet-4-5-20250929",
                    "content": [{"type": "server_tool_use", "id": "srvtoolu_1", "name": "web_search", "input": {"query": "tokio"}}]
                },
                "uuid": "uuid-3",
                "timestamp": "2025-10-20T07:44:40.000Z"
            }"#,
        );

        assert_eq!(lines.len(), 1);
        let blocks = lines[0].message.as_ref().unwrap().blocks();
        assert!(matches!(
            blocks[0],
            ContentBlock::ToolUse { name, .. } if name == "web_search"
        ));
    }
}
