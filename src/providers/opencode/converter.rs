use anyhow::{bail, Context, Result};

use super::types::{OpenCodeEntry, OpenCodePart, OpenCodeTokens};
use crate::providers::canonical::converter::synthetic_uuid;
use crate::providers::canonical::{
    ContentBlock, Message, MessageContent, Role, TokenUsage, TranscriptLine,
};
use crate::providers::common::{flatten_tool_result, normalize_timestamp, or_placeholder};
use crate::providers::ProviderId;

fn convert_tokens(tokens: &OpenCodeTokens) -> Option<TokenUsage> {
    let cache = tokens.cache.clone().unwrap_or_default();
    let usage = TokenUsage {
        input_tokens: tokens.input,
        output_tokens: tokens.output,
        cache_creation_input_tokens: cache.write,
        cache_read_input_tokens: cache.read,
        thinking_tokens: tokens.reasoning,
        tool_tokens: None,
    };
    (!usage.is_empty()).then_some(usage)
}

fn convert_part(part: &OpenCodePart, placeholder: &str) -> Option<ContentBlock> {
    match part {
        OpenCodePart::Text { text } => Some(ContentBlock::text(text.clone())),
        OpenCodePart::Reasoning { text } => Some(ContentBlock::thinking(text.clone())),
        OpenCodePart::ToolUse { id, name, input } => Some(ContentBlock::ToolUse {
            id: id.clone(),
            name: name.clone(),
            input: input.clone(),
        }),
        OpenCodePart::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => Some(ContentBlock::ToolResult {
            tool_use_id: tool_use_id.clone(),
            content: or_placeholder(flatten_tool_result(content), placeholder),
            is_error: *is_error,
            metadata: None,
        }),
        // Attachments have no canonical block; keep a readable reference
        OpenCodePart::File {
            filename,
            mime,
            url,
        } => Some(ContentBlock::text(format!("[File: {} ({})] URL: {}", filename, mime, url))),
        OpenCodePart::Patch { files, hash } => Some(ContentBlock::text(format!(
            "[Patch: {} files, hash: {}] Files: {}",
            files.len(),
            hash,
            files.join(", ")
        ))),
        OpenCodePart::Unknown => None,
    }
}

impl OpenCodeEntry {
    /// Convert one aggregated entry into a canonical line
    ///
    /// `tool_use` entries are assistant lines and `tool_result` entries are
    /// user lines, whatever role the export recorded.
    pub fn to_canonical(
        &self,
        index: usize,
        session_seed: &str,
        placeholder: &str,
    ) -> Result<Vec<TranscriptLine>> {
        let role = match self.entry_type.as_str() {
            "user" | "tool_result" => Role::User,
            "assistant" | "tool_use" => Role::Assistant,
            other => bail!("Unknown OpenCode entry type: {}", other),
        };
        let timestamp =
            normalize_timestamp(&self.timestamp).context("OpenCode entry without timestamp")?;

        let blocks: Vec<ContentBlock> = self
            .message
            .content
            .iter()
            .filter_map(|part| convert_part(part, placeholder))
            .collect();
        if blocks.is_empty() {
            return Ok(Vec::new());
        }

        let message = Message::new(role, MessageContent::from_blocks(blocks), self.message.model.clone())
            .with_usage(self.tokens.as_ref().and_then(convert_tokens));
        let session = self.session_id.as_deref().unwrap_or(session_seed);

        Ok(vec![TranscriptLine {
            kind: role.line_kind(),
            message: Some(message),
            uuid: synthetic_uuid(ProviderId::OpenCode, session, index, &self.entry_type),
            timestamp,
            parent_uuid: None,
            cwd: self.cwd.clone(),
            git_branch: None,
            session_id: self.session_id.clone(),
            tool_result_raw: None,
            request_id: None,
        }])
    }
}
