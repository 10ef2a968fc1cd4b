use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::providers::canonical::converter::synthetic_uuid;
use crate::providers::canonical::{LineKind, Message, Role, TokenUsage, TranscriptLine};
use crate::providers::common::{normalize_timestamp, parse_message_content};
use crate::providers::ProviderId;

fn str_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_role(role: &str) -> Option<Role> {
    match role.to_ascii_lowercase().as_str() {
        "user" | "human" => Some(Role::User),
        "assistant" | "model" | "ai" | "gemini" => Some(Role::Assistant),
        _ => None,
    }
}

/// Converts canonical or role/content entries, one at a time
///
/// Timestamps are carried forward: an entry without one inherits the
/// previous entry's. `saw_parent_links` records whether the source supplied
/// its own `parentUuid` fields; when it never did the adapter chains lines.
#[derive(Debug)]
pub struct GenericConverter {
    provider: ProviderId,
    session_seed: String,
    last_timestamp: Option<String>,
    pub saw_parent_links: bool,
}

impl GenericConverter {
    pub fn new(provider: ProviderId, session_seed: String) -> Self {
        Self {
            provider,
            session_seed,
            last_timestamp: None,
            saw_parent_links: false,
        }
    }

    pub fn convert(&mut self, index: usize, entry: &Value, placeholder: &str) -> Result<Vec<TranscriptLine>> {
        if !entry.is_object() {
            bail!("Entry is not a JSON object");
        }

        let timestamp = ["timestamp", "created_at", "createdAt"]
            .iter()
            .find_map(|k| entry.get(*k).and_then(normalize_timestamp))
            .or_else(|| self.last_timestamp.clone())
            .unwrap_or_default();
        self.last_timestamp = Some(timestamp.clone()).filter(|t| !t.is_empty());

        let explicit_parent = entry.get("parentUuid");
        if explicit_parent.is_some() {
            self.saw_parent_links = true;
        }

        let session_id = str_field(entry, &["sessionId", "session_id"]);
        let uuid = str_field(entry, &["uuid", "id"]).unwrap_or_else(|| {
            let session = session_id.as_deref().unwrap_or(&self.session_seed);
            synthetic_uuid(self.provider, session, index, "entry")
        });

        let mut line = TranscriptLine {
            kind: LineKind::User,
            message: None,
            uuid,
            timestamp,
            parent_uuid: explicit_parent.and_then(|p| p.as_str()).map(str::to_string),
            cwd: str_field(entry, &["cwd"]),
            git_branch: str_field(entry, &["gitBranch", "git_branch"]),
            session_id,
            tool_result_raw: entry
                .get("toolResultRaw")
                .or_else(|| entry.get("toolUseResult"))
                .cloned(),
            request_id: str_field(entry, &["requestId", "request_id"]),
        };

        if entry.get("type").and_then(|t| t.as_str()) == Some("snapshot") {
            line.kind = LineKind::Snapshot;
            return Ok(vec![line]);
        }

        // Canonical lines nest the message; bare lines are the message
        let message = entry.get("message").filter(|m| m.is_object()).unwrap_or(entry);

        let role = message
            .get("role")
            .and_then(|r| r.as_str())
            .and_then(parse_role)
            .or_else(|| entry.get("type").and_then(|t| t.as_str()).and_then(parse_role))
            .context("Entry has no user or assistant role")?;

        let content = message
            .get("content")
            .and_then(|c| parse_message_content(c, placeholder))
            .filter(|c| !c.is_empty())
            .context("Entry has no content")?;

        let model = str_field(message, &["model"]).or_else(|| str_field(entry, &["model"]));
        let usage = message
            .get("usage")
            .or_else(|| entry.get("usage"))
            .and_then(|u| serde_json::from_value::<TokenUsage>(u.clone()).ok())
            .filter(|u| !u.is_empty());

        line.kind = role.line_kind();
        line.message = Some(Message::new(role, content, model).with_usage(usage));
        Ok(vec![line])
    }
}
