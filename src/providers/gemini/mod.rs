//! Gemini CLI provider module
//!
//! Gemini stores one JSON document per session with a top-level `messages`
//! array. The working directory is never recorded, only its SHA-256
//! (`projectHash`), so cwd is recovered by hashing ancestors of file paths
//! mentioned in the session.

pub mod converter;
pub mod types;
pub mod utils;

use anyhow::Context;

use crate::config::ParserConfig;
use crate::error::TranscriptError;
use crate::providers::canonical::converter::LineFold;
use crate::providers::canonical::ParsedTranscript;
use crate::providers::{ProviderAdapter, ProviderId};
use types::{GeminiMessage, GeminiSession};

pub struct GeminiAdapter;

impl ProviderAdapter for GeminiAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::GeminiCode
    }

    fn parse(&self, raw: &str, config: &ParserConfig) -> Result<ParsedTranscript, TranscriptError> {
        let session: GeminiSession = match serde_json::from_str(raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(provider = %self.provider(), "Not a Gemini session document: {}", e);
                return Err(TranscriptError::unparseable(self.provider()));
            }
        };

        let mut fold = LineFold::new(self.provider());
        let mut messages = Vec::with_capacity(session.messages.len());

        for (index, value) in session.messages.iter().enumerate() {
            let converted = serde_json::from_value::<GeminiMessage>(value.clone())
                .context("Failed to parse Gemini message")
                .and_then(|message| {
                    let lines = message.to_canonical(&config.empty_tool_result_placeholder);
                    messages.push(message);
                    lines
                });
            fold.accept(index, converted);
        }

        let cwd = session
            .project_hash
            .as_deref()
            .and_then(|hash| utils::infer_cwd(&messages, hash, config.max_candidate_paths));

        fold.chain_parents();
        fold.finish(raw, session.session_id.clone(), cwd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::project_hash;
    use crate::providers::canonical::LineKind;
    use serde_json::json;

    #[test]
    fn test_parse_session_infers_cwd() {
        let raw = json!({
            "sessionId": "g-1",
            "projectHash": project_hash("/Users/dev/app"),
            "startTime": "2025-10-11T00:00:00Z",
            "messages": [
                {"id": "m1", "timestamp": "2025-10-11T00:00:00Z", "type": "user", "content": "Read the config"},
                {"id": "m2", "timestamp": "2025-10-11T00:00:03Z", "type": "gemini", "content": "", "model": "gemini-2.5-pro",
                 "toolCalls": [{"id": "read_file-1", "name": "read_file", "args": {"absolute_path": "/Users/dev/app/config/app.toml"},
                                "status": "success",
                                "result": [{"functionResponse": {"id": "read_file-1", "name": "read_file", "response": {"output": "port = 8080"}}}]}]},
                {"id": "m3", "timestamp": "2025-10-11T00:00:04Z", "type": "info", "content": "Model switched"},
                {"timestamp": "missing id and type"}
            ]
        })
        .to_string();

        let parsed = GeminiAdapter.parse(&raw, &ParserConfig::default()).unwrap();
        assert_eq!(parsed.session_id, "g-1");
        assert_eq!(parsed.cwd.as_deref(), Some("/Users/dev/app"));
        assert_eq!(parsed.metadata.message_count, 3);
        assert_eq!(parsed.messages[1].kind, LineKind::Assistant);
        assert_eq!(parsed.messages[2].uuid, "read_file-1_result");
        assert_eq!(parsed.messages[2].parent_uuid.as_deref(), Some("read_file-1"));
        assert_eq!(parsed.messages[0].parent_uuid, None);
    }

    #[test]
    fn test_parse_rejects_jsonl() {
        let err = GeminiAdapter
            .parse("{\"type\":\"user\"}\n{\"type\":\"assistant\"}", &ParserConfig::default())
            .unwrap_err();
        assert!(err.is_rejected_upload());
    }

    #[test]
    fn test_parse_without_project_hash() {
        let raw = r#"{"sessionId":"g-2","messages":[{"id":"m1","timestamp":"2025-10-11T00:00:00Z","type":"user","content":"hi /Users/a/b.rs"}]}"#;
        let parsed = GeminiAdapter.parse(raw, &ParserConfig::default()).unwrap();
        assert_eq!(parsed.cwd, None);
    }
}
