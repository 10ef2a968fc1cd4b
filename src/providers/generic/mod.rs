//! Generic provider module
//!
//! Accepts transcripts already in canonical shape (what the desktop client
//! uploads for Cursor) and simple role/content logs, either as JSONL or as
//! one `{messages: [...]}` document. Also the facade's last resort when the
//! detected adapter recovers nothing.

pub mod converter;

use serde_json::Value;

use crate::config::ParserConfig;
use crate::error::TranscriptError;
use crate::providers::canonical::converter::{fallback_session_id, split_jsonl, LineFold};
use crate::providers::canonical::ParsedTranscript;
use crate::providers::{ProviderAdapter, ProviderId};
use converter::GenericConverter;

pub struct GenericAdapter {
    provider: ProviderId,
}

impl GenericAdapter {
    pub const fn new(provider: ProviderId) -> Self {
        Self { provider }
    }
}

/// Entries of a single-document payload, or `None` for JSONL
fn document_entries(raw: &str) -> Option<(Vec<Value>, Option<String>)> {
    let trimmed = raw.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }

    match serde_json::from_str::<Value>(raw).ok()? {
        Value::Array(items) => Some((items, None)),
        Value::Object(mut doc) => {
            let session_id = doc
                .get("sessionId")
                .and_then(|s| s.as_str())
                .map(str::to_string);
            match doc.remove("messages") {
                Some(Value::Array(items)) => Some((items, session_id)),
                // A single-line JSONL payload
                _ => None,
            }
        }
        _ => None,
    }
}

impl ProviderAdapter for GenericAdapter {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    fn parse(&self, raw: &str, config: &ParserConfig) -> Result<ParsedTranscript, TranscriptError> {
        let mut fold = LineFold::new(self.provider);
        let seed = fallback_session_id(raw);
        let mut converter = GenericConverter::new(self.provider, seed);
        let placeholder = &config.empty_tool_result_placeholder;

        let session_id = match document_entries(raw) {
            Some((entries, session_id)) => {
                for (index, entry) in entries.iter().enumerate() {
                    fold.accept(index, converter.convert(index, entry, placeholder));
                }
                session_id
            }
            None => {
                for (index, line) in split_jsonl(raw) {
                    let converted = serde_json::from_str::<Value>(line)
                        .map_err(anyhow::Error::from)
                        .and_then(|entry| converter.convert(index, &entry, placeholder));
                    fold.accept(index, converted);
                }
                None
            }
        };

        if !converter.saw_parent_links {
            fold.chain_parents();
        }
        fold.finish(raw, session_id, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::canonical::LineKind;

    #[test]
    fn test_messages_document() {
        let raw = r#"{"sessionId":"doc-1","messages":[
            {"role":"user","content":"Hi","timestamp":"2025-02-01T10:00:00Z"},
            {"role":"assistant","content":[{"type":"text","text":"Hello"},{"type":"tool_use","id":"t1","name":"search","input":{"q":"x"}}],"model":"gpt-4o"},
            {"role":"user","content":[{"type":"tool_result","tool_use_id":"t1","content":[{"type":"text","text":"found"}]}]}
        ]}"#;

        let parsed = GenericAdapter::new(ProviderId::Generic)
            .parse(raw, &ParserConfig::default())
            .unwrap();
        assert_eq!(parsed.session_id, "doc-1");
        assert_eq!(parsed.metadata.message_count, 3);
        assert_eq!(parsed.messages[1].parent_uuid.as_deref(), Some(parsed.messages[0].uuid.as_str()));
        assert_eq!(parsed.messages[2].timestamp, "2025-02-01T10:00:00Z");
    }

    #[test]
    fn test_canonical_jsonl_keeps_parent_links() {
        let raw = r#"{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"cur-1","timestamp":"2025-02-01T10:00:00.000Z","message":{"role":"user","content":"Hi"}}
{"type":"assistant","uuid":"a1","parentUuid":"u1","sessionId":"cur-1","timestamp":"2025-02-01T10:00:02.000Z","message":{"role":"assistant","content":"Hello","model":"gpt-5"}}
{"type":"snapshot","uuid":"snap","parentUuid":"a1","timestamp":"2025-02-01T10:00:03.000Z"}
"#;

        let parsed = GenericAdapter::new(ProviderId::Cursor)
            .parse(raw, &ParserConfig::default())
            .unwrap();
        assert_eq!(parsed.provider, ProviderId::Cursor);
        assert_eq!(parsed.session_id, "cur-1");
        assert_eq!(parsed.messages[0].parent_uuid, None);
        assert_eq!(parsed.messages[2].kind, LineKind::Snapshot);
        assert_eq!(parsed.messages[2].parent_uuid.as_deref(), Some("a1"));
    }

    #[test]
    fn test_single_line_jsonl() {
        let raw = r#"{"role":"user","content":"only line"}"#;
        let parsed = GenericAdapter::new(ProviderId::Generic)
            .parse(raw, &ParserConfig::default())
            .unwrap();
        assert_eq!(parsed.metadata.message_count, 1);
        assert_eq!(parsed.metadata.first_timestamp, "");
    }

    #[test]
    fn test_plain_text_is_unparseable() {
        let err = GenericAdapter::new(ProviderId::Generic)
            .parse("just some notes\nfrom a meeting", &ParserConfig::default())
            .unwrap_err();
        assert!(err.is_rejected_upload());
    }
}
