//! OpenCode provider module
//!
//! Parses the aggregated JSONL export (one line per message, parts inlined).
//! Entries carry no ids, so lines get synthetic ids and a linear chain.

pub mod converter;
pub mod types;

use anyhow::Context;

use crate::config::ParserConfig;
use crate::error::TranscriptError;
use crate::providers::canonical::converter::{fallback_session_id, split_jsonl, LineFold};
use crate::providers::canonical::ParsedTranscript;
use crate::providers::{ProviderAdapter, ProviderId};
use types::OpenCodeEntry;

pub struct OpenCodeAdapter;

impl ProviderAdapter for OpenCodeAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::OpenCode
    }

    fn parse(&self, raw: &str, config: &ParserConfig) -> Result<ParsedTranscript, TranscriptError> {
        let mut fold = LineFold::new(self.provider());
        let seed = fallback_session_id(raw);

        for (index, line) in split_jsonl(raw) {
            let converted = serde_json::from_str::<OpenCodeEntry>(line)
                .context("Failed to parse OpenCode entry")
                .and_then(|entry| {
                    entry.to_canonical(index, &seed, &config.empty_tool_result_placeholder)
                });
            fold.accept(index, converted);
        }

        fold.chain_parents();
        fold.finish(raw, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aggregated_export() {
        let raw = r#"{"sessionId":"ses_1","timestamp":"2025-01-01T00:00:00.000Z","type":"user","message":{"role":"user","content":[{"type":"text","text":"Read the file"}]},"cwd":"/srv/app"}
{"sessionId":"ses_1","timestamp":"2025-01-01T00:00:01.000Z","type":"tool_use","message":{"role":"assistant","content":[{"type":"tool_use","id":"call_1","name":"read","input":{"filePath":"/srv/app/a.ts"}}]}}
{"sessionId":"ses_1","timestamp":"2025-01-01T00:00:02.000Z","type":"tool_result","message":{"role":"tool","content":[{"type":"tool_result","tool_use_id":"call_1","content":""}]}}
{"sessionId":"ses_1","timestamp":"2025-01-01T00:00:03.000Z","type":"mystery","message":{"role":"user","content":[]}}
"#;

        let parsed = OpenCodeAdapter.parse(raw, &ParserConfig::default()).unwrap();
        assert_eq!(parsed.session_id, "ses_1");
        assert_eq!(parsed.cwd.as_deref(), Some("/srv/app"));
        assert_eq!(parsed.metadata.message_count, 3);
        assert_eq!(
            parsed.messages[2].parent_uuid.as_deref(),
            Some(parsed.messages[1].uuid.as_str())
        );

        let again = OpenCodeAdapter.parse(raw, &ParserConfig::default()).unwrap();
        assert_eq!(parsed, again);
    }
}
