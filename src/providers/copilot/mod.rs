//! GitHub Copilot CLI provider module
//!
//! Copilot writes an event log, one JSON event per line. Tool calls can
//! appear twice (in `assistant.message.toolRequests` and again as
//! `tool.execution_start`); the converter keeps the first.

pub mod converter;
pub mod types;

use anyhow::Context;

use crate::config::ParserConfig;
use crate::error::TranscriptError;
use crate::providers::canonical::converter::{split_jsonl, LineFold};
use crate::providers::canonical::ParsedTranscript;
use crate::providers::{ProviderAdapter, ProviderId};
use converter::CopilotConverter;
use types::CopilotEvent;

pub struct CopilotAdapter;

impl ProviderAdapter for CopilotAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::GithubCopilot
    }

    fn parse(&self, raw: &str, config: &ParserConfig) -> Result<ParsedTranscript, TranscriptError> {
        let mut fold = LineFold::new(self.provider());
        let mut converter = CopilotConverter::new();

        for (index, line) in split_jsonl(raw) {
            let converted = serde_json::from_str::<CopilotEvent>(line)
                .context("Failed to parse Copilot event")
                .and_then(|event| converter.convert(&event, &config.empty_tool_result_placeholder));
            fold.accept(index, converted);
        }

        // Parent ids point at state events we drop, so relink linearly
        fold.chain_parents();
        fold.finish(raw, converter.session_id.clone(), converter.cwd.clone())
    }
}
