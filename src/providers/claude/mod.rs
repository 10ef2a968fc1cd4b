//! Claude Code provider module
//!
//! Normalizes native Claude Code JSONL (`~/.claude/projects/**/*.jsonl`).
//!
//! ## Key Responsibilities
//!
//! - **Filter system events**: drop summary, system and unknown entries
//! - **Snapshots**: keep file-history snapshots as `snapshot` lines
//! - **User markup**: split slash-command and shell markup into blocks
//! - **Tool results**: flatten array results to one string

pub mod converter;
pub mod tags;
pub mod types;

use anyhow::Context;

use crate::config::ParserConfig;
use crate::error::TranscriptError;
use crate::providers::canonical::converter::{split_jsonl, LineFold};
use crate::providers::canonical::ParsedTranscript;
use crate::providers::{ProviderAdapter, ProviderId};
use types::ClaudeEntry;

pub struct ClaudeAdapter;

impl ProviderAdapter for ClaudeAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::ClaudeCode
    }

    fn parse(&self, raw: &str, config: &ParserConfig) -> Result<ParsedTranscript, TranscriptError> {
        let mut fold = LineFold::new(self.provider());

        for (index, line) in split_jsonl(raw) {
            let converted = serde_json::from_str::<ClaudeEntry>(line)
                .context("Failed to parse Claude entry")
                .and_then(|entry| entry.to_canonical(index, &config.empty_tool_result_placeholder));
            fold.accept(index, converted);
        }

        fold.finish(raw, None, None)
    }
}
