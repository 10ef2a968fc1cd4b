//! Codex provider module
//!
//! Normalizes Codex CLI rollout files (`~/.codex/sessions/**/rollout-*.jsonl`).
//! Lines carry no ids, so every line gets a deterministic synthetic uuid and
//! the transcript is chained linearly.

pub mod converter;
pub mod types;

use anyhow::Context;

use crate::config::ParserConfig;
use crate::error::TranscriptError;
use crate::providers::canonical::converter::{split_jsonl, LineFold};
use crate::providers::canonical::{LineKind, ParsedTranscript, TokenUsage, TranscriptLine};
use crate::providers::{ProviderAdapter, ProviderId};
use converter::{CodexConverter, CodexItem};
use types::CodexMessage;

pub struct CodexAdapter;

fn attach_usage(line: &mut TranscriptLine, usage: &TokenUsage) {
    if let Some(message) = line.message.as_mut() {
        match message.usage.as_mut() {
            Some(existing) => existing.accumulate(usage),
            None => message.usage = Some(usage.clone()),
        }
    }
}

impl ProviderAdapter for CodexAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Codex
    }

    fn parse(&self, raw: &str, config: &ParserConfig) -> Result<ParsedTranscript, TranscriptError> {
        let mut fold = LineFold::new(self.provider());
        let mut converter = CodexConverter::new();
        let mut pending_usage: Option<TokenUsage> = None;

        for (index, line) in split_jsonl(raw) {
            let converted = serde_json::from_str::<CodexMessage>(line)
                .context("Failed to parse Codex line")
                .and_then(|msg| {
                    converter.convert(&msg, index, &config.empty_tool_result_placeholder)
                });

            match converted {
                Ok(CodexItem::Usage(usage)) => match fold.last_assistant_mut() {
                    Some(line) => attach_usage(line, &usage),
                    None => match pending_usage.as_mut() {
                        Some(pending) => pending.accumulate(&usage),
                        None => pending_usage = Some(usage),
                    },
                },
                Ok(CodexItem::Lines(mut lines)) => {
                    if let Some(usage) = pending_usage.take() {
                        match lines.iter_mut().find(|l| l.kind == LineKind::Assistant) {
                            Some(line) => attach_usage(line, &usage),
                            None => pending_usage = Some(usage),
                        }
                    }
                    fold.accept(index, Ok(lines));
                }
                Ok(CodexItem::Nothing) => {}
                Err(e) => fold.accept(index, Err(e)),
            }
        }

        fold.chain_parents();
        fold.finish(raw, converter.session_id.clone(), converter.cwd.clone())
    }
}
