//! Aggregate statistics over a parsed transcript
//!
//! Computed once at upload and stored beside the transcript. Nothing here
//! fails: a statistic the source cannot support is left out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::providers::canonical::converter::split_jsonl;
use crate::providers::canonical::{ContentBlock, LineKind, ParsedTranscript, TokenUsage};
use crate::providers::common::duration_ms;
use crate::providers::ProviderId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_message_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_stats: Option<Vec<ModelStat>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_counts: Option<TokenCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStat {
    pub model: String,
    pub count: usize,
    /// Share of model-tagged assistant messages, one decimal place
    pub percentage: f64,
}

/// Summed usage; `None` fields were never reported by the source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCounts {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_read_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_write_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_tokens: Option<u64>,
}

impl From<TokenUsage> for TokenCounts {
    fn from(usage: TokenUsage) -> Self {
        let input_tokens = usage.input_tokens.unwrap_or(0);
        let output_tokens = usage.output_tokens.unwrap_or(0);
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
            cache_read_tokens: usage.cache_read_input_tokens,
            cache_write_tokens: usage.cache_creation_input_tokens,
            thinking_tokens: usage.thinking_tokens,
            tool_tokens: usage.tool_tokens,
        }
    }
}

/// Compute transcript metadata in one pass over the lines
///
/// Lines that share a `requestId` are fragments of one streamed response
/// and repeat its usage, so only the last fragment's usage is counted.
pub fn calculate_metadata(parsed: &ParsedTranscript, raw: &str, provider: ProviderId) -> TranscriptMetadata {
    let mut user_messages = 0;
    let mut assistant_messages = 0;
    let mut tool_calls = 0;
    let mut models: HashMap<&str, usize> = HashMap::new();

    let mut usage_total: Option<TokenUsage> = None;
    let mut by_request: Vec<&TokenUsage> = Vec::new();
    let mut request_slots: HashMap<&str, usize> = HashMap::new();

    for line in &parsed.messages {
        let Some(message) = line.message.as_ref() else {
            continue;
        };

        match line.kind {
            LineKind::User => user_messages += 1,
            LineKind::Assistant => {
                assistant_messages += 1;
                tool_calls += message
                    .blocks()
                    .into_iter()
                    .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
                    .count();
                if let Some(model) = message.model.as_deref() {
                    *models.entry(model).or_insert(0) += 1;
                }
            }
            LineKind::Snapshot => {}
        }

        if let Some(usage) = message.usage.as_ref() {
            match line.request_id.as_deref() {
                Some(request_id) => match request_slots.get(request_id) {
                    Some(&slot) => by_request[slot] = usage,
                    None => {
                        request_slots.insert(request_id, by_request.len());
                        by_request.push(usage);
                    }
                },
                None => usage_total.get_or_insert_with(TokenUsage::default).accumulate(usage),
            }
        }
    }

    for usage in by_request {
        usage_total
            .get_or_insert_with(TokenUsage::default)
            .accumulate(usage);
    }

    let metadata = TranscriptMetadata {
        cwd: parsed.cwd.clone().or_else(|| cwd_from_raw(raw)),
        user_message_count: Some(user_messages),
        assistant_message_count: Some(assistant_messages),
        tool_call_count: Some(tool_calls),
        model_stats: model_stats(models),
        token_counts: usage_total.map(TokenCounts::from),
        duration_ms: duration_ms(
            &parsed.metadata.first_timestamp,
            &parsed.metadata.last_timestamp,
        ),
    };

    tracing::debug!(
        provider = %provider,
        users = user_messages,
        assistants = assistant_messages,
        tool_calls,
        "Calculated transcript metadata"
    );

    metadata
}

fn model_stats(models: HashMap<&str, usize>) -> Option<Vec<ModelStat>> {
    let total: usize = models.values().sum();
    if total == 0 {
        return None;
    }

    let mut stats: Vec<ModelStat> = models
        .into_iter()
        .map(|(model, count)| ModelStat {
            model: model.to_string(),
            count,
            percentage: (count as f64 * 1000.0 / total as f64).round() / 10.0,
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.model.cmp(&b.model)));
    Some(stats)
}

fn find_cwd(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .get("cwd")
            .and_then(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .or_else(|| map.values().find_map(find_cwd)),
        Value::Array(items) => items.iter().find_map(find_cwd),
        _ => None,
    }
}

/// First `cwd` field anywhere in the payload
fn cwd_from_raw(raw: &str) -> Option<String> {
    if let Ok(doc) = serde_json::from_str::<Value>(raw) {
        return find_cwd(&doc);
    }
    split_jsonl(raw)
        .filter_map(|(_, line)| serde_json::from_str::<Value>(line).ok())
        .find_map(|value| find_cwd(&value))
}
