//! Format detection
//!
//! Producers change their formats without version markers, so detection
//! scores structural signals instead of validating schemas. Each provider
//! has weighted signals; provider-unique keys weigh more than generic ones
//! like `role`. The highest total wins and ties go to the earlier provider
//! in [`PRIORITY`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ParserConfig;
use crate::providers::copilot::types::KNOWN_EVENTS;
use crate::providers::ProviderId;

/// Tie-break order, most specific first
pub const PRIORITY: [ProviderId; 6] = [
    ProviderId::GeminiCode,
    ProviderId::Codex,
    ProviderId::GithubCopilot,
    ProviderId::ClaudeCode,
    ProviderId::OpenCode,
    ProviderId::Generic,
];

const CODEX_TYPES: &[&str] = &["session_meta", "response_item", "event_msg", "turn_context"];

/// Best guess for a payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub provider: ProviderId,
    /// Winner's share of all signal weight, 0.0 when nothing matched
    pub confidence: f64,
}

impl Detection {
    pub fn unrecognized() -> Self {
        Self {
            provider: ProviderId::Generic,
            confidence: 0.0,
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.confidence > 0.0
    }
}

/// Accumulated signal weight per provider, indexed like [`PRIORITY`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalScores([u32; PRIORITY.len()]);

impl SignalScores {
    fn index(provider: ProviderId) -> usize {
        // Cursor uploads arrive in canonical form
        let provider = match provider {
            ProviderId::Cursor => ProviderId::Generic,
            other => other,
        };
        PRIORITY
            .iter()
            .position(|p| *p == provider)
            .unwrap_or(PRIORITY.len() - 1)
    }

    fn add(&mut self, provider: ProviderId, weight: u32) {
        self.0[Self::index(provider)] += weight;
    }

    pub fn score(&self, provider: ProviderId) -> u32 {
        self.0[Self::index(provider)]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Highest score, earlier priority winning ties
    pub fn winner(&self) -> Option<(ProviderId, u32)> {
        let mut best: Option<(ProviderId, u32)> = None;
        for (provider, score) in PRIORITY.iter().zip(self.0) {
            if score > 0 && best.is_none_or(|(_, b)| score > b) {
                best = Some((*provider, score));
            }
        }
        best
    }

    pub fn detection(&self) -> Detection {
        match self.winner() {
            Some((provider, score)) => Detection {
                provider,
                confidence: f64::from(score) / f64::from(self.total()),
            },
            None => Detection::unrecognized(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormatDetector {
    sample_lines: usize,
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::from_config(&ParserConfig::default())
    }
}

impl FormatDetector {
    pub fn new(sample_lines: usize) -> Self {
        Self {
            sample_lines: sample_lines.max(1),
        }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.detection_sample_lines)
    }

    /// Detect the provider of a payload; never fails
    pub fn detect(&self, raw: &str) -> Detection {
        let scores = self.score(raw);
        let detection = scores.detection();
        tracing::debug!(
            provider = %detection.provider,
            confidence = detection.confidence,
            scores = ?scores,
            "Detected transcript format"
        );
        detection
    }

    /// Signal weights for every provider
    pub fn score(&self, raw: &str) -> SignalScores {
        let mut scores = SignalScores::default();

        // Whole-document formats first
        let trimmed = raw.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Object(doc)) => {
                    score_document(&doc, &mut scores);
                    score_line(&doc, &mut scores);
                    return scores;
                }
                Ok(Value::Array(items)) => {
                    for item in items.iter().filter_map(|v| v.as_object()).take(self.sample_lines) {
                        score_line(item, &mut scores);
                    }
                    return scores;
                }
                _ => {}
            }
        }

        let sample = raw
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with('{'))
            .filter_map(|l| serde_json::from_str::<Map<String, Value>>(l).ok())
            .take(self.sample_lines);
        for line in sample {
            score_line(&line, &mut scores);
        }

        scores
    }
}

fn type_of(obj: &Map<String, Value>) -> Option<&str> {
    obj.get("type").and_then(|t| t.as_str())
}

/// Signals only a single-document payload can carry
fn score_document(doc: &Map<String, Value>, scores: &mut SignalScores) {
    let messages = doc.get("messages").and_then(|m| m.as_array());

    if doc.contains_key("projectHash") {
        scores.add(ProviderId::GeminiCode, 5);
    }
    if doc.contains_key("sessionId") && messages.is_some() {
        scores.add(ProviderId::GeminiCode, 3);
    }
    if let Some(messages) = messages {
        if messages.iter().any(|m| m.get("type").and_then(|t| t.as_str()) == Some("gemini")) {
            scores.add(ProviderId::GeminiCode, 3);
        }
        scores.add(ProviderId::Generic, 1);
    }
}

/// Signals carried by one JSONL line (or array element)
fn score_line(obj: &Map<String, Value>, scores: &mut SignalScores) {
    let kind = type_of(obj);

    // Codex: typed envelope around a payload
    if obj.contains_key("payload") && kind.is_some_and(|k| CODEX_TYPES.contains(&k)) {
        scores.add(ProviderId::Codex, 4);
    }

    // Copilot: dotted event names with a data object
    if let Some(k) = kind.filter(|k| k.contains('.') && obj.contains_key("data")) {
        let weight = if KNOWN_EVENTS.contains(&k) { 4 } else { 2 };
        scores.add(ProviderId::GithubCopilot, weight);
    }

    // Claude Code
    if obj.contains_key("parentUuid") {
        scores.add(ProviderId::ClaudeCode, 3);
    }
    if obj.contains_key("isSidechain") {
        scores.add(ProviderId::ClaudeCode, 3);
    }
    if obj.contains_key("userType") {
        scores.add(ProviderId::ClaudeCode, 2);
    }
    if kind == Some("file-history-snapshot") {
        scores.add(ProviderId::ClaudeCode, 4);
    }
    if kind == Some("summary") && obj.contains_key("leafUuid") {
        scores.add(ProviderId::ClaudeCode, 4);
    }
    if obj.contains_key("requestId") {
        scores.add(ProviderId::ClaudeCode, 1);
    }

    // OpenCode aggregated export
    let content_array = obj
        .get("message")
        .and_then(|m| m.get("content"))
        .is_some_and(|c| c.is_array());
    if matches!(kind, Some("tool_use" | "tool_result")) && obj.contains_key("message") {
        scores.add(ProviderId::OpenCode, 3);
    }
    if obj.contains_key("sessionId") && content_array && !obj.contains_key("uuid") {
        scores.add(ProviderId::OpenCode, 2);
    }

    // Weak hints shared by many shapes
    for key in ["provider", "role", "message"] {
        if obj.contains_key(key) {
            scores.add(ProviderId::Generic, 1);
        }
    }
}
