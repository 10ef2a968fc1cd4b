//! Parse facade: detection, adapter dispatch and validation
//!
//! ```no_run
//! use guidemode_transcript::{parse_transcript, ProviderId};
//!
//! let raw = std::fs::read_to_string("session.jsonl").unwrap();
//! let transcript = parse_transcript(&raw, Some("claude-code")).unwrap();
//! assert_eq!(transcript.provider, ProviderId::ClaudeCode);
//! ```

use std::collections::HashSet;

use serde::Serialize;

use crate::config::ParserConfig;
use crate::detection::FormatDetector;
use crate::error::TranscriptError;
use crate::metadata::{calculate_metadata, TranscriptMetadata};
use crate::providers::canonical::ParsedTranscript;
use crate::providers::{adapter_for, ProviderId};
use crate::title::resolve_title;

pub struct TranscriptParser {
    config: ParserConfig,
    detector: FormatDetector,
}

impl Default for TranscriptParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl TranscriptParser {
    pub fn new(config: ParserConfig) -> Self {
        let detector = FormatDetector::from_config(&config);
        Self { config, detector }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Pick the adapter for a payload
    ///
    /// A hint wins when the content carries any of its signals, or when the
    /// content is not recognized at all. A hint contradicted by the content
    /// is replaced by the detected provider.
    pub fn resolve_provider(&self, raw: &str, hint: Option<&str>) -> ProviderId {
        let scores = self.detector.score(raw);
        let detection = scores.detection();

        let hinted = hint.and_then(|h| {
            let provider = ProviderId::from_hint(h);
            if provider.is_none() {
                tracing::warn!(hint = h, "Ignoring unknown provider hint");
            }
            provider
        });

        match hinted {
            Some(provider) if scores.score(provider) > 0 || !detection.is_recognized() => provider,
            Some(provider) => {
                tracing::warn!(
                    hint = %provider,
                    detected = %detection.provider,
                    confidence = detection.confidence,
                    "Content does not match provider hint, using detected provider"
                );
                detection.provider
            }
            None => detection.provider,
        }
    }

    /// Parse a raw payload into a canonical transcript
    ///
    /// `UnparseableFile` is the only error. When the chosen adapter recovers
    /// nothing the payload is retried once as generic canonical content.
    pub fn parse(&self, raw: &str, hint: Option<&str>) -> Result<ParsedTranscript, TranscriptError> {
        let provider = self.resolve_provider(raw, hint);

        let parsed = match adapter_for(provider).parse(raw, &self.config) {
            Ok(parsed) => parsed,
            Err(e) if self.should_fall_back(provider, &e) => {
                tracing::warn!(
                    provider = %provider,
                    "No lines recovered, retrying as generic transcript"
                );
                adapter_for(ProviderId::Generic)
                    .parse(raw, &self.config)
                    .map_err(|_| e)?
            }
            Err(e) => return Err(e),
        };

        let parsed = drop_duplicate_uuids(parsed);
        tracing::info!(
            provider = %parsed.provider,
            session_id = %parsed.session_id,
            messages = parsed.metadata.message_count,
            "Parsed transcript"
        );
        Ok(parsed)
    }

    fn should_fall_back(&self, provider: ProviderId, error: &TranscriptError) -> bool {
        self.config.fallback_to_generic
            && error.is_rejected_upload()
            && !matches!(provider, ProviderId::Generic | ProviderId::Cursor)
    }
}

/// Keep the first line for each uuid
fn drop_duplicate_uuids(parsed: ParsedTranscript) -> ParsedTranscript {
    let mut seen = HashSet::new();
    if parsed.messages.iter().all(|l| seen.insert(l.uuid.clone())) {
        return parsed;
    }

    let ParsedTranscript {
        messages,
        session_id,
        cwd,
        provider,
        ..
    } = parsed;
    let before = messages.len();

    let mut seen = HashSet::new();
    let messages: Vec<_> = messages
        .into_iter()
        .filter(|l| seen.insert(l.uuid.clone()))
        .collect();

    tracing::debug!(
        provider = %provider,
        dropped = before - messages.len(),
        "Dropped lines with duplicate uuids"
    );
    ParsedTranscript::from_lines(messages, session_id, cwd, provider)
}

/// Parse with the default configuration
pub fn parse_transcript(raw: &str, hint: Option<&str>) -> Result<ParsedTranscript, TranscriptError> {
    TranscriptParser::default().parse(raw, hint)
}

/// Everything the upload boundary stores for one session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestedTranscript {
    pub transcript: ParsedTranscript,
    pub metadata: TranscriptMetadata,
    pub title: String,
}

/// Parse, compute metadata and settle the title for an uploaded session
///
/// Machine-generated titles (file names, ids) are replaced by
/// `"{Provider} - {Month Day, Year}"`.
pub fn ingest_upload(
    raw: &str,
    hint: Option<&str>,
    title: Option<&str>,
    config: &ParserConfig,
) -> Result<IngestedTranscript, TranscriptError> {
    let transcript = TranscriptParser::new(config.clone()).parse(raw, hint)?;
    let metadata = calculate_metadata(&transcript, raw, transcript.provider);
    let title = resolve_title(title, transcript.provider, &transcript.metadata.first_timestamp);

    Ok(IngestedTranscript {
        transcript,
        metadata,
        title,
    })
}
