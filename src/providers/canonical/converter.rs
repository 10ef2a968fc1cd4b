use super::{LineKind, ParsedTranscript, TranscriptLine};
use crate::error::TranscriptError;
use crate::providers::ProviderId;
use anyhow::Result;
use uuid::Uuid;

/// Fold over per-line conversion results
///
/// Successful lines are accumulated, failed lines are dropped with a debug
/// log. `finish` promotes "nothing recovered" to a hard error; that is the
/// only fatal outcome of a parse.
#[derive(Debug)]
pub struct LineFold {
    provider: ProviderId,
    lines: Vec<TranscriptLine>,
    skipped: usize,
}

impl LineFold {
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            lines: Vec::new(),
            skipped: 0,
        }
    }

    /// Accept one source line's conversion
    ///
    /// `Ok(vec![])` means the line was understood but carries nothing to
    /// render (e.g. a state update); it is neither kept nor counted as a skip.
    pub fn accept(&mut self, index: usize, converted: Result<Vec<TranscriptLine>>) {
        match converted {
            Ok(lines) => self.lines.extend(lines),
            Err(e) => {
                self.skipped += 1;
                tracing::debug!(
                    provider = %self.provider,
                    line = index + 1,
                    "Skipping malformed entry: {}",
                    e
                );
            }
        }
    }

    pub fn push(&mut self, line: TranscriptLine) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Link every line to its predecessor (sources without parent ids)
    pub fn chain_parents(&mut self) {
        chain_parents(&mut self.lines);
    }

    pub fn last_assistant_mut(&mut self) -> Option<&mut TranscriptLine> {
        self.lines
            .iter_mut()
            .rev()
            .find(|l| l.kind == LineKind::Assistant)
    }

    /// Finish the fold into a transcript
    ///
    /// When the source never supplied a session id, one is derived from the
    /// raw content so reparsing identical bytes yields the same id.
    pub fn finish(
        self,
        raw: &str,
        session_id: Option<String>,
        cwd: Option<String>,
    ) -> Result<ParsedTranscript, TranscriptError> {
        if self.lines.is_empty() {
            tracing::debug!(
                provider = %self.provider,
                skipped = self.skipped,
                "No recoverable lines"
            );
            return Err(TranscriptError::unparseable(self.provider));
        }

        if self.skipped > 0 {
            tracing::info!(
                provider = %self.provider,
                kept = self.lines.len(),
                skipped = self.skipped,
                "Parsed transcript with skipped entries"
            );
        }

        let session_id = session_id
            .filter(|s| !s.is_empty())
            .or_else(|| self.lines.iter().find_map(|l| l.session_id.clone()))
            .unwrap_or_else(|| fallback_session_id(raw));

        let cwd = cwd
            .filter(|c| !c.is_empty())
            .or_else(|| self.lines.iter().find_map(|l| l.cwd.clone()));

        Ok(ParsedTranscript::from_lines(
            self.lines,
            session_id,
            cwd,
            self.provider,
        ))
    }
}

/// Non-blank lines of a JSONL payload with their zero-based line index
pub fn split_jsonl(raw: &str) -> impl Iterator<Item = (usize, &str)> {
    raw.lines()
        .enumerate()
        .map(|(i, l)| (i, l.trim()))
        .filter(|(_, l)| !l.is_empty())
}

/// Deterministic id for a line whose source carries none
pub fn synthetic_uuid(provider: ProviderId, session: &str, index: usize, discriminator: &str) -> String {
    let name = format!("{}/{}/{}/{}", provider, session, index, discriminator);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

/// Deterministic session id derived from the payload itself
pub fn fallback_session_id(raw: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.as_bytes()).to_string()
}

/// Chain lines linearly, each pointing at its predecessor
///
/// Only used when the source has no parent links of its own.
pub fn chain_parents(lines: &mut [TranscriptLine]) {
    let mut previous: Option<String> = None;
    for line in lines.iter_mut() {
        line.parent_uuid = previous.take();
        previous = Some(line.uuid.clone());
    }
}
