use crate::config::ParserConfig;
use crate::error::TranscriptError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod canonical; // Canonical transcript types and the line fold
pub mod claude; // Claude Code JSONL
pub mod codex; // Codex rollout JSONL
pub mod common;
pub mod copilot; // GitHub Copilot CLI events JSONL
pub mod gemini; // Gemini CLI session JSON
pub mod generic; // Canonical/role-content fallback
pub mod opencode; // OpenCode exported JSONL

use canonical::ParsedTranscript;

/// Known transcript sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    #[serde(rename = "claude-code")]
    ClaudeCode,
    #[serde(rename = "codex")]
    Codex,
    #[serde(rename = "gemini-code")]
    GeminiCode,
    #[serde(rename = "github-copilot")]
    GithubCopilot,
    #[serde(rename = "opencode")]
    OpenCode,
    #[serde(rename = "cursor")]
    Cursor,
    #[serde(rename = "generic")]
    Generic,
}

impl ProviderId {
    pub const ALL: [ProviderId; 7] = [
        ProviderId::ClaudeCode,
        ProviderId::Codex,
        ProviderId::GeminiCode,
        ProviderId::GithubCopilot,
        ProviderId::OpenCode,
        ProviderId::Cursor,
        ProviderId::Generic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::ClaudeCode => "claude-code",
            ProviderId::Codex => "codex",
            ProviderId::GeminiCode => "gemini-code",
            ProviderId::GithubCopilot => "github-copilot",
            ProviderId::OpenCode => "opencode",
            ProviderId::Cursor => "cursor",
            ProviderId::Generic => "generic",
        }
    }

    /// Human-facing name used in default titles
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderId::ClaudeCode => "Claude Code",
            ProviderId::Codex => "Codex",
            ProviderId::GeminiCode => "Gemini Code",
            ProviderId::GithubCopilot => "GitHub Copilot",
            ProviderId::OpenCode => "OpenCode",
            ProviderId::Cursor => "Cursor",
            ProviderId::Generic => "Generic",
        }
    }

    /// Resolve a caller-supplied hint, accepting short aliases
    pub fn from_hint(hint: &str) -> Option<ProviderId> {
        match hint.trim().to_ascii_lowercase().as_str() {
            "claude-code" | "claude" => Some(ProviderId::ClaudeCode),
            "codex" => Some(ProviderId::Codex),
            "gemini-code" | "gemini" => Some(ProviderId::GeminiCode),
            "github-copilot" | "copilot" => Some(ProviderId::GithubCopilot),
            "opencode" => Some(ProviderId::OpenCode),
            "cursor" => Some(ProviderId::Cursor),
            "generic" => Some(ProviderId::Generic),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalizer for one source format
///
/// Implementations absorb malformed lines and only fail when nothing at all
/// could be recovered.
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> ProviderId;

    fn parse(&self, raw: &str, config: &ParserConfig) -> Result<ParsedTranscript, TranscriptError>;
}

static CLAUDE: claude::ClaudeAdapter = claude::ClaudeAdapter;
static CODEX: codex::CodexAdapter = codex::CodexAdapter;
static GEMINI: gemini::GeminiAdapter = gemini::GeminiAdapter;
static COPILOT: copilot::CopilotAdapter = copilot::CopilotAdapter;
static OPENCODE: opencode::OpenCodeAdapter = opencode::OpenCodeAdapter;
static CURSOR: generic::GenericAdapter = generic::GenericAdapter::new(ProviderId::Cursor);
static GENERIC: generic::GenericAdapter = generic::GenericAdapter::new(ProviderId::Generic);

pub fn adapter_for(provider: ProviderId) -> &'static dyn ProviderAdapter {
    match provider {
        ProviderId::ClaudeCode => &CLAUDE,
        ProviderId::Codex => &CODEX,
        ProviderId::GeminiCode => &GEMINI,
        ProviderId::GithubCopilot => &COPILOT,
        ProviderId::OpenCode => &OPENCODE,
        // Cursor exports are already role/content shaped
        ProviderId::Cursor => &CURSOR,
        ProviderId::Generic => &GENERIC,
    }
}
