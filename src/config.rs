use crate::error::{ErrorContext, TranscriptError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DETECTION_SAMPLE_LINES: usize = 25;
pub const DEFAULT_EMPTY_TOOL_RESULT: &str = "(no output)";
pub const DEFAULT_MAX_CANDIDATE_PATHS: usize = 200;

/// Tunables for transcript parsing
///
/// Stored as camelCase JSON alongside the rest of the GuideMode config.
/// Every field is optional in the file; missing fields take defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserConfig {
    /// How many JSONL lines the detector samples
    pub detection_sample_lines: usize,

    /// Content used for tool results that arrive empty
    pub empty_tool_result_placeholder: String,

    /// Upper bound on candidate paths probed for Gemini project hashes
    pub max_candidate_paths: usize,

    /// Retry with the generic adapter when the detected adapter recovers nothing
    pub fallback_to_generic: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            detection_sample_lines: DEFAULT_DETECTION_SAMPLE_LINES,
            empty_tool_result_placeholder: DEFAULT_EMPTY_TOOL_RESULT.to_string(),
            max_candidate_paths: DEFAULT_MAX_CANDIDATE_PATHS,
            fallback_to_generic: true,
        }
    }
}

pub fn get_config_dir() -> Result<PathBuf, TranscriptError> {
    dirs::home_dir()
        .map(|home_dir| home_dir.join(".guidemode"))
        .ok_or_else(|| TranscriptError::Config("Could not find home directory".to_string()))
}

pub fn get_config_file_path() -> Result<PathBuf, TranscriptError> {
    Ok(get_config_dir()?.join("transcript-parser.json"))
}

/// Load parser config from `~/.guidemode/transcript-parser.json`
///
/// A missing file is not an error: defaults are returned.
pub fn load_config() -> Result<ParserConfig, TranscriptError> {
    let config_file = get_config_file_path()?;

    if config_file.exists() {
        load_config_from(&config_file)
    } else {
        Ok(ParserConfig::default())
    }
}

pub fn load_config_from(path: &Path) -> Result<ParserConfig, TranscriptError> {
    let content = fs::read_to_string(path)?;
    let config: ParserConfig = serde_json::from_str(&content)
        .map_err(|e| TranscriptError::Config(e.to_string()))
        .context(&format!("Failed to parse {}", path.display()))?;

    if config.detection_sample_lines == 0 {
        return Err(TranscriptError::Config(
            "detectionSampleLines must be at least 1".to_string(),
        ));
    }

    Ok(config)
}

pub fn save_config_to(path: &Path, config: &ParserConfig) -> Result<(), TranscriptError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
