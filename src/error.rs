use crate::providers::ProviderId;
use thiserror::Error;

/// Transcript normalization errors
///
/// Only structurally unrecoverable input surfaces here. Malformed lines,
/// unknown tool shapes and unresolved paths are absorbed by the adapters.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// Every line/entry of the payload failed to convert
    #[error("Unparseable {provider} transcript: no recoverable lines")]
    UnparseableFile { provider: ProviderId },

    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (config loading only, parsing never touches the filesystem)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranscriptError {
    pub fn unparseable(provider: ProviderId) -> Self {
        TranscriptError::UnparseableFile { provider }
    }

    /// Whether the caller should reject the upload outright
    pub fn is_rejected_upload(&self) -> bool {
        matches!(self, TranscriptError::UnparseableFile { .. })
    }
}

/// Convert TranscriptError to String for callers that only carry messages
impl From<TranscriptError> for String {
    fn from(err: TranscriptError) -> String {
        err.to_string()
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> Result<T, TranscriptError>;
}

impl<T, E: Into<TranscriptError>> ErrorContext<T> for Result<T, E> {
    fn context(self, msg: &str) -> Result<T, TranscriptError> {
        self.map_err(|e| {
            let err: TranscriptError = e.into();
            match err {
                TranscriptError::Config(s) => TranscriptError::Config(format!("{}: {}", msg, s)),
                other => other,
            }
        })
    }
}
