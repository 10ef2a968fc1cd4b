// Transcript normalization for AI coding-assistant session logs.
// Modules are public so integration tests and the inspect binary can reach them.

pub mod config;
pub mod detection;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod parser;
pub mod patch;
pub mod paths;
pub mod providers;
pub mod title;
pub mod tools;

pub use config::ParserConfig;
pub use detection::{Detection, FormatDetector};
pub use error::TranscriptError;
pub use metadata::{calculate_metadata, TranscriptMetadata};
pub use parser::{ingest_upload, parse_transcript, IngestedTranscript, TranscriptParser};
pub use patch::{parse_patch, ParsedFile};
pub use paths::{infer_project_path, make_relative};
pub use providers::canonical::{ContentBlock, ParsedTranscript, TranscriptLine};
pub use providers::{ProviderAdapter, ProviderId};
pub use title::is_machine_identifier;
pub use tools::{classify_tool, ToolAction};
