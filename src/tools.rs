//! Structured views of tool calls, keyed by tool name
//!
//! Tool inputs stay opaque `Value`s on the canonical model since every
//! provider names and shapes them differently. Callers that want structure
//! ask for a [`ToolAction`]: common tools are recognized by name, anything
//! else (or a known tool missing its key field) comes back as `Opaque`.

use serde::Serialize;
use serde_json::Value;

use crate::patch::{parse_patch, patch_text_from_tool_input, ParsedFile};
use crate::providers::canonical::ContentBlock;

const PATH_KEYS: &[&str] = &["file_path", "filePath", "absolute_path", "path"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ToolAction<'a> {
    Shell { command: String },
    ReadFile { path: String },
    EditFile { path: String },
    Patch { files: Vec<ParsedFile> },
    Search { pattern: String },
    Opaque { name: &'a str, input: &'a Value },
}

fn first_str(input: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| input.get(*k).and_then(|v| v.as_str()))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Shell command as a single string; Codex sends `["bash", "-lc", "..."]`
fn shell_command(input: &Value) -> Option<String> {
    let command = match input.get("command").or_else(|| input.get("cmd")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    (!command.trim().is_empty()).then_some(command)
}

/// Classify one tool invocation
pub fn classify_tool<'a>(name: &'a str, input: &'a Value) -> ToolAction<'a> {
    let opaque = ToolAction::Opaque { name, input };

    // Codex routes apply_patch through both custom tools and shell arrays
    if let Some(text) = patch_text_from_tool_input(input) {
        let files = parse_patch(&text);
        if !files.is_empty() {
            return ToolAction::Patch { files };
        }
    }

    let action = match name.to_ascii_lowercase().as_str() {
        "bash" | "shell" | "shell_command" | "local_shell" | "run_shell_command" => {
            shell_command(input).map(|command| ToolAction::Shell { command })
        }
        "read" | "read_file" | "view" => {
            first_str(input, PATH_KEYS).map(|path| ToolAction::ReadFile { path })
        }
        "edit" | "multiedit" | "write" | "write_file" | "replace" => {
            first_str(input, PATH_KEYS).map(|path| ToolAction::EditFile { path })
        }
        "grep" | "glob" | "search_file_content" => {
            first_str(input, &["pattern", "query"]).map(|pattern| ToolAction::Search { pattern })
        }
        _ => None,
    };

    action.unwrap_or(opaque)
}

impl ContentBlock {
    /// Structured view of a `tool_use` block
    pub fn tool_action(&self) -> Option<ToolAction<'_>> {
        match self {
            ContentBlock::ToolUse { name, input, .. } => Some(classify_tool(name, input)),
            _ => None,
        }
    }
}
