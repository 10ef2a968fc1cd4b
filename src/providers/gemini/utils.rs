use serde_json::Value;

use super::types::GeminiMessage;
use crate::paths::{extract_candidate_paths, infer_project_path};

/// Extract file paths from tool call arguments
/// Handles the Gemini tool argument patterns (absolute_path, paths array, path, file_path)
pub fn extract_paths_from_tool_args(args: &Value) -> Vec<String> {
    let mut paths = Vec::new();

    for key in ["absolute_path", "file_path", "path", "dir_path"] {
        if let Some(path) = args.get(key).and_then(|v| v.as_str()) {
            paths.push(path.to_string());
        }
    }

    // read_many_files, glob results
    if let Some(paths_arr) = args.get("paths").and_then(|v| v.as_array()) {
        paths.extend(paths_arr.iter().filter_map(|p| p.as_str()).map(str::to_string));
    }

    paths
}

/// Candidate paths in probing order, capped at `limit`
///
/// Per message: tool call arguments first (structured, most reliable), then
/// thought descriptions, then the message text.
pub fn collect_candidate_paths(messages: &[GeminiMessage], limit: usize) -> Vec<String> {
    let mut candidates = Vec::new();

    for message in messages {
        if let Some(tool_calls) = &message.tool_calls {
            for args in tool_calls.iter().filter_map(|tc| tc.args.as_ref()) {
                candidates.extend(extract_paths_from_tool_args(args));
            }
        }

        if let Some(thoughts) = &message.thoughts {
            for thought in thoughts {
                candidates.extend(extract_candidate_paths(&thought.description));
            }
        }

        candidates.extend(extract_candidate_paths(&message.text()));

        if candidates.len() >= limit {
            break;
        }
    }

    candidates.truncate(limit);
    candidates
}

/// Infer the working directory from the session's project hash
pub fn infer_cwd(messages: &[GeminiMessage], project_hash: &str, limit: usize) -> Option<String> {
    let candidates = collect_candidate_paths(messages, limit);
    let cwd = infer_project_path(project_hash, &candidates);
    if cwd.is_none() {
        tracing::debug!(
            candidates = candidates.len(),
            "No candidate path matched the Gemini project hash"
        );
    }
    cwd
}
