//! Parser for Codex's `apply_patch` diff dialect
//!
//! ```text
//! *** Begin Patch
//! *** Update File: src/app.py
//! @@ def greet():
//! -print("Hi")
//! +print("Hello")
//! *** End Patch
//! ```
//!
//! Only the first Add/Update block is returned. Delete blocks carry no
//! content and are skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const BEGIN_MARKER: &str = "*** Begin Patch";
const END_MARKER: &str = "*** End Patch";
const ADD_PREFIX: &str = "*** Add File:";
const UPDATE_PREFIX: &str = "*** Update File:";

/// Old/new contents for one file touched by a patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFile {
    pub file_path: String,
    /// Empty when the patch creates the file
    pub old_string: String,
    pub new_string: String,
}

enum BlockKind {
    Add,
    Update,
}

/// Parse patch text into per-file old/new pairs
///
/// Returns an empty vec for anything malformed: missing envelope markers,
/// no Add/Update block, or a block with no content.
pub fn parse_patch(text: &str) -> Vec<ParsedFile> {
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();

    let Some(begin) = lines.iter().position(|l| l.trim() == BEGIN_MARKER) else {
        return Vec::new();
    };
    let Some(end) = lines[begin + 1..]
        .iter()
        .position(|l| l.trim() == END_MARKER)
        .map(|i| i + begin + 1)
    else {
        return Vec::new();
    };
    let body = &lines[begin + 1..end];

    let Some((start, kind, path)) = body.iter().enumerate().find_map(|(i, line)| {
        if let Some(path) = line.strip_prefix(ADD_PREFIX) {
            Some((i, BlockKind::Add, path.trim()))
        } else {
            line.strip_prefix(UPDATE_PREFIX)
                .map(|path| (i, BlockKind::Update, path.trim()))
        }
    }) else {
        return Vec::new();
    };
    if path.is_empty() {
        return Vec::new();
    }

    // The block runs until the next file marker
    let block: Vec<&str> = body[start + 1..]
        .iter()
        .take_while(|l| !is_file_marker(l))
        .copied()
        .collect();

    let parsed = match kind {
        BlockKind::Add => parse_add(path, &block),
        BlockKind::Update => parse_update(path, &block),
    };
    parsed.into_iter().collect()
}

fn is_file_marker(line: &str) -> bool {
    line.starts_with(ADD_PREFIX)
        || line.starts_with(UPDATE_PREFIX)
        || line.starts_with("*** Delete File:")
}

fn parse_add(path: &str, block: &[&str]) -> Option<ParsedFile> {
    let added: Vec<&str> = block.iter().filter_map(|l| l.strip_prefix('+')).collect();
    if added.is_empty() {
        return None;
    }

    Some(ParsedFile {
        file_path: path.to_string(),
        old_string: String::new(),
        new_string: added.join("\n"),
    })
}

fn parse_update(path: &str, block: &[&str]) -> Option<ParsedFile> {
    let mut old_lines = Vec::new();
    let mut new_lines = Vec::new();
    let mut in_hunk = false;

    for line in block {
        if line.starts_with("@@") {
            in_hunk = true;
            continue;
        }
        // "*** Move to:" / "*** End of File" annotations
        if line.starts_with("***") || !in_hunk {
            continue;
        }

        if let Some(removed) = line.strip_prefix('-') {
            old_lines.push(removed);
        } else if let Some(added) = line.strip_prefix('+') {
            new_lines.push(added);
        } else {
            let context = line.strip_prefix(' ').unwrap_or(line);
            old_lines.push(context);
            new_lines.push(context);
        }
    }

    if old_lines.is_empty() && new_lines.is_empty() {
        return None;
    }

    Some(ParsedFile {
        file_path: path.to_string(),
        old_string: old_lines.join("\n"),
        new_string: new_lines.join("\n"),
    })
}

/// Locate patch text inside a Codex tool-call payload
///
/// Handles the raw `custom_tool_call` input string, `{input}` / `{patch}`
/// objects, JSON-encoded arguments and `["apply_patch", "<patch>"]` command
/// arrays (bare or under `command`).
pub fn patch_text_from_tool_input(input: &Value) -> Option<String> {
    match input {
        Value::String(s) if s.contains(BEGIN_MARKER) => Some(s.clone()),
        Value::String(s) => serde_json::from_str::<Value>(s)
            .ok()
            .filter(|v| !v.is_string())
            .and_then(|v| patch_text_from_tool_input(&v)),
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .find(|s| s.contains(BEGIN_MARKER))
            .map(str::to_string),
        Value::Object(map) => ["input", "patch", "command", "arguments"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(patch_text_from_tool_input),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_file() {
        let patch = "*** Begin Patch\n*** Add File: test.txt\n+Hello World\n*** End Patch";
        assert_eq!(
            parse_patch(patch),
            vec![ParsedFile {
                file_path: "test.txt".to_string(),
                old_string: String::new(),
                new_string: "Hello World".to_string(),
            }]
        );
    }

    #[test]
    fn test_malformed() {
        assert!(parse_patch("not a valid patch").is_empty());
        assert!(parse_patch("*** Begin Patch\n*** Add File: a.txt\n+x").is_empty());
        assert!(parse_patch("*** Begin Patch\n+x\n*** End Patch").is_empty());
        assert!(parse_patch("*** Begin Patch\n*** Add File: a.txt\n*** End Patch").is_empty());
        assert!(parse_patch("").is_empty());
    }

    #[test]
    fn test_update_file_multiple_hunks() {
        let patch = "*** Begin Patch
*** Update File: src/app.py
@@ def greet():
 def greet():
-    print(\"Hi\")
+    print(\"Hello\")
@@ def main():
 def main():
-    greet()
+    greet()
+    greet()
*** End Patch
";
        let files = parse_patch(patch);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_path, "src/app.py");
        assert_eq!(
            files[0].old_string,
            "def greet():\n    print(\"Hi\")\ndef main():\n    greet()"
        );
        assert_eq!(
            files[0].new_string,
            "def greet():\n    print(\"Hello\")\ndef main():\n    greet()\n    greet()"
        );
    }

    #[test]
    fn test_only_first_block_returned() {
        let patch = "*** Begin Patch
*** Delete File: old.txt
*** Add File: a.txt
+one
*** Add File: b.txt
+two
*** End Patch";
        let files = parse_patch(patch);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_path, "a.txt");
        assert_eq!(files[0].new_string, "one");
    }

    #[test]
    fn test_crlf_and_end_of_file_marker() {
        let patch = "*** Begin Patch\r\n*** Update File: a.rs\r\n@@\r\n-old\r\n+new\r\n*** End of File\r\n*** End Patch\r\n";
        let files = parse_patch(patch);
        assert_eq!(files[0].old_string, "old");
        assert_eq!(files[0].new_string, "new");
    }

    #[test]
    fn test_patch_text_from_tool_input() {
        let text = "*** Begin Patch\n*** Add File: a\n+x\n*** End Patch";
        assert_eq!(patch_text_from_tool_input(&json!(text)).as_deref(), Some(text));
        assert_eq!(patch_text_from_tool_input(&json!({"input": text})).as_deref(), Some(text));
        assert_eq!(
            patch_text_from_tool_input(&json!({"command": ["apply_patch", text]})).as_deref(),
            Some(text)
        );
        let encoded = json!({"patch": text}).to_string();
        assert_eq!(patch_text_from_tool_input(&json!(encoded)).as_deref(), Some(text));
        assert_eq!(patch_text_from_tool_input(&json!({"command": ["ls"]})), None);
    }
}
