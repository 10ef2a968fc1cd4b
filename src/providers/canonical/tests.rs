use super::*;
use serde_json::json;

fn text_line(uuid: &str, timestamp: &str) -> TranscriptLine {
    TranscriptLine {
        kind: LineKind::User,
        message: Some(Message::user(MessageContent::Text("hello".to_string()))),
        uuid: uuid.to_string(),
        timestamp: timestamp.to_string(),
        parent_uuid: None,
        cwd: None,
        git_branch: None,
        session_id: None,
        tool_result_raw: None,
        request_id: None,
    }
}

#[test]
fn test_deserialize_simple_text_line() {
    let json = r#"{
        "uuid": "test-uuid-123",
        "timestamp": "2025-01-01T00:00:00.000Z",
        "type": "user",
        "parentUuid": null,
        "sessionId": "session-abc",
        "cwd": "/path/to/project",
        "message": {
            "role": "user",
            "content": "Hello, world!"
        }
    }"#;

    let line: TranscriptLine = serde_json::from_str(json).unwrap();

    assert_eq!(line.uuid, "test-uuid-123");
    assert_eq!(line.kind, LineKind::User);
    assert_eq!(line.session_id.as_deref(), Some("session-abc"));
    assert_eq!(line.cwd.as_deref(), Some("/path/to/project"));

    let message = line.message.unwrap();
    assert_eq!(message.role, Role::User);
    match message.content {
        MessageContent::Text(text) => assert_eq!(text, "Hello, world!"),
        _ => panic!("Expected text content"),
    }
}

#[test]
fn test_deserialize_structured_message_with_tool_use() {
    let json = r#"{
        "role": "assistant",
        "content": [
            { "type": "text", "text": "Let me read that file for you." },
            {
                "type": "tool_use",
                "id": "toolu_123",
                "name": "Read",
                "input": { "file_path": "/test/file.txt" }
            }
        ],
        "model": "claude-sonnet-4-5-20250929"
    }"#;

    let message: Message = serde_json::from_str(json).unwrap();
    assert_eq!(message.model.as_deref(), Some("claude-sonnet-4-5-20250929"));

    match message.content {
        MessageContent::Blocks(blocks) => {
            assert_eq!(blocks.len(), 2);
            match &blocks[1] {
                ContentBlock::ToolUse { id, name, input } => {
                    assert_eq!(id, "toolu_123");
                    assert_eq!(name, "Read");
                    assert_eq!(input["file_path"], "/test/file.txt");
                }
                _ => panic!("Expected tool_use block"),
            }
        }
        _ => panic!("Expected structured content"),
    }
}

#[test]
fn test_tool_result_uses_camel_case_fields() {
    let block = ContentBlock::ToolResult {
        tool_use_id: "call_1".to_string(),
        content: "ok".to_string(),
        is_error: Some(false),
        metadata: Some(ToolResultMetadata {
            exit_code: Some(0),
            duration_seconds: Some(1.5),
        }),
    };

    let value = serde_json::to_value(&block).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "tool_result",
            "toolUseId": "call_1",
            "content": "ok",
            "isError": false,
            "metadata": { "exitCode": 0, "durationSeconds": 1.5 }
        })
    );

    let back: ContentBlock = serde_json::from_value(value).unwrap();
    assert_eq!(back, block);
}

#[test]
fn test_command_and_shell_stream_blocks() {
    let blocks = vec![
        ContentBlock::Command {
            kind: CommandKind::Name,
            text: "/review".to_string(),
        },
        ContentBlock::ShellStream {
            kind: StreamKind::Stderr,
            text: "permission denied".to_string(),
        },
        ContentBlock::Instructions {
            text: "Be concise".to_string(),
        },
    ];

    let json = serde_json::to_string(&blocks).unwrap();
    assert!(json.contains(r#""type":"command","kind":"name""#));
    assert!(json.contains(r#""type":"shell_stream","kind":"stderr""#));
    assert!(json.contains(r#""type":"instructions""#));
}

#[test]
fn test_unknown_block_type_is_rejected() {
    let result: Result<ContentBlock, _> =
        serde_json::from_value(json!({ "type": "hologram", "text": "?" }));
    assert!(result.is_err());
}

#[test]
fn test_serialize_with_token_usage() {
    let message = Message::assistant(
        MessageContent::Text("Response".to_string()),
        Some("claude-sonnet-4-5-20250929".to_string()),
    )
    .with_usage(Some(TokenUsage {
        input_tokens: Some(150),
        output_tokens: Some(75),
        cache_creation_input_tokens: Some(500),
        cache_read_input_tokens: Some(300),
        ..TokenUsage::default()
    }));

    let json = serde_json::to_string_pretty(&message).unwrap();

    assert!(json.contains("\"usage\""));
    assert!(json.contains("\"input_tokens\": 150"));
    assert!(json.contains("\"output_tokens\": 75"));
    assert!(json.contains("\"cache_creation_input_tokens\": 500"));
    assert!(json.contains("\"cache_read_input_tokens\": 300"));
    assert!(!json.contains("thinking_tokens"));
}

#[test]
fn test_user_message_never_carries_model() {
    let message = Message::new(
        Role::User,
        MessageContent::Text("hi".to_string()),
        Some("gpt-5".to_string()),
    );
    assert_eq!(message.model, None);

    let assistant = Message::assistant(MessageContent::Text("hi".to_string()), Some(String::new()));
    assert_eq!(assistant.model, None);
}

#[test]
fn test_optional_fields_omitted_when_none() {
    let json = serde_json::to_string(&text_line("uuid-3", "2025-01-01T00:00:00.000Z")).unwrap();

    assert!(!json.contains("\"cwd\""));
    assert!(!json.contains("\"gitBranch\""));
    assert!(!json.contains("\"toolResultRaw\""));
    assert!(!json.contains("\"requestId\""));
    assert!(!json.contains("\"model\""));
    assert!(!json.contains("\"usage\""));
    // parentUuid is always present, null at the root
    assert!(json.contains("\"parentUuid\":null"));
}

#[test]
fn test_line_kind_serialization() {
    assert_eq!(serde_json::to_string(&LineKind::User).unwrap(), "\"user\"");
    assert_eq!(
        serde_json::to_string(&LineKind::Snapshot).unwrap(),
        "\"snapshot\""
    );
    assert_eq!(
        serde_json::from_str::<LineKind>("\"assistant\"").unwrap(),
        LineKind::Assistant
    );
}

#[test]
fn test_from_blocks_collapses_single_text() {
    assert_eq!(
        MessageContent::from_blocks(vec![ContentBlock::text("only")]),
        MessageContent::Text("only".to_string())
    );

    let content = MessageContent::from_blocks(vec![
        ContentBlock::thinking("hmm"),
        ContentBlock::text("answer"),
    ]);
    assert!(matches!(content, MessageContent::Blocks(ref b) if b.len() == 2));
}

#[test]
fn test_token_usage_accumulate() {
    let mut total = TokenUsage::default();
    total.accumulate(&TokenUsage {
        input_tokens: Some(10),
        output_tokens: Some(5),
        ..TokenUsage::default()
    });
    total.accumulate(&TokenUsage {
        input_tokens: Some(1),
        thinking_tokens: Some(7),
        ..TokenUsage::default()
    });

    assert_eq!(total.input_tokens, Some(11));
    assert_eq!(total.output_tokens, Some(5));
    assert_eq!(total.thinking_tokens, Some(7));
    assert_eq!(total.cache_read_input_tokens, None);
}

#[test]
fn test_token_usage_accumulate_saturates() {
    let mut total = TokenUsage {
        input_tokens: Some(u64::MAX),
        ..TokenUsage::default()
    };
    total.accumulate(&TokenUsage {
        input_tokens: Some(5),
        ..TokenUsage::default()
    });
    assert_eq!(total.input_tokens, Some(u64::MAX));
}

#[test]
fn test_summary_uses_min_and_max_not_line_order() {
    let lines = vec![
        text_line("a", "2025-01-01T10:00:00Z"),
        text_line("b", "2025-01-01T09:00:00Z"),
        text_line("c", "2025-01-01T11:30:00+01:00"),
    ];

    let summary = summarize(&lines);
    assert_eq!(summary.first_timestamp, "2025-01-01T09:00:00Z");
    assert_eq!(summary.last_timestamp, "2025-01-01T11:30:00+01:00");
    assert_eq!(summary.message_count, 3);
}

#[test]
fn test_summary_falls_back_to_lexical_order() {
    let lines = vec![text_line("a", "day-2"), text_line("b", "day-1")];

    let summary = summarize(&lines);
    assert_eq!(summary.first_timestamp, "day-1");
    assert_eq!(summary.last_timestamp, "day-2");
}

#[test]
fn test_parsed_transcript_serialization() {
    let transcript = ParsedTranscript::from_lines(
        vec![text_line("a", "2025-01-01T00:00:00.000Z")],
        "session-1".to_string(),
        Some("/repo".to_string()),
        ProviderId::ClaudeCode,
    );

    let value = serde_json::to_value(&transcript).unwrap();
    assert_eq!(value["sessionId"], "session-1");
    assert_eq!(value["provider"], "claude-code");
    assert_eq!(value["metadata"]["messageCount"], 1);
    assert_eq!(value["metadata"]["firstTimestamp"], "2025-01-01T00:00:00.000Z");
}
