use serde::Deserialize;
use serde_json::Value;

/// Codex JSONL rollout line
///
/// Every line has the same wrapper (timestamp, type, payload); the payload
/// structure depends on the wrapper type.
#[derive(Debug, Clone)]
pub struct CodexMessage {
    pub timestamp: String,
    pub message_type: String,
    pub payload: CodexPayload,
}

// Dispatch on the wrapper type to pick the payload variant
impl<'de> Deserialize<'de> for CodexMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let value = Value::deserialize(deserializer)?;
        let timestamp = value
            .get("timestamp")
            .and_then(|v| v.as_str())
            .ok_or_else(|| D::Error::missing_field("timestamp"))?
            .to_string();
        let message_type = value
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| D::Error::missing_field("type"))?
            .to_string();

        let payload_value = value
            .get("payload")
            .ok_or_else(|| D::Error::missing_field("payload"))?
            .clone();

        let payload = match message_type.as_str() {
            "session_meta" => CodexPayload::SessionMeta(
                serde_json::from_value(payload_value).map_err(D::Error::custom)?,
            ),
            "response_item" => CodexPayload::ResponseItem(
                serde_json::from_value(payload_value).map_err(D::Error::custom)?,
            ),
            "event_msg" => CodexPayload::EventMsg(
                serde_json::from_value(payload_value).map_err(D::Error::custom)?,
            ),
            "turn_context" => CodexPayload::TurnContext(
                serde_json::from_value(payload_value).map_err(D::Error::custom)?,
            ),
            _ => CodexPayload::Other,
        };

        Ok(CodexMessage {
            timestamp,
            message_type,
            payload,
        })
    }
}

#[derive(Debug, Clone)]
pub enum CodexPayload {
    /// Session metadata (type: "session_meta")
    SessionMeta(SessionMetaPayload),
    /// Response items (type: "response_item")
    ResponseItem(ResponseItemPayload),
    /// Event messages (type: "event_msg")
    EventMsg(EventMsgPayload),
    /// Turn context (type: "turn_context")
    TurnContext(TurnContextPayload),
    /// Wrapper types with nothing to render (e.g. "compacted")
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionMetaPayload {
    pub id: Option<String>,
    pub cwd: Option<String>,
    pub cli_version: Option<String>,
    pub git: Option<GitInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitInfo {
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseItemPayload {
    #[serde(rename = "type")]
    pub item_type: String, // "message", "function_call", "function_call_output", "reasoning", ...
    #[serde(flatten)]
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMsgPayload {
    #[serde(rename = "type")]
    pub event_type: String, // "user_message", "agent_message", "token_count", "agent_reasoning"
    #[serde(flatten)]
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TurnContextPayload {
    pub cwd: Option<String>,
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_meta() {
        let json = r#"{
            "timestamp": "2025-10-20T06:46:43.215Z",
            "type": "session_meta",
            "payload": {
                "id": "019a005e-c8fc-7512-8e78-c2322cbf0875",
                "timestamp": "2025-10-20T06:46:43.196Z",
                "cwd": "/Users/cliftonc/work/guideai",
                "originator": "codex_cli_rs",
                "cli_version": "0.45.0",
                "git": {
                    "commit_hash": "77a017",
                    "branch": "main",
                    "repository_url": "git@github.com:guideai-dev/guideai.git"
                }
            }
        }"#;

        let msg: CodexMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.message_type, "session_meta");
        match msg.payload {
            CodexPayload::SessionMeta(meta) => {
                assert_eq!(meta.id.as_deref(), Some("019a005e-c8fc-7512-8e78-c2322cbf0875"));
                assert_eq!(meta.git.and_then(|g| g.branch).as_deref(), Some("main"));
            }
            _ => panic!("Expected session_meta payload"),
        }
    }

    #[test]
    fn test_missing_payload_is_error() {
        let result: Result<CodexMessage, _> =
            serde_json::from_str(r#"{"timestamp": "2025-10-20T06:46:43.215Z", "type": "event_msg"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_wrapper_type() {
        let msg: CodexMessage = serde_json::from_str(
            r#"{"timestamp": "2025-10-20T06:46:43.215Z", "type": "compacted", "payload": {"message": "..."}}"#,
        )
        .unwrap();
        assert!(matches!(msg.payload, CodexPayload::Other));
    }
}
