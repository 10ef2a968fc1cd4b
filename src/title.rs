use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::providers::canonical::parse_timestamp;
use crate::providers::ProviderId;

static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("valid uuid regex")
});

// A date followed by a time; a bare date is not enough
static TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}[T_ ]\d{2}[-:]\d{2}|(19|20)\d{6}[T_-]?\d{6}")
        .expect("valid timestamp regex")
});

static HEX_DIGEST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[0-9a-f]{32,}\b").expect("valid hex regex")
});

/// Whether a title looks machine-generated rather than written by a person
///
/// Empty titles, anything embedding a UUID, timestamp-heavy strings such as
/// `2025-10-11T10-35-38` and long hex digests all count. Plain dates and
/// version strings do not.
pub fn is_machine_identifier(title: Option<&str>) -> bool {
    let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) else {
        return true;
    };

    UUID_REGEX.is_match(title) || TIMESTAMP_REGEX.is_match(title) || HEX_DIGEST_REGEX.is_match(title)
}

/// `"{Provider} - {Month Day, Year}"`
pub fn default_title(provider: ProviderId, date: DateTime<Utc>) -> String {
    format!("{} - {}", provider.display_name(), date.format("%B %-d, %Y"))
}

/// Keep a human title, otherwise derive one from the provider and session start
///
/// When the start timestamp does not parse, the title falls back to
/// `"{Provider} Session"` so the result stays a pure function of its inputs.
pub fn resolve_title(candidate: Option<&str>, provider: ProviderId, first_timestamp: &str) -> String {
    if !is_machine_identifier(candidate) {
        if let Some(title) = candidate {
            return title.trim().to_string();
        }
    }

    match parse_timestamp(first_timestamp) {
        Some(date) => default_title(provider, date),
        None => format!("{} Session", provider.display_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_uuid_titles() {
        assert!(is_machine_identifier(Some("8c7df8a4-37a0-4731-939e-3e64abe0dc09")));
        assert!(is_machine_identifier(Some(
            "session-8C7DF8A4-37A0-4731-939E-3E64ABE0DC09.jsonl"
        )));
    }

    #[test]
    fn test_timestamp_titles() {
        assert!(is_machine_identifier(Some("2025-10-11T10-35-38")));
        assert!(is_machine_identifier(Some("rollout-2025-10-11T10:35:38")));
        assert!(is_machine_identifier(Some("chat_20251011_103538")));
        assert!(!is_machine_identifier(Some("2025-10-18")));
    }

    #[test]
    fn test_human_titles() {
        assert!(!is_machine_identifier(Some("Fix authentication bug")));
        assert!(!is_machine_identifier(Some("v1.2.3")));
        assert!(!is_machine_identifier(Some("Release notes for 2025-10-18")));
        assert!(!is_machine_identifier(Some("Invoice 12345678901234")));
    }

    #[test]
    fn test_empty_titles() {
        assert!(is_machine_identifier(None));
        assert!(is_machine_identifier(Some("")));
        assert!(is_machine_identifier(Some("   ")));
    }

    #[test]
    fn test_hex_digest_titles() {
        assert!(is_machine_identifier(Some(
            "277996b93ab2729878c409f6bbc1aa9fd3e741575b334969086150a208f5e277"
        )));
        assert!(!is_machine_identifier(Some("cafe")));
    }

    #[test]
    fn test_default_title() {
        let date = Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 0).unwrap();
        assert_eq!(
            default_title(ProviderId::ClaudeCode, date),
            "Claude Code - October 5, 2025"
        );
    }

    #[test]
    fn test_resolve_title() {
        assert_eq!(
            resolve_title(Some("  Refactor parser "), ProviderId::Codex, "2025-10-11T10:35:38Z"),
            "Refactor parser"
        );
        assert_eq!(
            resolve_title(
                Some("8c7df8a4-37a0-4731-939e-3e64abe0dc09"),
                ProviderId::GeminiCode,
                "2025-10-11T10:35:38Z"
            ),
            "Gemini Code - October 11, 2025"
        );
        assert_eq!(resolve_title(None, ProviderId::Generic, ""), "Generic Session");
    }
}
