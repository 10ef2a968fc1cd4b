//! Timestamp helpers
//!
//! Sources disagree on how they write time: RFC 3339 strings, epoch
//! milliseconds, epoch seconds. Everything is normalized to RFC 3339 UTC
//! with millisecond precision before it reaches a canonical line.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::providers::canonical::parse_timestamp;

/// Epoch values above this are treated as milliseconds
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Normalize a timestamp field into an RFC 3339 string
///
/// Strings are kept verbatim (even unparseable ones; ordering falls back to
/// lexical comparison later). Numbers are read as epoch seconds or
/// milliseconds depending on magnitude.
pub fn normalize_timestamp(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => {
            if let Ok(n) = s.trim().parse::<i64>() {
                return from_epoch(n);
            }
            Some(s.clone())
        }
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(from_epoch),
        _ => None,
    }
}

fn from_epoch(n: i64) -> Option<String> {
    let dt = if n.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD.unsigned_abs() {
        DateTime::<Utc>::from_timestamp_millis(n)?
    } else {
        DateTime::<Utc>::from_timestamp(n, 0)?
    };
    Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Milliseconds between two timestamps when both parse
pub fn duration_ms(first: &str, last: &str) -> Option<i64> {
    match (parse_timestamp(first), parse_timestamp(last)) {
        (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_timestamp_kept() {
        assert_eq!(
            normalize_timestamp(&json!("2025-01-01T00:00:00.000Z")).as_deref(),
            Some("2025-01-01T00:00:00.000Z")
        );
        assert_eq!(normalize_timestamp(&json!("")), None);
    }

    #[test]
    fn test_epoch_millis_and_seconds() {
        assert_eq!(
            normalize_timestamp(&json!(1735689600000i64)).as_deref(),
            Some("2025-01-01T00:00:00.000Z")
        );
        assert_eq!(
            normalize_timestamp(&json!(1735689600)).as_deref(),
            Some("2025-01-01T00:00:00.000Z")
        );
        assert_eq!(
            normalize_timestamp(&json!("1735689600000")).as_deref(),
            Some("2025-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn test_extreme_epoch_values_rejected() {
        assert_eq!(normalize_timestamp(&json!(i64::MIN)), None);
        assert_eq!(normalize_timestamp(&json!("-9223372036854775808")), None);
        assert_eq!(normalize_timestamp(&json!(i64::MAX)), None);
    }

    #[test]
    fn test_duration_ms() {
        assert_eq!(
            duration_ms("2025-01-01T00:00:00Z", "2025-01-01T00:01:30.500Z"),
            Some(90_500)
        );
        assert_eq!(duration_ms("nope", "2025-01-01T00:00:00Z"), None);
    }
}
