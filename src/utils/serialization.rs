// src/utils/serialization.rs
//! Serialization utilities for ledger values.
//!
//! Provides serialization and deserialization functions for:
//! - JSON values stored on the ledger
//! - JSON objects received as patches
//! - Human-readable rendering of ledger timestamps

use chrono::{TimeZone, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// Serializes a value to JSON bytes for storage.
///
/// # Arguments
/// * `data` - The value to serialize (must implement `Serialize`)
///
/// # Returns
/// - `Ok(Vec<u8>)` with the JSON encoding on success
/// - `Err(serde_json::Error)` if serialization fails
pub fn to_bytes<T: Serialize>(data: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(data)
}

/// Deserializes a value from stored JSON bytes.
pub fn from_bytes<T: DeserializeOwned>(data: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Parses bytes that must hold a JSON object.
///
/// # Returns
/// - `Ok(map)` if the input is a JSON object
/// - `Err(String)` describing the problem otherwise
pub fn parse_object(data: &[u8]) -> Result<Map<String, Value>, String> {
    match serde_json::from_slice::<Value>(data) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", kind_of(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Renders a ledger timestamp in UTC.
///
/// Format: `YYYY-MM-DD HH:MM:SS[.fraction] +0000 UTC`, where the fraction has
/// trailing zeros trimmed and is omitted for whole seconds. Negative nanos
/// are clamped to zero; seconds outside chrono's range render as the bare
/// second count.
pub fn format_timestamp(seconds: i64, nanos: i32) -> String {
    let nanos = u32::try_from(nanos).unwrap_or(0);
    let Some(at) = Utc.timestamp_opt(seconds, nanos).single() else {
        return seconds.to_string();
    };

    let fraction = match at.timestamp_subsec_nanos() {
        0 => String::new(),
        n => format!(".{}", format!("{:09}", n).trim_end_matches('0')),
    };
    format!("{}{} +0000 UTC", at.format("%Y-%m-%d %H:%M:%S"), fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_seconds() {
        assert_eq!(format_timestamp(1_704_067_200, 0), "2024-01-01 00:00:00 +0000 UTC");
    }

    #[test]
    fn test_format_with_fraction() {
        assert_eq!(
            format_timestamp(1_704_067_200, 500_000_000),
            "2024-01-01 00:00:00.5 +0000 UTC"
        );
        assert_eq!(
            format_timestamp(1_704_067_200, 123_456_780),
            "2024-01-01 00:00:00.12345678 +0000 UTC"
        );
    }

    #[test]
    fn test_format_negative_nanos_clamped() {
        assert_eq!(format_timestamp(10, -1), "1970-01-01 00:00:10 +0000 UTC");
    }

    #[test]
    fn test_format_out_of_range_seconds() {
        assert_eq!(format_timestamp(i64::MAX, 0), i64::MAX.to_string());
    }

    #[test]
    fn test_parse_object_rejects_non_objects() {
        assert!(parse_object(br#"{"a":1}"#).is_ok());
        assert_eq!(
            parse_object(b"[1,2]").unwrap_err(),
            "expected a JSON object, got an array"
        );
        assert!(parse_object(b"{not json").is_err());
    }
}
