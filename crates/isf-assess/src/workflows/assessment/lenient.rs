//! Field readers for registry exports. A sub-field with an unexpected shape
//! reads as absent rather than rejecting the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Nested structures and other typed values; a mismatch yields the default.
pub(crate) fn value<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or_default())
}

/// Strings, with numbers kept in their printed form.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_text(Value::deserialize(deserializer)?))
}

/// Lookup keys such as URNs and authority names, empty when unreadable.
pub(crate) fn key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Non-negative counts. Accepts integers, floats, and numeric strings.
pub(crate) fn count<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(as_number(&raw)
        .filter(|value| *value >= 0.0)
        .and_then(|value| T::try_from(value.round() as u64).ok()))
}

/// Scores and ratios. Accepts numbers and numeric strings.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_number(&Value::deserialize(deserializer)?))
}

/// Presence flags: null, false, zero and the empty string are unset.
pub(crate) fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().is_some_and(|value| value != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

fn as_text(raw: Value) -> Option<String> {
    match raw {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn as_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Row {
        #[serde(deserialize_with = "key")]
        id: String,
        #[serde(deserialize_with = "count")]
        pupils: Option<u32>,
        #[serde(deserialize_with = "count")]
        pool: Option<u8>,
        #[serde(deserialize_with = "number")]
        ratio: Option<f64>,
        #[serde(deserialize_with = "truthy")]
        flagged: bool,
        #[serde(deserialize_with = "value")]
        tags: Vec<String>,
    }

    fn row(json: &str) -> Row {
        serde_json::from_str(json).expect("row reads")
    }

    #[test]
    fn counts_accept_floats_and_strings() {
        let parsed = row(r#"{"id": 100001, "pupils": 120.0, "pool": "2", "ratio": "0.5"}"#);
        assert_eq!(parsed.id, "100001");
        assert_eq!(parsed.pupils, Some(120));
        assert_eq!(parsed.pool, Some(2));
        assert_eq!(parsed.ratio, Some(0.5));
    }

    #[test]
    fn wrong_shapes_read_as_absent() {
        let parsed = row(r#"{"id": null, "pupils": -4, "pool": 999, "ratio": {}, "tags": "a"}"#);
        assert_eq!(parsed.id, "");
        assert_eq!(parsed.pupils, None);
        assert_eq!(parsed.pool, None);
        assert_eq!(parsed.ratio, None);
        assert!(parsed.tags.is_empty());
    }

    #[test]
    fn flags_follow_presence() {
        assert!(!row(r#"{"flagged": null}"#).flagged);
        assert!(!row(r#"{"flagged": 0}"#).flagged);
        assert!(!row(r#"{"flagged": ""}"#).flagged);
        assert!(row(r#"{"flagged": "yes"}"#).flagged);
        assert!(row(r#"{"flagged": {"points": 1}}"#).flagged);
    }
}
