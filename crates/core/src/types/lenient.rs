//! Lenient field deserializers for catalog JSON.
//!
//! The catalog service is inconsistent about scalar types: phone numbers and
//! user IDs arrive as numbers or strings, coordinates as numbers or numeric
//! strings, record IDs as integers or numeric strings, and any of them may
//! be `null`. Use these with
//! `#[serde(default, deserialize_with = "...")]`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a string or number into a `String`.
///
/// # Errors
///
/// Fails for booleans, arrays, objects and `null`.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    opt_string(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("expected a string or number"))
}

/// Deserialize a string, number or `null` into a `String`, empty for `null`.
///
/// # Errors
///
/// Fails for booleans, arrays and objects.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string(deserializer)?.unwrap_or_default())
}

/// Deserialize an integer or numeric string into an ID type.
///
/// # Errors
///
/// Fails for `null`, non-integral numbers and strings that are not integers.
pub fn id<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<i64>,
{
    let raw = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    raw.map(T::from)
        .ok_or_else(|| serde::de::Error::custom("expected an integer ID"))
}

/// Deserialize a string, number or `null` into an `Option<String>`.
///
/// Empty strings become `None`.
///
/// # Errors
///
/// Fails for booleans, arrays and objects.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

/// Deserialize a number, numeric string or `null` into an `Option<f64>`.
///
/// Strings that do not parse as a number become `None`.
///
/// # Errors
///
/// Fails for booleans, arrays and objects.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => Ok(s.trim().parse::<f64>().ok()),
        other => Err(serde::de::Error::custom(format!(
            "expected a number, got {other}"
        ))),
    }
}

/// Deserialize a number, numeric string or `null` into a `u64`, defaulting to zero.
///
/// # Errors
///
/// Fails for booleans, arrays and objects.
pub fn u64_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.as_u64().unwrap_or(0)),
        Value::String(s) => Ok(s.trim().parse::<u64>().unwrap_or(0)),
        Value::Null => Ok(0),
        other => Err(serde::de::Error::custom(format!(
            "expected a count, got {other}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "super::string")]
        id: String,
        #[serde(default, deserialize_with = "super::opt_string")]
        phone: Option<String>,
        #[serde(default, deserialize_with = "super::opt_f64")]
        longitude: Option<f64>,
        #[serde(default, deserialize_with = "super::u64_or_zero")]
        views: u64,
    }

    #[test]
    fn test_numbers_become_strings() {
        let s: Sample = serde_json::from_str(r#"{"id": 17, "phone": 9876543210}"#).unwrap();
        assert_eq!(s.id, "17");
        assert_eq!(s.phone.as_deref(), Some("9876543210"));
    }

    #[test]
    fn test_null_and_missing_fields() {
        let s: Sample =
            serde_json::from_str(r#"{"id": "u1", "phone": null, "views": null}"#).unwrap();
        assert_eq!(s.phone, None);
        assert_eq!(s.longitude, None);
        assert_eq!(s.views, 0);
    }

    #[test]
    fn test_numeric_strings() {
        let s: Sample =
            serde_json::from_str(r#"{"id": "u1", "longitude": "77.5946", "views": "12"}"#)
                .unwrap();
        assert!((s.longitude.unwrap() - 77.5946).abs() < 1e-9);
        assert_eq!(s.views, 12);
    }

    #[test]
    fn test_id_rejects_null() {
        assert!(serde_json::from_str::<Sample>(r#"{"id": null}"#).is_err());
    }
}
