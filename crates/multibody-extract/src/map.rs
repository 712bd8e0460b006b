//! Body-to-map decoding.
//!
//! The body is decoded one level deep: the top-level object becomes a
//! [`BodyMap`] whose values stay as untyped JSON subtrees until a parameter
//! asks for them.

use crate::charset::{Charset, CharsetError};
use serde_json::value::RawValue;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Failure to turn body bytes into a [`BodyMap`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The bytes are not text in the request charset.
    #[error(transparent)]
    Charset(#[from] CharsetError),

    /// The text is not a JSON object.
    #[error("{0}")]
    Syntax(#[from] serde_json::Error),
}

/// Shallow key → value view of a JSON object body.
///
/// Immutable once decoded; keys are the names parameter bindings look up.
///
/// Each top-level value is parsed on its own, so one unreadable value does
/// not fail its siblings. A bare number beyond the `f64` range saturates to
/// `f64::MAX`/`f64::MIN`; any other value serde_json cannot represent is
/// kept as an unreadable key and fails only the parameter bound to it.
///
/// # Example
///
/// ```rust
/// use multibody_extract::{BodyMap, Charset};
///
/// let map = BodyMap::decode(br#"{"a":{"x":1},"b":5}"#, Charset::Utf8).unwrap();
/// assert_eq!(map.len(), 2);
/// assert!(map.get("a").unwrap().is_object());
///
/// // Empty bodies are an empty map, not an error
/// assert!(BodyMap::decode(b"  \n", Charset::Utf8).unwrap().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyMap {
    values: Map<String, Value>,
    unreadable: BTreeMap<String, String>,
}

impl BodyMap {
    /// Decodes body bytes in the given charset.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the bytes are not valid text in `charset`
    /// or the text is anything other than a JSON object.
    pub fn decode(bytes: &[u8], charset: Charset) -> Result<Self, DecodeError> {
        let text = charset.decode(bytes)?;
        let text = text.trim_start_matches('\u{feff}');

        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        // Raw values skip number range checks, so only syntax fails here
        let raw: BTreeMap<String, Box<RawValue>> = serde_json::from_str(text)?;

        let mut map = Self::default();
        for (key, raw) in raw {
            match read_value(&raw) {
                Ok(value) => {
                    map.values.insert(key, value);
                }
                Err(e) => {
                    map.unreadable.insert(key, e.to_string());
                }
            }
        }
        Ok(map)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns why the value under `key` could not be read, if it could not.
    #[must_use]
    pub fn unreadable(&self, key: &str) -> Option<&str> {
        self.unreadable.get(key).map(String::as_str)
    }

    /// Returns true if `key` is present (even when its value is `null`).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key) || self.unreadable.contains_key(key)
    }

    /// Iterates over the top-level keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values
            .keys()
            .chain(self.unreadable.keys())
            .map(String::as_str)
    }

    /// Returns the number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() + self.unreadable.len()
    }

    /// Returns true if the body object has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializes the readable values back to compact JSON text.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        Value::Object(self.values.clone()).to_string()
    }

    /// Returns the readable values as a JSON object.
    #[must_use]
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl From<Map<String, Value>> for BodyMap {
    fn from(values: Map<String, Value>) -> Self {
        Self {
            values,
            unreadable: BTreeMap::new(),
        }
    }
}

fn read_value(raw: &RawValue) -> Result<Value, serde_json::Error> {
    serde_json::from_str(raw.get()).or_else(|e| {
        // A bare overflowing number parses to an infinite f64
        raw.get()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_infinite())
            .and_then(|f| Number::from_f64(f.clamp(f64::MIN, f64::MAX)))
            .map(Value::Number)
            .ok_or(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_object() {
        let map = BodyMap::decode(br#"{"a":{"x":1},"b":5,"c":null}"#, Charset::Utf8).unwrap();

        assert_eq!(map.get("a"), Some(&json!({"x": 1})));
        assert_eq!(map.get("b"), Some(&json!(5)));
        assert!(map.contains_key("c"));
        assert_eq!(map.get("c"), Some(&Value::Null));
        assert_eq!(map.get("d"), None);
    }

    #[test]
    fn test_nested_values_stay_opaque() {
        let map = BodyMap::decode(br#"{"items":[{"id":1},{"id":2}]}"#, Charset::Utf8).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("items").unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_and_whitespace_bodies() {
        assert!(BodyMap::decode(b"", Charset::Utf8).unwrap().is_empty());
        assert!(BodyMap::decode(b" \r\n\t", Charset::Utf8).unwrap().is_empty());
    }

    #[test]
    fn test_top_level_array_is_rejected() {
        let err = BodyMap::decode(b"[1,2,3]", Charset::Utf8).unwrap_err();
        assert!(matches!(err, DecodeError::Syntax(_)));
    }

    #[test]
    fn test_top_level_scalar_is_rejected() {
        assert!(BodyMap::decode(b"42", Charset::Utf8).is_err());
        assert!(BodyMap::decode(br#""text""#, Charset::Utf8).is_err());
    }

    #[test]
    fn test_truncated_body_is_rejected() {
        let err = BodyMap::decode(br#"{"d":"not-json<<"#, Charset::Utf8).unwrap_err();
        assert!(err.to_string().contains("EOF"));
    }

    #[test]
    fn test_invalid_utf8_is_charset_error() {
        let err = BodyMap::decode(&[b'{', 0xFF, b'}'], Charset::Utf8).unwrap_err();
        assert!(matches!(err, DecodeError::Charset(_)));
    }

    #[test]
    fn test_latin1_body() {
        let map = BodyMap::decode(&[b'{', b'"', b'n', b'"', b':', b'"', 0xE9, b'"', b'}'], Charset::Latin1)
            .unwrap();
        assert_eq!(map.get("n"), Some(&json!("é")));
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let map = BodyMap::decode("\u{feff}{\"a\":1}".as_bytes(), Charset::Utf8).unwrap();
        assert_eq!(map.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_overflowing_number_saturates() {
        let map = BodyMap::decode(br#"{"f":1e400,"n":-1e400,"g":1}"#, Charset::Utf8).unwrap();

        assert_eq!(map.get("f").and_then(Value::as_f64), Some(f64::MAX));
        assert_eq!(map.get("n").and_then(Value::as_f64), Some(f64::MIN));
        assert_eq!(map.get("g"), Some(&json!(1)));
    }

    #[test]
    fn test_unreadable_nested_value_spares_siblings() {
        let map = BodyMap::decode(br#"{"f":{"x":1e400},"g":1}"#, Charset::Utf8).unwrap();

        assert_eq!(map.len(), 2);
        assert!(map.contains_key("f"));
        assert!(map.get("f").is_none());
        assert!(map.unreadable("f").unwrap().contains("number out of range"));
        assert_eq!(map.get("g"), Some(&json!(1)));
        assert!(map.unreadable("g").is_none());
    }

    #[test]
    fn test_json_string_round_trip() {
        let map = BodyMap::decode(br#"{"a":[1,2],"b":"x"}"#, Charset::Utf8).unwrap();
        let again = BodyMap::decode(map.to_json_string().as_bytes(), Charset::Utf8).unwrap();
        assert_eq!(map, again);
    }
}
