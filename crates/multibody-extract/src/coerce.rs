//! Primitive coercion policy.
//!
//! Rules, by target kind:
//!
//! | Kind | Accepts | Result |
//! |------|---------|--------|
//! | int, short, long, byte | JSON number | truncating / wrapping cast |
//! | float, double | JSON number | widening / narrowing cast |
//! | string | anything | unchanged |
//! | boolean | anything | the value's string form |
//! | char | anything non-empty | first character of the string form |
//!
//! Numeric strings (`"42"`) are rejected unless
//! [`CoercionPolicy::numeric_strings`] is enabled.

use crate::target::PrimitiveKind;
use serde_json::{Number, Value};

/// A value that could not be coerced into a primitive kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert {value} to {kind}")]
pub struct CoercionError {
    /// JSON text of the attempted value.
    pub value: String,
    /// Target kind.
    pub kind: PrimitiveKind,
}

/// How primitive targets are filled from JSON values.
///
/// # Example
///
/// ```rust
/// use multibody_extract::{CoercionPolicy, PrimitiveKind};
/// use serde_json::json;
///
/// let policy = CoercionPolicy::default();
/// assert_eq!(policy.coerce(&json!(7.9), PrimitiveKind::Int).unwrap(), json!(7));
/// assert!(policy.coerce(&json!("42"), PrimitiveKind::Int).is_err());
///
/// let lenient = CoercionPolicy::default().numeric_strings(true);
/// assert_eq!(lenient.coerce(&json!("42"), PrimitiveKind::Int).unwrap(), json!(42));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoercionPolicy {
    numeric_strings: bool,
}

impl CoercionPolicy {
    /// Sets whether numeric-looking strings coerce to numeric kinds.
    #[must_use]
    pub fn numeric_strings(mut self, enabled: bool) -> Self {
        self.numeric_strings = enabled;
        self
    }

    /// Returns whether numeric-looking strings coerce to numeric kinds.
    #[must_use]
    pub fn accepts_numeric_strings(&self) -> bool {
        self.numeric_strings
    }

    /// Coerces `value` into the canonical JSON form of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] naming the value and kind when the value
    /// cannot be converted.
    pub fn coerce(&self, value: &Value, kind: PrimitiveKind) -> Result<Value, CoercionError> {
        let fail = || CoercionError {
            value: value.to_string(),
            kind,
        };

        match kind {
            PrimitiveKind::String => Ok(value.clone()),
            PrimitiveKind::Boolean => Ok(Value::String(stringify(value))),
            PrimitiveKind::Char => stringify(value)
                .chars()
                .next()
                .map(|c| Value::String(c.to_string()))
                .ok_or_else(fail),
            _ => {
                let number = self.as_number(value).ok_or_else(fail)?;
                convert_number(&number, kind).ok_or_else(fail)
            }
        }
    }

    fn as_number(&self, value: &Value) -> Option<Number> {
        match value {
            Value::Number(n) => Some(n.clone()),
            Value::String(s) if self.numeric_strings => parse_number(s.trim()),
            _ => None,
        }
    }
}

/// String form of a value: strings as-is, everything else as JSON text.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

fn convert_number(n: &Number, kind: PrimitiveKind) -> Option<Value> {
    // Integral kinds first reduce the source to i64: floats truncate toward
    // zero and saturate at the i64 bounds. Narrower kinds then wrap with
    // two's complement, so 1e19 becomes i64::MAX and then -1 as i32.
    // Float sources beyond the f32 range clamp to f32::MAX/f32::MIN.
    let value = match kind {
        PrimitiveKind::Int => Value::from(integral(n)? as i32),
        PrimitiveKind::Short => Value::from(integral(n)? as i16),
        PrimitiveKind::Long => Value::from(integral(n)?),
        PrimitiveKind::Byte => Value::from(integral(n)? as i8),
        PrimitiveKind::Float => {
            let f = n.as_f64()?.clamp(f64::from(f32::MIN), f64::from(f32::MAX));
            Value::from(f as f32)
        }
        PrimitiveKind::Double => Value::from(n.as_f64()?),
        PrimitiveKind::String | PrimitiveKind::Boolean | PrimitiveKind::Char => return None,
    };
    // Non-finite floats have no JSON form.
    (!value.is_null()).then_some(value)
}

fn integral(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        Some(i)
    } else if let Some(u) = n.as_u64() {
        Some(u as i64)
    } else {
        n.as_f64().map(|f| f as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coerce(value: Value, kind: PrimitiveKind) -> Result<Value, CoercionError> {
        CoercionPolicy::default().coerce(&value, kind)
    }

    #[test]
    fn test_float_truncates_to_int() {
        assert_eq!(coerce(json!(7.9), PrimitiveKind::Int).unwrap(), json!(7));
        assert_eq!(coerce(json!(-7.9), PrimitiveKind::Int).unwrap(), json!(-7));
        assert_eq!(coerce(json!(7.9), PrimitiveKind::Long).unwrap(), json!(7));
    }

    #[test]
    fn test_integer_narrowing_wraps() {
        assert_eq!(coerce(json!(300), PrimitiveKind::Byte).unwrap(), json!(44));
        assert_eq!(coerce(json!(65_537), PrimitiveKind::Short).unwrap(), json!(1));
        assert_eq!(
            coerce(json!(4_294_967_297_i64), PrimitiveKind::Int).unwrap(),
            json!(1)
        );
    }

    #[test]
    fn test_widening() {
        assert_eq!(coerce(json!(5), PrimitiveKind::Long).unwrap(), json!(5));
        assert_eq!(coerce(json!(5), PrimitiveKind::Double).unwrap(), json!(5.0));
        assert_eq!(coerce(json!(1.5), PrimitiveKind::Float).unwrap(), json!(1.5));
    }

    #[test]
    fn test_float_beyond_f32_range_clamps() {
        assert_eq!(
            coerce(json!(1.0e39), PrimitiveKind::Float).unwrap(),
            Value::from(f32::MAX)
        );
        assert_eq!(
            coerce(json!(-1.0e39), PrimitiveKind::Float).unwrap(),
            Value::from(f32::MIN)
        );
        assert_eq!(coerce(json!(1.0e39), PrimitiveKind::Double).unwrap(), json!(1.0e39));
    }

    #[test]
    fn test_large_float_saturates_then_wraps() {
        assert_eq!(coerce(json!(1.0e19), PrimitiveKind::Long).unwrap(), json!(i64::MAX));
        assert_eq!(coerce(json!(1.0e19), PrimitiveKind::Int).unwrap(), json!(-1));
    }

    #[test]
    fn test_non_numbers_rejected_for_numeric_kinds() {
        for value in [json!("42"), json!(true), json!([1]), json!({"a": 1})] {
            let err = coerce(value.clone(), PrimitiveKind::Int).unwrap_err();
            assert_eq!(err.kind, PrimitiveKind::Int);
            assert_eq!(err.value, value.to_string());
        }
    }

    #[test]
    fn test_numeric_strings_when_enabled() {
        let policy = CoercionPolicy::default().numeric_strings(true);
        assert_eq!(policy.coerce(&json!(" 42 "), PrimitiveKind::Int).unwrap(), json!(42));
        assert_eq!(policy.coerce(&json!("2.75"), PrimitiveKind::Long).unwrap(), json!(2));
        assert!(policy.coerce(&json!("forty"), PrimitiveKind::Int).is_err());
        assert!(policy.accepts_numeric_strings());
    }

    #[test]
    fn test_string_passes_through() {
        assert_eq!(coerce(json!("hi"), PrimitiveKind::String).unwrap(), json!("hi"));
        assert_eq!(coerce(json!(5), PrimitiveKind::String).unwrap(), json!(5));
    }

    #[test]
    fn test_boolean_is_stringified() {
        assert_eq!(coerce(json!(true), PrimitiveKind::Boolean).unwrap(), json!("true"));
        assert_eq!(coerce(json!("yes"), PrimitiveKind::Boolean).unwrap(), json!("yes"));
        assert_eq!(coerce(json!(0), PrimitiveKind::Boolean).unwrap(), json!("0"));
    }

    #[test]
    fn test_char_takes_first_character() {
        assert_eq!(coerce(json!("xyz"), PrimitiveKind::Char).unwrap(), json!("x"));
        assert_eq!(coerce(json!(42), PrimitiveKind::Char).unwrap(), json!("4"));
        assert_eq!(coerce(json!("é!"), PrimitiveKind::Char).unwrap(), json!("é"));
    }

    #[test]
    fn test_char_from_empty_string_fails() {
        let err = coerce(json!(""), PrimitiveKind::Char).unwrap_err();
        assert_eq!(err.to_string(), "cannot convert \"\" to char");
    }
}
