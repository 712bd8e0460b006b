//! Target shapes.
//!
//! A parameter's declared type is classified once, when its binding is
//! built, into a [`TargetShape`]. Extraction and coercion then branch on the
//! shape instead of inspecting types at request time.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Primitive-wrapper kinds that go through coercion instead of decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// 32-bit signed integer
    Int,
    /// 16-bit signed integer
    Short,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// 8-bit signed integer
    Byte,
    /// Text
    String,
    /// Boolean (coerced through its string form)
    Boolean,
    /// Single character
    Char,
}

impl PrimitiveKind {
    /// Returns true for the numeric kinds.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Short | Self::Long | Self::Float | Self::Double | Self::Byte
        )
    }

    /// Returns the kind name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Short => "short",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Byte => "byte",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Char => "char",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The declared shape a parameter's value must conform to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetShape {
    /// A primitive wrapper, filled by coercion
    Primitive(PrimitiveKind),
    /// A structured object, decoded from a JSON object
    Structured,
    /// A sequence, decoded from a JSON array
    Array,
    /// Any JSON value, passed through untouched
    Opaque,
}

impl TargetShape {
    /// Returns true for primitive-wrapper shapes.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Returns true if the value's JSON kind is exactly this shape.
    #[must_use]
    pub fn matches_exactly(self, value: &Value) -> bool {
        match self {
            Self::Opaque => true,
            Self::Structured => value.is_object(),
            Self::Array => value.is_array(),
            Self::Primitive(kind) => match kind {
                PrimitiveKind::String | PrimitiveKind::Char => value.is_string(),
                PrimitiveKind::Boolean => value.is_boolean(),
                PrimitiveKind::Int
                | PrimitiveKind::Short
                | PrimitiveKind::Long
                | PrimitiveKind::Byte => value.is_i64() || value.is_u64(),
                PrimitiveKind::Float | PrimitiveKind::Double => value.is_number(),
            },
        }
    }
}

impl fmt::Display for TargetShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{kind}"),
            Self::Structured => f.write_str("object"),
            Self::Array => f.write_str("array"),
            Self::Opaque => f.write_str("any"),
        }
    }
}

/// A Rust type that can be the target of a multi-body parameter.
///
/// The associated [`SHAPE`](BodyTarget::SHAPE) defaults to
/// [`TargetShape::Structured`], so a plain data type only needs an empty
/// impl:
///
/// ```rust
/// use multibody_extract::{BodyTarget, TargetShape};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Address {
///     city: String,
/// }
///
/// impl BodyTarget for Address {}
///
/// assert_eq!(Address::SHAPE, TargetShape::Structured);
/// assert_eq!(<Vec<Address>>::SHAPE, TargetShape::Array);
/// assert_eq!(<Option<i64>>::SHAPE, i64::SHAPE);
/// ```
pub trait BodyTarget: DeserializeOwned {
    /// Shape used to pick the extraction path.
    const SHAPE: TargetShape = TargetShape::Structured;

    /// Builds the value from the extracted (and, for primitives, coerced) JSON.
    fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

macro_rules! primitive_target {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl BodyTarget for $ty {
                const SHAPE: TargetShape = TargetShape::Primitive(PrimitiveKind::$kind);
            }
        )*
    };
}

primitive_target! {
    i32 => Int,
    i16 => Short,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    i8 => Byte,
    String => String,
    char => Char,
}

impl BodyTarget for bool {
    const SHAPE: TargetShape = TargetShape::Primitive(PrimitiveKind::Boolean);

    // Coercion hands booleans over in string form.
    fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::String(s) => s.trim().parse().map_err(|_| {
                <serde_json::Error as serde::de::Error>::custom(format!(
                    "expected `true` or `false`, got `{s}`"
                ))
            }),
            other => serde_json::from_value(other),
        }
    }
}

impl<T: DeserializeOwned> BodyTarget for Vec<T> {
    const SHAPE: TargetShape = TargetShape::Array;
}

impl BodyTarget for Value {
    const SHAPE: TargetShape = TargetShape::Opaque;

    fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        Ok(value)
    }
}

impl BodyTarget for Map<String, Value> {}

impl<V: DeserializeOwned> BodyTarget for HashMap<String, V> {}

impl<V: DeserializeOwned> BodyTarget for BTreeMap<String, V> {}

impl<T: BodyTarget> BodyTarget for Option<T> {
    const SHAPE: TargetShape = T::SHAPE;

    fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_json(value).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_shapes() {
        assert_eq!(i32::SHAPE, TargetShape::Primitive(PrimitiveKind::Int));
        assert_eq!(i64::SHAPE, TargetShape::Primitive(PrimitiveKind::Long));
        assert_eq!(String::SHAPE, TargetShape::Primitive(PrimitiveKind::String));
        assert_eq!(bool::SHAPE, TargetShape::Primitive(PrimitiveKind::Boolean));
        assert!(char::SHAPE.is_primitive());
    }

    #[test]
    fn test_container_shapes() {
        assert_eq!(<Vec<i32>>::SHAPE, TargetShape::Array);
        assert_eq!(Value::SHAPE, TargetShape::Opaque);
        assert_eq!(<HashMap<String, i32>>::SHAPE, TargetShape::Structured);
        assert_eq!(<Option<Vec<String>>>::SHAPE, TargetShape::Array);
    }

    #[test]
    fn test_matches_exactly() {
        assert!(TargetShape::Structured.matches_exactly(&json!({"x": 1})));
        assert!(!TargetShape::Structured.matches_exactly(&json!([1])));
        assert!(TargetShape::Array.matches_exactly(&json!([1])));
        assert!(TargetShape::Opaque.matches_exactly(&json!("anything")));
        assert!(String::SHAPE.matches_exactly(&json!("s")));
        assert!(i64::SHAPE.matches_exactly(&json!(5)));
        assert!(!i64::SHAPE.matches_exactly(&json!(5.5)));
        assert!(f64::SHAPE.matches_exactly(&json!(5.5)));
    }

    #[test]
    fn test_bool_from_string_form() {
        assert!(bool::from_json(json!("true")).unwrap());
        assert!(!bool::from_json(json!("false")).unwrap());
        assert!(bool::from_json(json!(true)).unwrap());
        assert!(bool::from_json(json!("1")).is_err());
    }

    #[test]
    fn test_option_from_null() {
        assert_eq!(<Option<i32>>::from_json(Value::Null).unwrap(), None);
        assert_eq!(<Option<i32>>::from_json(json!(3)).unwrap(), Some(3));
    }

    #[test]
    fn test_display() {
        assert_eq!(TargetShape::Primitive(PrimitiveKind::Int).to_string(), "int");
        assert_eq!(TargetShape::Structured.to_string(), "object");
        assert_eq!(TargetShape::Array.to_string(), "array");
    }
}
