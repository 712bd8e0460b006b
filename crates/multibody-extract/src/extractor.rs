//! Per-parameter extraction.
//!
//! [`extract`] pulls one parameter's value out of the [`BodyMap`]: key
//! lookup, required/optional handling, the shape compatibility check and the
//! primitive coercion step. Typed decoding of the result is left to the
//! resolver.
//!
//! The [`FromRequest`] trait covers values extracted from the request as a
//! whole rather than from one key.

use crate::binding::ParameterBinding;
use crate::coerce::CoercionPolicy;
use crate::map::BodyMap;
use crate::target::TargetShape;
use crate::{ExtractionContext, ExtractionError};
use serde_json::Value;

/// Trait for types that can be extracted from the request as a whole.
///
/// # Implementing `FromRequest`
///
/// ```rust
/// use multibody_extract::{ExtractionContext, ExtractionError, FromRequest};
///
/// struct TraceId(String);
///
/// impl FromRequest for TraceId {
///     fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
///         ctx.header("x-trace-id")
///             .map(|v| TraceId(v.to_string()))
///             .ok_or_else(|| ExtractionError::missing_required("x-trace-id"))
///     }
/// }
/// ```
pub trait FromRequest: Sized {
    /// Extracts this type from the request context.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if extraction fails.
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError>;
}

// None if extraction fails
impl<T: FromRequest> FromRequest for Option<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(T::from_request(ctx).ok())
    }
}

// Lets callers handle the error inline
impl<T: FromRequest> FromRequest for Result<T, ExtractionError> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(T::from_request(ctx))
    }
}

macro_rules! impl_from_request_for_tuple {
    ($($T:ident),*) => {
        impl<$($T: FromRequest),*> FromRequest for ($($T,)*) {
            fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
                Ok(($($T::from_request(ctx)?,)*))
            }
        }
    };
}

impl_from_request_for_tuple!(T1);
impl_from_request_for_tuple!(T1, T2);
impl_from_request_for_tuple!(T1, T2, T3);
impl_from_request_for_tuple!(T1, T2, T3, T4);

/// Returns true if `value` may be extracted into `shape` at all.
///
/// Accepts, in order: an exact kind match (opaque targets match
/// everything), any value for a primitive target, an array for an array
/// target, an object for any non-primitive target.
///
/// ```rust
/// use multibody_extract::{check_compatible, TargetShape};
/// use serde_json::json;
///
/// assert!(check_compatible(&json!({"x": 1}), TargetShape::Structured));
/// assert!(check_compatible(&json!([1, 2]), TargetShape::Array));
/// assert!(!check_compatible(&json!("text"), TargetShape::Structured));
/// assert!(check_compatible(&json!({"x": 1}), TargetShape::Array));
/// ```
#[must_use]
pub fn check_compatible(value: &Value, shape: TargetShape) -> bool {
    if shape.matches_exactly(value) {
        return true;
    }
    match shape {
        TargetShape::Primitive(_) => true,
        TargetShape::Array => value.is_array() || value.is_object(),
        TargetShape::Structured | TargetShape::Opaque => value.is_object(),
    }
}

/// Extracts one parameter's JSON value from the body map.
///
/// Returns `Value::Null` for an optional parameter whose key is absent or
/// `null`. Primitive targets come back in their coerced canonical form;
/// other targets come back unchanged.
///
/// # Errors
///
/// - `MissingRequired` when a required key is absent or `null`
/// - `TypeMismatch` when the value's kind cannot become the target shape,
///   primitive coercion fails, or the value itself could not be read
///
/// # Example
///
/// ```rust
/// use multibody_extract::{extract, BodyMap, Charset, CoercionPolicy, ParameterBinding};
/// use serde_json::json;
///
/// let map = BodyMap::decode(br#"{"a":{"x":1},"b":7.9}"#, Charset::Utf8).unwrap();
/// let policy = CoercionPolicy::default();
///
/// let a = extract(&map, &ParameterBinding::of::<serde_json::Value>("a"), &policy).unwrap();
/// assert_eq!(a, json!({"x": 1}));
///
/// let b = extract(&map, &ParameterBinding::of::<i32>("b"), &policy).unwrap();
/// assert_eq!(b, json!(7));
///
/// let c = extract(&map, &ParameterBinding::of::<i32>("c").optional(), &policy).unwrap();
/// assert!(c.is_null());
/// ```
pub fn extract(
    map: &BodyMap,
    binding: &ParameterBinding,
    policy: &CoercionPolicy,
) -> Result<Value, ExtractionError> {
    let key = binding.effective_key();

    if let Some(reason) = map.unreadable(key) {
        return Err(ExtractionError::conversion_failed(key, reason));
    }

    let value = match map.get(key) {
        None | Some(Value::Null) if binding.is_required() => {
            return Err(ExtractionError::missing_required(key));
        }
        None | Some(Value::Null) => return Ok(Value::Null),
        Some(value) => value,
    };

    if !check_compatible(value, binding.shape()) {
        return Err(ExtractionError::type_mismatch(key));
    }

    match binding.shape() {
        TargetShape::Primitive(kind) => policy
            .coerce(value, kind)
            .map_err(|e| ExtractionError::coercion_failed(key, e.value, e.kind.name())),
        TargetShape::Structured | TargetShape::Array | TargetShape::Opaque => Ok(value.clone()),
    }
}

impl FromRequest for BodyMap {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        ctx.body_map("BodyMap", crate::Charset::default()).cloned()
    }
}
