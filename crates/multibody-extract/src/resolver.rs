//! Multi-body parameter resolver.
//!
//! The resolver is built once at startup from immutable [`ResolverOptions`]
//! and shared by every request. For each declared parameter it decodes (or
//! reuses) the request's body map, extracts and coerces the parameter's
//! value, decodes it into the target type and runs validation.

use crate::binding::{HandlerBindings, ParameterBinding};
use crate::charset::Charset;
use crate::coerce::CoercionPolicy;
use crate::context::ExtractionContext;
use crate::error::ExtractionError;
use crate::extractor;
use crate::target::BodyTarget;
use crate::validate::{self, FieldErrors, ParamValidator, Validated, ValidationMarkers};
use serde_json::Value;
use tracing::debug;

/// Settings the resolver is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Primitive coercion rules.
    pub policy: CoercionPolicy,
    /// Marker names that turn validation on.
    pub markers: ValidationMarkers,
    /// Charset used when the request declares none.
    pub default_charset: Charset,
}

/// Resolves multi-body parameters from an [`ExtractionContext`].
///
/// # Example
///
/// ```rust
/// use multibody_extract::{
///     BodyTarget, ExtractionContextBuilder, HandlerBindings, MultiBodyResolver, ParameterBinding,
/// };
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Point {
///     x: i32,
/// }
///
/// impl BodyTarget for Point {}
///
/// let bindings = HandlerBindings::builder("draw")
///     .param(ParameterBinding::of::<Point>("a"))
///     .param(ParameterBinding::of::<i64>("b"))
///     .build();
///
/// let ctx = ExtractionContextBuilder::new()
///     .header("content-type", "application/json")
///     .body(r#"{"a":{"x":1},"b":5}"#)
///     .build();
///
/// let resolver = MultiBodyResolver::default();
/// let a: Point = resolver.resolve(&ctx, bindings.get("a").unwrap()).unwrap().unwrap();
/// let b: i64 = resolver.resolve(&ctx, bindings.get("b").unwrap()).unwrap().unwrap();
///
/// assert_eq!(a.x, 1);
/// assert_eq!(b, 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MultiBodyResolver {
    options: ResolverOptions,
}

impl MultiBodyResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    /// Returns the options this resolver was built with.
    #[must_use]
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolves a parameter to its extracted JSON value.
    ///
    /// An absent optional parameter resolves to `Value::Null`.
    ///
    /// # Errors
    ///
    /// `StructuralDecode` if the body map cannot be built; otherwise
    /// whatever [`extractor::extract`] reports.
    pub fn resolve_value(
        &self,
        ctx: &ExtractionContext,
        binding: &ParameterBinding,
    ) -> Result<Value, ExtractionError> {
        let map = ctx.body_map(binding.signature(), self.options.default_charset)?;
        let result = extractor::extract(map, binding, &self.options.policy);

        match &result {
            Ok(value) => debug!(
                param = binding.name(),
                key = binding.effective_key(),
                shape = %binding.shape(),
                null = value.is_null(),
                "resolved multi-body parameter"
            ),
            Err(e) => debug!(
                param = binding.name(),
                key = binding.effective_key(),
                error_code = e.error_code(),
                error = %e,
                "multi-body parameter rejected"
            ),
        }
        result
    }

    /// Resolves a parameter into its target type.
    ///
    /// Returns `None` for an absent or `null` optional parameter.
    ///
    /// # Errors
    ///
    /// As [`resolve_value`](Self::resolve_value), plus `TypeMismatch` when
    /// the value does not deserialize into `T`.
    pub fn resolve<T: BodyTarget>(
        &self,
        ctx: &ExtractionContext,
        binding: &ParameterBinding,
    ) -> Result<Option<T>, ExtractionError> {
        let value = self.resolve_value(ctx, binding)?;
        if value.is_null() {
            return Ok(None);
        }
        T::from_json(value)
            .map(Some)
            .map_err(|e| ExtractionError::conversion_failed(binding.effective_key(), e))
    }

    /// Resolves a parameter and validates it.
    ///
    /// Validation runs only for a non-null value whose binding carries a
    /// recognized marker. Failures are raised, unless the binding captures
    /// errors, in which case they come back inside the [`Validated`].
    ///
    /// # Errors
    ///
    /// As [`resolve`](Self::resolve), plus `ValidationFailed`.
    pub fn resolve_validated<T, V>(
        &self,
        ctx: &ExtractionContext,
        binding: &ParameterBinding,
        validator: &V,
    ) -> Result<Validated<T>, ExtractionError>
    where
        T: BodyTarget,
        V: ParamValidator<T> + ?Sized,
    {
        let value = self.resolve::<T>(ctx, binding)?;
        let errors = match &value {
            Some(v) => validate::validate_parameter(v, binding, &self.options.markers, validator)?,
            None => FieldErrors::new(),
        };
        if !errors.is_empty() {
            debug!(
                param = binding.name(),
                count = errors.len(),
                "captured validation errors"
            );
        }
        Ok(Validated::new(value, errors))
    }

    /// Resolves every parameter of a handler to its JSON value.
    ///
    /// Outcomes are independent and in declaration order, except that a
    /// structural failure is repeated for every parameter.
    pub fn resolve_all(
        &self,
        ctx: &ExtractionContext,
        bindings: &HandlerBindings,
    ) -> Vec<Result<Value, ExtractionError>> {
        bindings
            .iter()
            .map(|binding| self.resolve_value(ctx, binding))
            .collect()
    }
}
