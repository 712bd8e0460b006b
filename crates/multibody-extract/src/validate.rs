//! Validation bridge.
//!
//! The rule engine itself lives elsewhere. This module only defines the
//! contract ([`ParamValidator`]: value plus group hints in, field errors
//! out), the closed set of markers that switch validation on, and how a
//! non-empty error list becomes either an [`ExtractionError`] or a
//! [`Validated`] value handed to the handler.

use crate::binding::ParameterBinding;
use crate::error::ExtractionError;
use std::collections::BTreeSet;

/// A validation marker attached to a parameter binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMarker {
    name: String,
    groups: Vec<String>,
}

impl ValidationMarker {
    /// Creates a marker with no group hints.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
        }
    }

    /// Sets the validation group hints passed to the validator.
    #[must_use]
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the marker name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the group hints.
    #[must_use]
    pub fn group_hints(&self) -> &[String] {
        &self.groups
    }
}

/// The closed set of marker names that trigger validation.
///
/// # Example
///
/// ```rust
/// use multibody_extract::{ValidationMarker, ValidationMarkers};
///
/// let markers = ValidationMarkers::default();
/// assert!(markers.recognizes(&ValidationMarker::new("Valid")));
/// assert!(!markers.recognizes(&ValidationMarker::new("ValidLooking")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMarkers(BTreeSet<String>);

impl ValidationMarkers {
    /// Creates a marker set from names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Returns true if `marker` is one of the recognized names.
    #[must_use]
    pub fn recognizes(&self, marker: &ValidationMarker) -> bool {
        self.0.contains(marker.name())
    }

    /// Iterates over the recognized names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns true if no marker is recognized (validation is off).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ValidationMarkers {
    fn default() -> Self {
        Self::new(["Valid", "Validated"])
    }
}

/// A single violated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field path inside the parameter value.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

/// Field errors collected for one parameter, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Creates an empty error list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field error.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns the first reported error.
    #[must_use]
    pub fn first(&self) -> Option<&FieldError> {
        self.0.first()
    }

    /// Iterates over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing was violated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts errors reported by the `validator` crate.
    ///
    /// Fields are ordered by name so the first error is stable.
    #[must_use]
    pub fn from_validator(errors: &validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let mut result = Self::new();
        for (field, field_errors) in fields {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| format!("{field} failed `{}` validation", error.code), ToString::to_string);
                result.add(field.to_string(), message);
            }
        }
        result
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Validates a parameter value.
///
/// Closures of the form `Fn(&T, &[String]) -> FieldErrors` are validators.
pub trait ParamValidator<T: ?Sized> {
    /// Returns the violated fields of `value` under the given group hints.
    fn validate(&self, value: &T, groups: &[String]) -> FieldErrors;
}

impl<T: ?Sized, F> ParamValidator<T> for F
where
    F: Fn(&T, &[String]) -> FieldErrors,
{
    fn validate(&self, value: &T, groups: &[String]) -> FieldErrors {
        self(value, groups)
    }
}

/// Validator for types deriving [`validator::Validate`].
///
/// Group hints are ignored; the derive has no notion of groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeriveValidator;

impl<T: validator::Validate> ParamValidator<T> for DeriveValidator {
    fn validate(&self, value: &T, _groups: &[String]) -> FieldErrors {
        match value.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => FieldErrors::from_validator(&errors),
        }
    }
}

/// A resolved parameter together with its captured validation errors.
///
/// Handlers that declare an errors parameter after a validated one receive
/// this instead of a raised validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    value: Option<T>,
    errors: FieldErrors,
}

impl<T> Validated<T> {
    /// Pairs a value with its errors.
    #[must_use]
    pub fn new(value: Option<T>, errors: FieldErrors) -> Self {
        Self { value, errors }
    }

    /// Returns the value (`None` for an absent optional parameter).
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Returns the captured errors.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Returns true if validation passed or was not run.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the wrapper, returning the value.
    #[must_use]
    pub fn into_inner(self) -> Option<T> {
        self.value
    }

    /// Consumes the wrapper, returning value and errors.
    #[must_use]
    pub fn into_parts(self) -> (Option<T>, FieldErrors) {
        (self.value, self.errors)
    }
}

/// Runs `validator` for a resolved value if the binding asks for it.
///
/// Returns the (possibly empty) error list when the binding captures errors.
///
/// # Errors
///
/// `ValidationFailed` with the first field's message when errors were found
/// and the binding does not capture them.
pub fn validate_parameter<T, V>(
    value: &T,
    binding: &ParameterBinding,
    markers: &ValidationMarkers,
    validator: &V,
) -> Result<FieldErrors, ExtractionError>
where
    T: ?Sized,
    V: ParamValidator<T> + ?Sized,
{
    let Some(marker) = binding.validation().filter(|m| markers.recognizes(m)) else {
        return Ok(FieldErrors::new());
    };

    let errors = validator.validate(value, marker.group_hints());
    if binding.captures_errors() {
        return Ok(errors);
    }

    match errors.first() {
        Some(first) => Err(ExtractionError::validation_failed(
            binding.effective_key(),
            first.message.clone(),
        )),
        None => Ok(errors),
    }
}
