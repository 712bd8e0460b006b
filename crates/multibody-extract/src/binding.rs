//! Parameter binding declarations.
//!
//! A [`ParameterBinding`] says which key of the body object feeds a
//! parameter, whether the key must be present, what shape the value must
//! take and how it is validated. Bindings are immutable once built;
//! [`HandlerBindings`] groups the bindings of one handler and stamps each
//! with its position and the handler signature used in error messages.

use crate::target::{BodyTarget, TargetShape};
use crate::validate::ValidationMarker;
use std::sync::Arc;

/// Declaration of one multi-body parameter.
///
/// # Example
///
/// ```rust
/// use multibody_extract::{ParameterBinding, TargetShape, ValidationMarker};
///
/// let binding = ParameterBinding::of::<i64>("count")
///     .key("n")
///     .optional()
///     .validated(ValidationMarker::new("Valid"));
///
/// assert_eq!(binding.effective_key(), "n");
/// assert!(!binding.is_required());
/// assert!(matches!(binding.shape(), TargetShape::Primitive(_)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBinding {
    name: String,
    key: Option<String>,
    required: bool,
    shape: TargetShape,
    type_name: &'static str,
    validation: Option<ValidationMarker>,
    captures_errors: bool,
    index: usize,
    signature: Arc<str>,
}

impl ParameterBinding {
    /// Declares a parameter with an explicit shape.
    #[must_use]
    pub fn new(name: impl Into<String>, shape: TargetShape) -> Self {
        let name = name.into();
        Self {
            signature: Arc::from(format!("<unbound>({name})")),
            name,
            key: None,
            required: true,
            shape,
            type_name: "serde_json::Value",
            validation: None,
            captures_errors: false,
            index: 0,
        }
    }

    /// Declares a parameter whose shape comes from its Rust type.
    ///
    /// `Option<T>` normalizes to the shape of `T`.
    #[must_use]
    pub fn of<T: BodyTarget>(name: impl Into<String>) -> Self {
        let mut binding = Self::new(name, T::SHAPE);
        binding.type_name = std::any::type_name::<T>();
        binding
    }

    /// Binds to a differently named body key.
    ///
    /// An empty alias keeps the parameter name as the key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.key = (!key.is_empty()).then_some(key);
        self
    }

    /// Sets whether the key must be present and non-null.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Allows the key to be absent or null.
    #[must_use]
    pub fn optional(self) -> Self {
        self.required(false)
    }

    /// Attaches a validation marker.
    #[must_use]
    pub fn validated(mut self, marker: ValidationMarker) -> Self {
        self.validation = Some(marker);
        self
    }

    /// Routes validation failures to the following errors parameter
    /// instead of raising them.
    #[must_use]
    pub fn capture_errors(mut self) -> Self {
        self.captures_errors = true;
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the body key this parameter reads: the alias, else the name.
    #[must_use]
    pub fn effective_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    /// Returns whether the key must be present and non-null.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the declared target shape.
    #[must_use]
    pub fn shape(&self) -> TargetShape {
        self.shape
    }

    /// Returns the declared Rust type name, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the validation marker, if any.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationMarker> {
        self.validation.as_ref()
    }

    /// Returns whether validation failures are captured instead of raised.
    #[must_use]
    pub fn captures_errors(&self) -> bool {
        self.captures_errors
    }

    /// Returns the position of this parameter in its handler.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the owning handler's signature.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// The ordered multi-body parameters of one handler.
///
/// # Example
///
/// ```rust
/// use multibody_extract::{HandlerBindings, ParameterBinding, ValidationMarker};
///
/// let bindings = HandlerBindings::builder("create_order")
///     .param(ParameterBinding::of::<serde_json::Value>("order").validated(ValidationMarker::new("Valid")))
///     .errors()
///     .param(ParameterBinding::of::<i64>("count").optional())
///     .build();
///
/// assert_eq!(bindings.len(), 2);
/// assert!(bindings.get("order").unwrap().captures_errors());
/// assert_eq!(bindings.get("count").unwrap().index(), 1);
/// assert!(bindings.signature().starts_with("create_order(order: "));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerBindings {
    signature: Arc<str>,
    bindings: Vec<ParameterBinding>,
}

impl HandlerBindings {
    /// Starts declaring the parameters of `handler`.
    #[must_use]
    pub fn builder(handler: impl Into<String>) -> HandlerBindingsBuilder {
        HandlerBindingsBuilder {
            handler: handler.into(),
            bindings: Vec::new(),
        }
    }

    /// Returns the handler signature, e.g. `create_order(order: Order, count: i64)`.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Looks up a binding by parameter name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// Iterates over the bindings in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParameterBinding> {
        self.bindings.iter()
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no parameters were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'a> IntoIterator for &'a HandlerBindings {
    type Item = &'a ParameterBinding;
    type IntoIter = std::slice::Iter<'a, ParameterBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

/// Builder for [`HandlerBindings`].
#[derive(Debug)]
pub struct HandlerBindingsBuilder {
    handler: String,
    bindings: Vec<ParameterBinding>,
}

impl HandlerBindingsBuilder {
    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, binding: ParameterBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Declares an errors parameter right after the last one.
    ///
    /// The preceding parameter's validation failures are then captured.
    /// Has no effect when no parameter was declared yet.
    #[must_use]
    pub fn errors(mut self) -> Self {
        if let Some(last) = self.bindings.last_mut() {
            last.captures_errors = true;
        }
        self
    }

    /// Finishes the declaration.
    #[must_use]
    pub fn build(self) -> HandlerBindings {
        let params = self
            .bindings
            .iter()
            .map(|b| format!("{}: {}", b.name, short_type_name(b.type_name)))
            .collect::<Vec<_>>()
            .join(", ");
        let signature: Arc<str> = Arc::from(format!("{}({params})", self.handler));

        let bindings = self
            .bindings
            .into_iter()
            .enumerate()
            .map(|(index, mut b)| {
                b.index = index;
                b.signature = Arc::clone(&signature);
                b
            })
            .collect();

        HandlerBindings {
            signature,
            bindings,
        }
    }
}

/// Strips module paths: `alloc::vec::Vec<my::Item>` becomes `Vec<Item>`.
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or(""));
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or(""));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::PrimitiveKind;

    #[test]
    fn test_defaults() {
        let binding = ParameterBinding::of::<i64>("count");

        assert_eq!(binding.name(), "count");
        assert_eq!(binding.effective_key(), "count");
        assert!(binding.is_required());
        assert_eq!(binding.shape(), TargetShape::Primitive(PrimitiveKind::Long));
        assert_eq!(binding.type_name(), "i64");
        assert!(binding.validation().is_none());
        assert!(!binding.captures_errors());
    }

    #[test]
    fn test_alias_and_empty_alias() {
        assert_eq!(ParameterBinding::of::<i64>("count").key("n").effective_key(), "n");
        assert_eq!(ParameterBinding::of::<i64>("count").key("").effective_key(), "count");
    }

    #[test]
    fn test_option_normalizes_to_inner_shape() {
        let binding = ParameterBinding::of::<Option<Vec<String>>>("tags");
        assert_eq!(binding.shape(), TargetShape::Array);
    }

    #[test]
    fn test_handler_bindings_stamp_index_and_signature() {
        let bindings = HandlerBindings::builder("update")
            .param(ParameterBinding::of::<Vec<String>>("tags"))
            .param(ParameterBinding::of::<i32>("limit").optional())
            .build();

        assert_eq!(bindings.signature(), "update(tags: Vec<String>, limit: i32)");
        let limit = bindings.get("limit").unwrap();
        assert_eq!(limit.index(), 1);
        assert_eq!(limit.signature(), bindings.signature());
        assert_eq!(bindings.iter().count(), 2);
    }

    #[test]
    fn test_errors_marks_previous_param() {
        let bindings = HandlerBindings::builder("h")
            .errors()
            .param(ParameterBinding::of::<i32>("a"))
            .param(ParameterBinding::of::<i32>("b"))
            .errors()
            .build();

        assert!(!bindings.get("a").unwrap().captures_errors());
        assert!(bindings.get("b").unwrap().captures_errors());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("alloc::string::String"), "String");
        assert_eq!(
            short_type_name("std::collections::hash::map::HashMap<alloc::string::String, i32>"),
            "HashMap<String, i32>"
        );
    }
}
