//! Extraction error types.
//!
//! Every failure the resolver can report maps to one [`ExtractionErrorKind`].
//! Per-parameter failures (missing, mismatch, validation) are
//! [`ErrorClass::ArgumentInvalid`]; failures that concern the body as a whole
//! (structural decode, capture) are [`ErrorClass::MediaTypeOrBody`].

use http::StatusCode;
use std::fmt;

/// Source of extraction (where data was being extracted from).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// The request body as a whole
    Body,
    /// A single keyed parameter inside the body object
    Parameter,
    /// Content-Type header (charset) specifically
    ContentType,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => write!(f, "body"),
            Self::Parameter => write!(f, "parameter"),
            Self::ContentType => write!(f, "content-type"),
        }
    }
}

/// What went wrong during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionErrorKind {
    /// A required key is absent from the body or is JSON `null`
    MissingRequired,
    /// The value is present but cannot become the declared target shape
    TypeMismatch,
    /// The value converted fine but failed its declared validation
    ValidationFailed,
    /// The body is not a JSON object (or not decodable text at all)
    StructuralDecode,
    /// The body exceeded the capture limit
    PayloadTooLarge,
    /// The transport failed while the body was being captured
    BodyRead,
}

/// Severity class of an extraction error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// One parameter is invalid; siblings are unaffected.
    ArgumentInvalid,
    /// The body or its media type is unusable; every parameter fails.
    MediaTypeOrBody,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgumentInvalid => write!(f, "argument_invalid"),
            Self::MediaTypeOrBody => write!(f, "media_type_or_body"),
        }
    }
}

/// Error that occurs while resolving a multi-body parameter.
///
/// Carries the offending key and, for coercion failures, the attempted value
/// and target kind. Errors are `Clone` so that a structural failure computed
/// once per request can be handed to every declared parameter.
///
/// # Example
///
/// ```rust
/// use multibody_extract::{ErrorClass, ExtractionError, ExtractionErrorKind};
/// use http::StatusCode;
///
/// let err = ExtractionError::missing_required("user");
/// assert_eq!(err.kind(), ExtractionErrorKind::MissingRequired);
/// assert_eq!(err.class(), ErrorClass::ArgumentInvalid);
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.to_string(), "argument invalid: user is null");
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    key: Option<String>,
    attempted: Option<String>,
    target: Option<String>,
    message: String,
}

impl ExtractionError {
    fn parameter(kind: ExtractionErrorKind, key: String, message: String) -> Self {
        Self {
            extraction_source: ExtractionSource::Parameter,
            kind,
            key: Some(key),
            attempted: None,
            target: None,
            message,
        }
    }

    /// Creates an error for a required key that is absent or `null`.
    #[must_use]
    pub fn missing_required(key: impl Into<String>) -> Self {
        let key = key.into();
        let message = format!("argument invalid: {key} is null");
        Self::parameter(ExtractionErrorKind::MissingRequired, key, message)
    }

    /// Creates an error for a value whose JSON shape the target cannot accept.
    #[must_use]
    pub fn type_mismatch(key: impl Into<String>) -> Self {
        let key = key.into();
        let message = format!("argument invalid: {key} argument type mismatch");
        Self::parameter(ExtractionErrorKind::TypeMismatch, key, message)
    }

    /// Creates a type mismatch raised while decoding a structured value.
    #[must_use]
    pub fn conversion_failed(key: impl Into<String>, details: impl fmt::Display) -> Self {
        let key = key.into();
        let message = format!("argument invalid: {key} argument type mismatch: {details}");
        Self::parameter(ExtractionErrorKind::TypeMismatch, key, message)
    }

    /// Creates a type mismatch raised by primitive coercion.
    ///
    /// The attempted value and the target kind are kept for diagnostics.
    #[must_use]
    pub fn coercion_failed(
        key: impl Into<String>,
        attempted: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let attempted = attempted.into();
        let target = target.into();
        let message = format!(
            "argument invalid: {key} argument type mismatch (cannot convert {attempted} to {target})"
        );
        let mut err = Self::parameter(ExtractionErrorKind::TypeMismatch, key, message);
        err.attempted = Some(attempted);
        err.target = Some(target);
        err
    }

    /// Creates an error for a value that failed declared validation.
    ///
    /// `first_message` is the message of the first violated field.
    #[must_use]
    pub fn validation_failed(key: impl Into<String>, first_message: impl Into<String>) -> Self {
        let key = key.into();
        let message = format!("argument invalid: {}", first_message.into());
        Self::parameter(ExtractionErrorKind::ValidationFailed, key, message)
    }

    /// Creates an error for a body that could not be decoded as a JSON object.
    ///
    /// `signature` names the handler whose parameter triggered the decode.
    #[must_use]
    pub fn structural(signature: &str, cause: impl fmt::Display) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::StructuralDecode,
            key: None,
            attempted: None,
            target: None,
            message: format!(
                "media type or body error in {signature}: {cause} \
                 (check that the request is a JSON POST captured by the body buffer)"
            ),
        }
    }

    /// Creates an error for an unsupported declared charset.
    #[must_use]
    pub fn unsupported_charset(signature: &str, charset: &str) -> Self {
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::StructuralDecode,
            key: None,
            attempted: None,
            target: None,
            message: format!("media type or body error in {signature}: unsupported charset '{charset}'"),
        }
    }

    /// Creates an error for a body larger than the capture limit.
    #[must_use]
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::PayloadTooLarge,
            key: None,
            attempted: None,
            target: None,
            message: format!("payload too large: max {max_size} bytes, got {actual_size} bytes"),
        }
    }

    /// Creates an error for a streamed body that overran the capture limit
    /// before its full length was known.
    #[must_use]
    pub fn payload_exceeds(max_size: usize) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::PayloadTooLarge,
            key: None,
            attempted: None,
            target: None,
            message: format!("payload too large: exceeds max {max_size} bytes"),
        }
    }

    /// Creates an error for a transport failure during body capture.
    #[must_use]
    pub fn body_read(cause: impl fmt::Display) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::BodyRead,
            key: None,
            attempted: None,
            target: None,
            message: format!("failed to read request body: {cause}"),
        }
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns what went wrong.
    #[must_use]
    pub fn kind(&self) -> ExtractionErrorKind {
        self.kind
    }

    /// Returns the body key of the failing parameter, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the value coercion attempted to convert, if coercion-sourced.
    #[must_use]
    pub fn attempted_value(&self) -> Option<&str> {
        self.attempted.as_deref()
    }

    /// Returns the coercion target kind, if coercion-sourced.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Returns the rendered message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the severity class of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self.kind {
            ExtractionErrorKind::MissingRequired
            | ExtractionErrorKind::TypeMismatch
            | ExtractionErrorKind::ValidationFailed => ErrorClass::ArgumentInvalid,
            ExtractionErrorKind::StructuralDecode
            | ExtractionErrorKind::PayloadTooLarge
            | ExtractionErrorKind::BodyRead => ErrorClass::MediaTypeOrBody,
        }
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::MissingRequired
            | ExtractionErrorKind::TypeMismatch
            | ExtractionErrorKind::StructuralDecode
            | ExtractionErrorKind::BodyRead => StatusCode::BAD_REQUEST,
            ExtractionErrorKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::MissingRequired => "MISSING_PARAMETER",
            ExtractionErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ExtractionErrorKind::ValidationFailed => "VALIDATION_FAILED",
            ExtractionErrorKind::StructuralDecode => "MEDIA_TYPE_OR_BODY_ERROR",
            ExtractionErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ExtractionErrorKind::BodyRead => "BODY_READ_FAILED",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}
