//! Extraction context providing access to request data.
//!
//! The [`ExtractionContext`] is what the resolver reads from: request line,
//! headers, the captured [`ReplayableBody`] and the [`BodyMap`] decoded from
//! it. The map is decoded on first use and cached for the rest of the
//! request, so every parameter of a handler shares one decode (and one
//! structural failure, if the body is malformed).

use crate::body::ReplayableBody;
use crate::charset::Charset;
use crate::error::ExtractionError;
use crate::map::BodyMap;
use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use std::sync::OnceLock;

/// Request-scoped view used by the resolver.
///
/// # Example
///
/// ```rust
/// use multibody_extract::{Charset, ExtractionContext, ReplayableBody};
/// use http::{HeaderMap, Method, Uri};
///
/// let ctx = ExtractionContext::new(
///     Method::POST,
///     Uri::from_static("/orders"),
///     HeaderMap::new(),
///     Some(ReplayableBody::from_bytes(&br#"{"a":1}"#[..])),
/// );
///
/// let map = ctx.body_map("create(a)", Charset::Utf8).unwrap();
/// assert!(map.contains_key("a"));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Option<ReplayableBody>,
    map: OnceLock<Result<BodyMap, ExtractionError>>,
}

impl ExtractionContext {
    /// Creates a new extraction context.
    ///
    /// `body` is `None` when the request was not captured by the body
    /// buffer; resolving any parameter then fails as a body error.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Option<ReplayableBody>) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            map: OnceLock::new(),
        }
    }

    /// Creates a context from request parts.
    ///
    /// The body is taken from the [`ReplayableBody`] extension the body
    /// buffer stage inserts.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        Self::new(
            parts.method.clone(),
            parts.uri.clone(),
            parts.headers.clone(),
            parts.extensions.get::<ReplayableBody>().cloned(),
        )
    }

    /// Creates a context from a request without consuming its body.
    #[must_use]
    pub fn from_request<B>(request: &http::Request<B>) -> Self {
        Self::new(
            request.method().clone(),
            request.uri().clone(),
            request.headers().clone(),
            request.extensions().get::<ReplayableBody>().cloned(),
        )
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a specific header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns the captured body, if the request was buffered.
    #[must_use]
    pub fn body(&self) -> Option<&ReplayableBody> {
        self.body.as_ref()
    }

    /// Returns true if the body buffer captured this request.
    #[must_use]
    pub fn is_buffered(&self) -> bool {
        self.body.is_some()
    }

    /// Picks the charset for body decoding.
    ///
    /// # Errors
    ///
    /// A body error naming `signature` when the declared charset is not
    /// supported.
    pub fn charset(&self, signature: &str, default: Charset) -> Result<Charset, ExtractionError> {
        match Charset::declared_label(self.content_type()) {
            Some(label) => Charset::from_label(&label)
                .ok_or_else(|| ExtractionError::unsupported_charset(signature, &label)),
            None => Ok(default),
        }
    }

    /// Returns the body map, decoding it on first call.
    ///
    /// Later calls return the cached map, or a clone of the cached error.
    ///
    /// # Errors
    ///
    /// A `StructuralDecode` error naming `signature` when the body is not a
    /// JSON object, is not valid text, or was never captured.
    pub fn body_map(&self, signature: &str, default: Charset) -> Result<&BodyMap, ExtractionError> {
        self.map
            .get_or_init(|| self.decode_map(signature, default))
            .as_ref()
            .map_err(Clone::clone)
    }

    fn decode_map(&self, signature: &str, default: Charset) -> Result<BodyMap, ExtractionError> {
        let Some(body) = &self.body else {
            tracing::warn!(signature, "request body was not captured by the body buffer");
            return Err(ExtractionError::structural(signature, "request body was not captured"));
        };

        let charset = self.charset(signature, default)?;
        BodyMap::decode(body.as_bytes(), charset).map_err(|e| {
            tracing::warn!(signature, error = %e, "failed to decode multi-body request");
            ExtractionError::structural(signature, e)
        })
    }
}

/// Builder for constructing an `ExtractionContext`.
///
/// Defaults to `POST /` with no headers and no captured body.
#[derive(Debug, Default)]
pub struct ExtractionContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Option<ReplayableBody>,
}

impl ExtractionContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Adds a single header.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets a captured body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(ReplayableBody::from_bytes(body));
        self
    }

    /// Builds the extraction context.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        ExtractionContext::new(
            self.method.unwrap_or(Method::POST),
            self.uri.unwrap_or_else(|| Uri::from_static("/")),
            self.headers,
            self.body,
        )
    }
}
