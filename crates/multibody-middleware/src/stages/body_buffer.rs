//! Body buffering middleware.
//!
//! Captures the request body once into a [`ReplayableBody`] so that the
//! multi-body resolver and any downstream body reader both see the full
//! payload. The captured body is stored in the request extensions (where
//! [`ExtractionContext::from_request`](multibody_extract::ExtractionContext::from_request)
//! finds it) and in the [`MiddlewareContext`]; the request itself is
//! rebuilt with a body that replays the same bytes.
//!
//! Only body-bearing requests with a JSON (or absent) content type are
//! buffered. Everything else passes through untouched.

use super::error_normalization::error_response;
use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use http::header::CONTENT_TYPE;
use http::Method;
use http_body_util::Full;
use multibody_extract::{ReplayableBody, DEFAULT_MAX_BODY_SIZE};
use tracing::{trace, warn};

/// Middleware that makes JSON request bodies replayable.
///
/// # Example
///
/// ```
/// use http::Method;
/// use multibody_middleware::stages::BodyBufferMiddleware;
///
/// let buffer = BodyBufferMiddleware::new()
///     .methods([Method::POST, Method::PUT, Method::PATCH])
///     .max_body_bytes(64 * 1024);
///
/// assert_eq!(buffer.max_bytes(), 64 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct BodyBufferMiddleware {
    methods: Vec<Method>,
    content_type_fragment: String,
    buffer_missing_content_type: bool,
    max_body_bytes: usize,
}

impl Default for BodyBufferMiddleware {
    fn default() -> Self {
        Self {
            methods: vec![Method::POST],
            content_type_fragment: "json".to_string(),
            buffer_missing_content_type: true,
            max_body_bytes: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl BodyBufferMiddleware {
    /// Creates a middleware that buffers JSON `POST` bodies up to 1 MiB.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the methods whose bodies are buffered.
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Sets the fragment the content type must contain (case-insensitive).
    #[must_use]
    pub fn content_type_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.content_type_fragment = fragment.into().to_ascii_lowercase();
        self
    }

    /// Sets whether requests without a content type are buffered.
    #[must_use]
    pub fn buffer_missing_content_type(mut self, buffer: bool) -> Self {
        self.buffer_missing_content_type = buffer;
        self
    }

    /// Sets the capture limit in bytes.
    #[must_use]
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Returns the capture limit in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Returns the buffered methods.
    #[must_use]
    pub fn buffered_methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns true if `request` should have its body captured.
    #[must_use]
    pub fn should_buffer(&self, request: &Request) -> bool {
        if !self.methods.contains(request.method()) {
            return false;
        }

        match request.headers().get(CONTENT_TYPE) {
            None => self.buffer_missing_content_type,
            Some(value) => value
                .to_str()
                .map(|ct| ct.to_ascii_lowercase().contains(&self.content_type_fragment))
                .unwrap_or(false),
        }
    }
}

impl Middleware for BodyBufferMiddleware {
    fn name(&self) -> &'static str {
        "body_buffer"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if !self.should_buffer(&request) {
                trace!(method = %request.method(), "body buffering skipped");
                return next.run(ctx, request).await;
            }

            let (mut parts, body) = request.into_parts();
            let captured = match ReplayableBody::capture_body(body, self.max_body_bytes).await {
                Ok(captured) => captured,
                Err(err) => {
                    warn!(
                        request_id = %ctx.request_id(),
                        error_code = err.error_code(),
                        error = %err,
                        "failed to buffer request body"
                    );
                    return error_response(&err, ctx.request_id());
                }
            };

            parts.extensions.insert(captured.clone());
            let replay = Full::new(captured.bytes());
            ctx.set_extension(captured);

            next.run(ctx, Request::from_parts(parts, replay)).await
        })
    }
}
