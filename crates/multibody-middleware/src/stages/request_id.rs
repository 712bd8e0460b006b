//! Request ID middleware.
//!
//! Every request gets a UUID v7 request ID. It is stored in the
//! [`MiddlewareContext`] and in the request extensions, written to the
//! `x-request-id` response header and embedded in error envelopes. The rest
//! of the pipeline runs inside a `request` span carrying the ID, so the
//! resolver's per-parameter log lines can be matched to a rejected request.
//!
//! When configured to trust incoming IDs, a valid UUID in the request's
//! `x-request-id` header is reused instead.

use crate::context::{MiddlewareContext, RequestId};
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use http::HeaderValue;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that assigns each request its ID.
///
/// # Example
///
/// ```
/// use multibody_middleware::stages::RequestIdMiddleware;
/// use multibody_middleware::Middleware;
///
/// let middleware = RequestIdMiddleware::trust_incoming();
/// assert!(middleware.trusts_incoming());
/// assert_eq!(middleware.name(), "request_id");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that always generates fresh IDs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that reuses a valid incoming `x-request-id`.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self { trust_incoming: true }
    }

    /// Returns true if incoming IDs are reused.
    #[must_use]
    pub fn trusts_incoming(&self) -> bool {
        self.trust_incoming
    }

    fn assign(&self, request: &Request) -> RequestId {
        let incoming = self
            .trust_incoming
            .then(|| request.headers().get(REQUEST_ID_HEADER))
            .flatten()
            .and_then(|value| value.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok());

        incoming.map_or_else(RequestId::new, RequestId::from_uuid)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        mut request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        let request_id = self.assign(&request);
        ctx.set_request_id(request_id);
        request.extensions_mut().insert(request_id);

        let span = info_span!(
            "request",
            request_id = %request_id,
            http.method = %request.method(),
            http.path = %request.uri().path(),
        );

        Box::pin(
            async move {
                let mut response = next.run(ctx, request).await;

                // Hyphenated UUIDs are always valid header values
                if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                response
            }
            .instrument(span),
        )
    }
}
