//! Error normalization middleware.
//!
//! Handlers reject a request by returning [`rejection`] with the
//! [`ExtractionError`] they got from the resolver. This stage finds the
//! error in the response extensions and replaces the response with the
//! standard envelope, tagged with the request ID:
//!
//! ```json
//! {
//!   "error": {
//!     "code": "TYPE_MISMATCH",
//!     "message": "argument invalid: qty argument type mismatch",
//!     "class": "argument_invalid",
//!     "key": "qty",
//!     "request_id": "0192..."
//!   }
//! }
//! ```
//!
//! Responses without an extraction error pass through untouched.

use crate::context::{MiddlewareContext, RequestId};
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};
use bytes::Bytes;
use http_body_util::Full;
use multibody_extract::{ErrorClass, ExtractionError};
use tracing::{debug, warn};

/// Renders an extraction error as a JSON error envelope.
///
/// # Example
///
/// ```
/// use multibody_extract::ExtractionError;
/// use multibody_middleware::context::RequestId;
/// use multibody_middleware::stages::error_response;
///
/// let response = error_response(&ExtractionError::missing_required("order"), RequestId::new());
/// assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
/// ```
#[must_use]
pub fn error_response(err: &ExtractionError, request_id: RequestId) -> Response {
    let body = serde_json::json!({
        "error": {
            "code": err.error_code(),
            "message": err.to_string(),
            "class": err.class().to_string(),
            "key": err.key(),
            "request_id": request_id.to_string(),
        }
    });
    Response::json(err.status_code(), &body)
}

/// Builds a bare rejection response carrying `err` for
/// [`ErrorNormalizationMiddleware`] to render.
#[must_use]
pub fn rejection(err: ExtractionError) -> Response {
    let mut response = http::Response::new(Full::new(Bytes::new()));
    *response.status_mut() = err.status_code();
    response.extensions_mut().insert(err);
    response
}

/// Summary of the last rendered error, stored in the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedError {
    /// Envelope error code.
    pub code: &'static str,
    /// Rendered message.
    pub message: String,
    /// HTTP status code.
    pub status_code: u16,
    /// Severity class.
    pub class: ErrorClass,
    /// Failing parameter key, if parameter-scoped.
    pub key: Option<String>,
}

impl From<&ExtractionError> for NormalizedError {
    fn from(err: &ExtractionError) -> Self {
        Self {
            code: err.error_code(),
            message: err.to_string(),
            status_code: err.status_code().as_u16(),
            class: err.class(),
            key: err.key().map(ToString::to_string),
        }
    }
}

/// Middleware that renders extraction rejections as error envelopes.
#[derive(Debug, Clone, Default)]
pub struct ErrorNormalizationMiddleware {
    _private: (),
}

impl ErrorNormalizationMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Middleware for ErrorNormalizationMiddleware {
    fn name(&self) -> &'static str {
        "error_normalization"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let mut response = next.run(ctx, request).await;

            let Some(err) = response.extensions_mut().remove::<ExtractionError>() else {
                return response;
            };

            match err.class() {
                ErrorClass::MediaTypeOrBody => warn!(
                    request_id = %ctx.request_id(),
                    error_code = err.error_code(),
                    error = %err,
                    "request body rejected"
                ),
                ErrorClass::ArgumentInvalid => debug!(
                    request_id = %ctx.request_id(),
                    error_code = err.error_code(),
                    key = err.key(),
                    "request parameter rejected"
                ),
            }

            ctx.set_extension(NormalizedError::from(&err));
            error_response(&err, ctx.request_id())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::BodyExt;

    fn make_test_request() -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/orders")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn success_response() -> Response {
        HttpResponse::builder()
            .status(StatusCode::OK)
            .body(Full::new(Bytes::from(r#"{"status":"ok"}"#)))
            .unwrap()
    }

    fn rejecting_handler(
        err: ExtractionError,
    ) -> impl FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> {
        move |_ctx, _req| Box::pin(async move { rejection(err) })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_middleware_name() {
        assert_eq!(ErrorNormalizationMiddleware::new().name(), "error_normalization");
    }

    #[tokio::test]
    async fn test_success_response_passes_through() {
        let middleware = ErrorNormalizationMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let next = Next::handler(|_ctx, _req| Box::pin(async { success_response() }));
        let response = middleware.process(&mut ctx, make_test_request(), next).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(ctx.get_extension::<NormalizedError>().is_none());
    }

    #[tokio::test]
    async fn test_plain_error_status_passes_through() {
        let middleware = ErrorNormalizationMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let next = Next::handler(|_ctx, _req| {
            Box::pin(async {
                let mut response = success_response();
                *response.status_mut() = StatusCode::NOT_FOUND;
                response
            })
        });
        let response = middleware.process(&mut ctx, make_test_request(), next).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(ctx.get_extension::<NormalizedError>().is_none());
    }

    #[tokio::test]
    async fn test_parameter_rejection_rendered() {
        let middleware = ErrorNormalizationMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let next = Next::handler(rejecting_handler(ExtractionError::type_mismatch("qty")));
        let response = middleware.process(&mut ctx, make_test_request(), next).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "TYPE_MISMATCH");
        assert_eq!(json["error"]["class"], "argument_invalid");
        assert_eq!(json["error"]["key"], "qty");
        assert_eq!(json["error"]["request_id"], ctx.request_id().to_string());

        let normalized = ctx.get_extension::<NormalizedError>().unwrap();
        assert_eq!(normalized.status_code, 400);
        assert_eq!(normalized.key.as_deref(), Some("qty"));
    }

    #[tokio::test]
    async fn test_structural_rejection_has_no_key() {
        let middleware = ErrorNormalizationMiddleware::new();
        let mut ctx = MiddlewareContext::new();

        let err = ExtractionError::structural("create_order(order: Order)", "expected a JSON object");
        let next = Next::handler(rejecting_handler(err));
        let response = middleware.process(&mut ctx, make_test_request(), next).await;

        let json = body_json(response).await;
        assert_eq!(json["error"]["class"], "media_type_or_body");
        assert!(json["error"]["key"].is_null());
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("create_order(order: Order)"));
    }

    #[tokio::test]
    async fn test_validation_rejection_status() {
        let response = error_response(
            &ExtractionError::validation_failed("user", "name must not be empty"),
            RequestId::new(),
        );
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "argument invalid: name must not be empty");
    }

    #[test]
    fn test_rejection_carries_error() {
        let response = rejection(ExtractionError::missing_required("order"));

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.extensions().get::<ExtractionError>().is_some());
    }
}
