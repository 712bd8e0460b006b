//! Ordered middleware pipeline.
//!
//! Requests flow through the stages in the order they were added, then
//! reach the handler. Responses travel back out through the same stages in
//! reverse.
//!
//! ## Standard Order
//!
//! 1. **Request ID** - Generate or propagate the request ID (UUID v7)
//! 2. **Error Normalization** - Render extraction rejections as JSON envelopes
//! 3. **Body Buffer** - Capture the body so it can be read more than once
//!
//! [`Pipeline::standard`] builds exactly this order.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::stages::{BodyBufferMiddleware, ErrorNormalizationMiddleware, RequestIdMiddleware};
use crate::types::{Request, Response};
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable, ordered middleware pipeline.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use http_body_util::Full;
/// use multibody_middleware::{MiddlewareContext, Pipeline};
/// use multibody_middleware::stages::BodyBufferMiddleware;
///
/// # tokio_test::block_on(async {
/// let pipeline = Pipeline::standard(BodyBufferMiddleware::new());
///
/// let request = http::Request::builder()
///     .method("POST")
///     .header("content-type", "application/json")
///     .body(Full::new(Bytes::from(r#"{"a":1}"#)))
///     .unwrap();
///
/// let response = pipeline
///     .process(MiddlewareContext::new(), request, |_ctx, _req| {
///         Box::pin(async { http::Response::new(Full::new(Bytes::from("done"))) })
///     })
///     .await;
///
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert!(response.headers().contains_key("x-request-id"));
/// # });
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Builds the standard request ID, error normalization, body buffer order.
    ///
    /// Request IDs are always freshly generated.
    #[must_use]
    pub fn standard(body_buffer: BodyBufferMiddleware) -> Self {
        Self::standard_with(RequestIdMiddleware::new(), body_buffer)
    }

    /// Builds the standard order around a configured request ID stage.
    #[must_use]
    pub fn standard_with(request_id: RequestIdMiddleware, body_buffer: BodyBufferMiddleware) -> Self {
        Self::builder()
            .stage(request_id)
            .stage(ErrorNormalizationMiddleware::new())
            .stage(body_buffer)
            .build()
    }

    /// Processes a request through every stage and then the handler.
    pub async fn process<H>(
        &self,
        mut ctx: MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(&mut ctx, request).await
    }

    // Built back to front so the first stage runs first.
    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared stage.
    #[must_use]
    pub fn shared_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}
