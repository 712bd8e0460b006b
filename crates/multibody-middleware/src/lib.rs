//! # Multibody Middleware
//!
//! Pipeline stages that prepare a request for multi-body parameter
//! resolution and turn resolution failures into JSON error envelopes.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Request → RequestId → ErrorNormalization → BodyBuffer → Handler
//!                                                            ↓
//! Response ← RequestId ← ErrorNormalization ←───────────────┘
//! ```
//!
//! | Stage | Middleware          | Purpose                                        |
//! |-------|---------------------|------------------------------------------------|
//! | 1     | Request ID          | Generate/propagate request ID (UUID v7)        |
//! | 2     | Error Normalization | Render extraction rejections as envelopes      |
//! | 3     | Body Buffer         | Capture the JSON body so it can be replayed    |
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use http_body_util::Full;
//! use multibody_extract::{ExtractionContext, MultiBodyResolver, ParameterBinding};
//! use multibody_middleware::stages::{rejection, BodyBufferMiddleware};
//! use multibody_middleware::{MiddlewareContext, Pipeline};
//!
//! # tokio_test::block_on(async {
//! let pipeline = Pipeline::standard(BodyBufferMiddleware::new());
//!
//! let request = http::Request::builder()
//!     .method("POST")
//!     .header("content-type", "application/json")
//!     .body(Full::new(Bytes::from(r#"{"qty":[1]}"#)))
//!     .unwrap();
//!
//! let response = pipeline
//!     .process(MiddlewareContext::new(), request, |_ctx, req| {
//!         let ctx = ExtractionContext::from_request(&req);
//!         let result = MultiBodyResolver::default()
//!             .resolve::<i32>(&ctx, &ParameterBinding::of::<i32>("qty"));
//!         Box::pin(async move {
//!             match result {
//!                 Ok(_) => http::Response::new(Full::new(Bytes::new())),
//!                 Err(err) => rejection(err),
//!             }
//!         })
//!     })
//!     .await;
//!
//! assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/multibody-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use context::{MiddlewareContext, RequestId};
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder};
pub use types::{Request, Response, ResponseExt};
