//! Configured resolver and pipeline, assembled from one configuration.

use multibody_config::MultibodyConfig;
use multibody_extract::MultiBodyResolver;
use multibody_middleware::{BoxFuture, MiddlewareContext, Pipeline, Request, Response};
use tracing::info;

use crate::MultibodyError;

/// The resolver, the standard pipeline and the logging settings built from
/// a [`MultibodyConfig`].
///
/// # Example
///
/// ```rust
/// use multibody::prelude::*;
///
/// let stack = MultibodyStack::from_config(MultibodyConfig::development()).unwrap();
///
/// assert!(stack.resolver().options().policy.accepts_numeric_strings());
/// assert_eq!(
///     stack.pipeline().stage_names(),
///     vec!["request_id", "error_normalization", "body_buffer"]
/// );
/// ```
#[derive(Debug)]
pub struct MultibodyStack {
    config: MultibodyConfig,
    resolver: MultiBodyResolver,
    pipeline: Pipeline,
}

impl MultibodyStack {
    /// Validates `config` and builds the stack from it.
    ///
    /// # Errors
    ///
    /// `MultibodyError::Config` if the configuration is invalid.
    pub fn from_config(config: MultibodyConfig) -> Result<Self, MultibodyError> {
        config.validate()?;

        let resolver = MultiBodyResolver::new(config.resolver_options()?);
        let pipeline = config.pipeline()?;

        Ok(Self {
            config,
            resolver,
            pipeline,
        })
    }

    /// Installs the global logging subscriber described by the configuration.
    ///
    /// # Errors
    ///
    /// `MultibodyError::Telemetry` if a subscriber is already installed or the
    /// level directive is rejected.
    pub fn init_logging(&self) -> Result<(), MultibodyError> {
        multibody_telemetry::init_logging(&self.config.log_config())?;
        info!(
            methods = ?self.config.buffer.methods,
            max_body_bytes = self.config.buffer.max_body_bytes,
            "multibody stack ready"
        );
        Ok(())
    }

    /// Returns the configuration the stack was built from.
    #[must_use]
    pub fn config(&self) -> &MultibodyConfig {
        &self.config
    }

    /// Returns the configured resolver.
    #[must_use]
    pub fn resolver(&self) -> &MultiBodyResolver {
        &self.resolver
    }

    /// Returns the standard pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Runs a request through the pipeline with a fresh context.
    pub async fn handle<H>(&self, request: Request, handler: H) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        self.pipeline
            .process(MiddlewareContext::new(), request, handler)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::{BodyExt, Full};
    use multibody_config::{BufferConfig, RequestIdConfig, ResolverConfig};
    use multibody_extract::{ExtractionContext, ParameterBinding};
    use multibody_middleware::stages::{rejection, REQUEST_ID_HEADER};
    use multibody_middleware::ResponseExt;
    use serde_json::json;

    fn request(body: &'static str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/inventory")
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }

    async fn resolve_qty(stack: &MultibodyStack, body: &'static str) -> (StatusCode, serde_json::Value) {
        let resolver = stack.resolver().clone();
        let response = stack
            .handle(request(body), move |_ctx, req| {
                let ctx = ExtractionContext::from_request(&req);
                let response = match resolver.resolve::<i32>(&ctx, &ParameterBinding::of::<i32>("qty")) {
                    Ok(qty) => Response::json(StatusCode::OK, &json!({ "qty": qty })),
                    Err(err) => rejection(err),
                };
                Box::pin(async move { response })
            })
            .await;

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let config = MultibodyConfig::builder()
            .buffer(BufferConfig {
                max_body_bytes: 0,
                ..Default::default()
            })
            .build();

        let result = MultibodyStack::from_config(config);
        assert!(matches!(result, Err(MultibodyError::Config(_))));
    }

    #[test]
    fn test_production_stack_rejects_numeric_strings() {
        let stack = MultibodyStack::from_config(MultibodyConfig::production()).unwrap();
        assert!(!stack.resolver().options().policy.accepts_numeric_strings());
        assert_eq!(stack.pipeline().stage_count(), 3);
    }

    #[tokio::test]
    async fn test_handle_with_default_config() {
        let stack = MultibodyStack::from_config(MultibodyConfig::default()).unwrap();

        let (status, json) = resolve_qty(&stack, r#"{"qty": 7}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["qty"], 7);

        let (status, json) = resolve_qty(&stack, r#"{"qty": "7"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["key"], "qty");
    }

    #[tokio::test]
    async fn test_handle_with_numeric_string_coercion() {
        let config = MultibodyConfig::builder()
            .resolver(ResolverConfig {
                coerce_numeric_strings: true,
                ..Default::default()
            })
            .build();
        let stack = MultibodyStack::from_config(config).unwrap();

        let (status, json) = resolve_qty(&stack, r#"{"qty": "42"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["qty"], 42);
    }

    #[tokio::test]
    async fn test_handle_reuses_incoming_request_id_when_trusted() {
        let config = MultibodyConfig::builder()
            .request_id(RequestIdConfig { trust_incoming: true })
            .build();
        let stack = MultibodyStack::from_config(config).unwrap();

        let incoming = "01234567-89ab-7def-8123-456789abcdef";
        let mut req = request(r#"{"qty": [1]}"#);
        req.headers_mut()
            .insert(REQUEST_ID_HEADER, http::HeaderValue::from_static(incoming));

        let resolver = stack.resolver().clone();
        let response = stack
            .handle(req, move |_ctx, req| {
                let ctx = ExtractionContext::from_request(&req);
                let response = match resolver.resolve::<i32>(&ctx, &ParameterBinding::of::<i32>("qty")) {
                    Ok(_) => Response::json(StatusCode::OK, &json!({})),
                    Err(err) => rejection(err),
                };
                Box::pin(async move { response })
            })
            .await;

        assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), incoming);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["request_id"], incoming);
    }

    #[tokio::test]
    async fn test_handle_respects_configured_body_limit() {
        let config = MultibodyConfig::builder()
            .buffer(BufferConfig {
                max_body_bytes: 4,
                ..Default::default()
            })
            .build();
        let stack = MultibodyStack::from_config(config).unwrap();

        let (status, json) = resolve_qty(&stack, r#"{"qty": 7}"#).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
    }
}
