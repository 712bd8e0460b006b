//! # Multibody Extract
//!
//! Resolves several independently typed parameters from one JSON request
//! body. Each parameter is addressed by a key of the top-level object:
//!
//! ```text
//! POST /orders
//! {"order": {"sku": "A-1", "qty": 2}, "notify": true, "priority": 3}
//!      │                              │                │
//!      ▼                              ▼                ▼
//!   order: Order              notify: bool      priority: i32
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Type | Description |
//! |-------|------|-------------|
//! | Capture | [`ReplayableBody`] | Drain the transport body once, replay it any number of times |
//! | Decode | [`BodyMap`] | Parse the body into a shallow key → JSON map, once per request |
//! | Extract | [`extract`] | Look up the key, apply required/optional rules and shape checks |
//! | Coerce | [`CoercionPolicy`] | Convert JSON values into primitive targets |
//! | Validate | [`ParamValidator`] | Run declared validation, raise or capture field errors |
//!
//! [`MultiBodyResolver`] runs the whole pipeline for one declared
//! [`ParameterBinding`].
//!
//! ## Example
//!
//! ```rust
//! use multibody_extract::{
//!     BodyTarget, ExtractionContextBuilder, ExtractionErrorKind, HandlerBindings,
//!     MultiBodyResolver, ParameterBinding,
//! };
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Order {
//!     sku: String,
//!     qty: u32,
//! }
//!
//! impl BodyTarget for Order {}
//!
//! let bindings = HandlerBindings::builder("create_order")
//!     .param(ParameterBinding::of::<Order>("order"))
//!     .param(ParameterBinding::of::<bool>("notify"))
//!     .param(ParameterBinding::of::<i32>("priority"))
//!     .param(ParameterBinding::of::<String>("note").optional())
//!     .build();
//!
//! let ctx = ExtractionContextBuilder::new()
//!     .header("content-type", "application/json")
//!     .body(r#"{"order":{"sku":"A-1","qty":2},"notify":true,"priority":3.7}"#)
//!     .build();
//!
//! let resolver = MultiBodyResolver::default();
//! let order: Order = resolver.resolve(&ctx, bindings.get("order").unwrap()).unwrap().unwrap();
//! let notify: bool = resolver.resolve(&ctx, bindings.get("notify").unwrap()).unwrap().unwrap();
//! let priority: i32 = resolver.resolve(&ctx, bindings.get("priority").unwrap()).unwrap().unwrap();
//! let note: Option<String> = resolver.resolve(&ctx, bindings.get("note").unwrap()).unwrap();
//!
//! assert_eq!(order.sku, "A-1");
//! assert_eq!(order.qty, 2);
//! assert!(notify);
//! assert_eq!(priority, 3);
//! assert!(note.is_none());
//! ```
//!
//! ## Error Handling
//!
//! Every failure is an [`ExtractionError`]. Per-parameter failures are
//! independent of each other; a body that is not a JSON object fails every
//! parameter of the request with the same structural error.
//!
//! ```rust
//! use multibody_extract::{ErrorClass, ExtractionError};
//!
//! let err = ExtractionError::missing_required("order");
//! assert_eq!(err.class(), ErrorClass::ArgumentInvalid);
//! assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
//! ```

#![doc(html_root_url = "https://docs.rs/multibody-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binding;
mod body;
mod charset;
mod coerce;
mod context;
mod error;
mod extractor;
mod map;
mod resolver;
mod target;
mod validate;

pub use binding::{HandlerBindings, HandlerBindingsBuilder, ParameterBinding};
pub use body::{BodyReader, ReplayableBody, DEFAULT_MAX_BODY_SIZE};
pub use charset::{Charset, CharsetError};
pub use coerce::{CoercionError, CoercionPolicy};
pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::{ErrorClass, ExtractionError, ExtractionErrorKind, ExtractionSource};
pub use extractor::{check_compatible, extract, FromRequest};
pub use map::{BodyMap, DecodeError};
pub use resolver::{MultiBodyResolver, ResolverOptions};
pub use target::{BodyTarget, PrimitiveKind, TargetShape};
pub use validate::{
    validate_parameter, DeriveValidator, FieldError, FieldErrors, ParamValidator, Validated,
    ValidationMarker, ValidationMarkers,
};
