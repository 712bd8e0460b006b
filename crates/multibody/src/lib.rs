//! # Multibody
//!
//! **Several typed handler parameters from one JSON request body**
//!
//! A handler declares parameters by name; each one is read from the key of
//! the same name in the top-level JSON object of the request body:
//!
//! - **Replayable capture** – The body is buffered once and read by every parameter
//! - **Typed resolution** – Records, collections and primitives with numeric coercion
//! - **Declared validation** – Marker-driven validation with raised or captured errors
//! - **Uniform envelopes** – Every rejection renders as the same JSON error shape
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use multibody::prelude::*;
//!
//! # fn main() -> Result<(), multibody::MultibodyError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("multibody.toml")?
//!     .with_env_prefix("MULTIBODY")
//!     .load()?;
//!
//! let stack = MultibodyStack::from_config(config)?;
//! stack.init_logging()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → RequestId → ErrorNormalization → BodyBuffer → Handler
//!                                                            │
//!                              MultiBodyResolver::resolve ◄──┘ (per parameter)
//! ```

#![doc(html_root_url = "https://docs.rs/multibody/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod stack;

pub use error::MultibodyError;
pub use stack::MultibodyStack;

// Re-export extraction types
pub use multibody_extract as extract;

// Re-export middleware types
pub use multibody_middleware as middleware;

// Re-export telemetry types
pub use multibody_telemetry as telemetry;

// Re-export configuration types
pub use multibody_config as config;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use multibody::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{MultibodyError, MultibodyStack};

    pub use multibody_extract::{
        BodyTarget, DeriveValidator, ErrorClass, ExtractionContext, ExtractionError,
        ExtractionErrorKind, FieldErrors, HandlerBindings, MultiBodyResolver, ParamValidator,
        ParameterBinding, Validated, ValidationMarker,
    };

    pub use multibody_middleware::stages::{rejection, BodyBufferMiddleware};
    pub use multibody_middleware::{MiddlewareContext, Pipeline, Request, Response, ResponseExt};

    pub use multibody_config::{ConfigLoader, MultibodyConfig};
}
