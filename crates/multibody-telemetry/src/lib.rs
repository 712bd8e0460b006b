//! Structured logging for multi-body request resolution.
//!
//! The resolver and the middleware stages emit `tracing` events:
//!
//! | Level | Source | Event |
//! |-------|--------|-------|
//! | `trace` | body buffer | body captured, buffering skipped |
//! | `debug` | resolver | parameter resolved or rejected |
//! | `warn` | resolver, middleware | structural failure, body capture failure |
//!
//! This crate installs a `tracing-subscriber` that writes them as JSON
//! (production) or pretty text (development).
//!
//! # Example
//!
//! ```rust,no_run
//! use multibody_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production().service_name("orders"))?;
//!
//! tracing::info!(request_id = "0192...", "Processing request");
//! # Ok::<(), multibody_telemetry::TelemetryError>(())
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
