//! Typed configuration for the multi-body resolver.
//!
//! This crate provides a strongly-typed configuration system with support for:
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! The configuration system is built around the [`MultibodyConfig`] struct:
//!
//! - [`BufferConfig`] - Which request bodies are captured, and the size cap
//! - [`ResolverConfig`] - Validation markers, coercion policy, default charset
//! - [`RequestIdConfig`] - Whether incoming request IDs are reused
//! - [`LoggingConfig`] - Structured logging settings
//!
//! # Example
//!
//! ```no_run
//! use multibody_config::ConfigLoader;
//!
//! # fn main() -> Result<(), multibody_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("multibody.toml")?
//!     .with_env_prefix("MULTIBODY")
//!     .load()?;
//!
//! let options = config.resolver_options()?;
//! println!("numeric strings accepted: {}", options.policy.accepts_numeric_strings());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [buffer]
//! methods = ["POST", "PUT"]
//! content_type_fragment = "json"
//! buffer_missing_content_type = true
//! max_body_bytes = 1048576
//!
//! [resolver]
//! validation_markers = ["Valid", "Validated"]
//! coerce_numeric_strings = false
//! default_charset = "utf-8"
//!
//! [request_id]
//! trust_incoming = false
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! All configuration values can be overridden via environment variables using
//! the format `PREFIX__SECTION__KEY`. For example:
//!
//! - `MULTIBODY__BUFFER__MAX_BODY_BYTES=65536`
//! - `MULTIBODY__BUFFER__METHODS=POST,PATCH`
//! - `MULTIBODY__RESOLVER__COERCE_NUMERIC_STRINGS=true`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MultibodyConfig::default();
        assert_eq!(config.buffer.max_body_bytes, 1024 * 1024);
        assert_eq!(config.resolver.default_charset, "utf-8");
    }

    #[test]
    fn test_config_builder() {
        let config = MultibodyConfig::builder()
            .buffer(BufferConfig {
                methods: vec!["PUT".to_string()],
                ..Default::default()
            })
            .build();

        assert_eq!(config.buffer.methods, vec!["PUT"]);
    }
}
