//! Main configuration types.
//!
//! This module provides the top-level [`MultibodyConfig`] struct, its
//! builder, and the conversions into the runtime types it configures.

use http::Method;
use multibody_extract::{Charset, CoercionPolicy, ResolverOptions, ValidationMarkers};
use multibody_middleware::stages::{BodyBufferMiddleware, RequestIdMiddleware};
use multibody_middleware::Pipeline;
use multibody_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::{
    BufferConfig, ConfigError, LogFormat, LoggingConfig, RequestIdConfig, ResolverConfig,
};

/// Complete multi-body configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use multibody_config::MultibodyConfig;
///
/// let config = MultibodyConfig::default();
/// assert_eq!(config.buffer.methods, vec!["POST"]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MultibodyConfig {
    /// Body buffering configuration.
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Resolver configuration.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Request ID configuration.
    #[serde(default)]
    pub request_id: RequestIdConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MultibodyConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> MultibodyConfigBuilder {
        MultibodyConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.buffer_methods()?;

        if self.buffer.content_type_fragment.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "buffer.content_type_fragment",
                "must not be empty",
            ));
        }

        if self.buffer.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "buffer.max_body_bytes",
                "must be greater than 0",
            ));
        }

        if self
            .resolver
            .validation_markers
            .iter()
            .any(|m| m.trim().is_empty())
        {
            return Err(ConfigError::invalid_value(
                "resolver.validation_markers",
                "marker names must not be empty",
            ));
        }

        self.charset()?;

        if self.logging.enabled {
            self.log_config()
                .validate()
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logging with source locations; numeric strings are
    /// accepted for numeric parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use multibody_config::{LogFormat, MultibodyConfig};
    ///
    /// let config = MultibodyConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config.resolver.coerce_numeric_strings = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON info logging with the strict legacy coercion rules.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.include_location = false;

        config.resolver.coerce_numeric_strings = false;

        config
    }

    /// Builds the resolver options.
    ///
    /// # Errors
    ///
    /// `InvalidValue` for an unsupported default charset.
    pub fn resolver_options(&self) -> Result<ResolverOptions, ConfigError> {
        Ok(ResolverOptions {
            policy: CoercionPolicy::default().numeric_strings(self.resolver.coerce_numeric_strings),
            markers: ValidationMarkers::new(self.resolver.validation_markers.iter().cloned()),
            default_charset: self.charset()?,
        })
    }

    /// Builds the body buffering middleware.
    ///
    /// # Errors
    ///
    /// `InvalidValue` for a method that is not a valid HTTP token.
    pub fn body_buffer(&self) -> Result<BodyBufferMiddleware, ConfigError> {
        Ok(BodyBufferMiddleware::new()
            .methods(self.buffer_methods()?)
            .content_type_fragment(self.buffer.content_type_fragment.clone())
            .buffer_missing_content_type(self.buffer.buffer_missing_content_type)
            .max_body_bytes(self.buffer.max_body_bytes))
    }

    /// Builds the request ID stage.
    #[must_use]
    pub fn request_id_stage(&self) -> RequestIdMiddleware {
        if self.request_id.trust_incoming {
            RequestIdMiddleware::trust_incoming()
        } else {
            RequestIdMiddleware::new()
        }
    }

    /// Builds the standard pipeline from the request ID and buffer sections.
    ///
    /// # Errors
    ///
    /// Same as [`MultibodyConfig::body_buffer`].
    pub fn pipeline(&self) -> Result<Pipeline, ConfigError> {
        Ok(Pipeline::standard_with(self.request_id_stage(), self.body_buffer()?))
    }

    /// Builds the logging configuration.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let base = match self.logging.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.logging.enabled,
            file_line_info: self.logging.include_location,
            ..base
        }
        .level(self.logging.level.clone())
        .service_name(self.logging.service_name.clone())
    }

    fn buffer_methods(&self) -> Result<Vec<Method>, ConfigError> {
        if self.buffer.methods.is_empty() {
            return Err(ConfigError::invalid_value("buffer.methods", "must not be empty"));
        }
        self.buffer
            .methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.trim().to_ascii_uppercase().as_bytes()).map_err(|_| {
                    ConfigError::invalid_value("buffer.methods", format!("invalid HTTP method: {m}"))
                })
            })
            .collect()
    }

    fn charset(&self) -> Result<Charset, ConfigError> {
        Charset::from_label(&self.resolver.default_charset).ok_or_else(|| {
            ConfigError::invalid_value(
                "resolver.default_charset",
                format!("unsupported charset: {}", self.resolver.default_charset),
            )
        })
    }
}

/// Builder for [`MultibodyConfig`].
#[derive(Debug, Default)]
pub struct MultibodyConfigBuilder {
    buffer: Option<BufferConfig>,
    resolver: Option<ResolverConfig>,
    request_id: Option<RequestIdConfig>,
    logging: Option<LoggingConfig>,
}

impl MultibodyConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the buffer configuration.
    #[must_use]
    pub fn buffer(mut self, buffer: BufferConfig) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Set the resolver configuration.
    #[must_use]
    pub fn resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Set the request ID configuration.
    #[must_use]
    pub fn request_id(mut self, request_id: RequestIdConfig) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> MultibodyConfig {
        MultibodyConfig {
            buffer: self.buffer.unwrap_or_default(),
            resolver: self.resolver.unwrap_or_default(),
            request_id: self.request_id.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<MultibodyConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
