//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};

/// Body buffering section.
///
/// Decides which requests get their body captured for replay, and how much
/// of it may be held in memory.
///
/// # Example
///
/// ```
/// use multibody_config::BufferConfig;
///
/// let config = BufferConfig {
///     methods: vec!["POST".to_string(), "PUT".to_string()],
///     ..Default::default()
/// };
/// assert_eq!(config.max_body_bytes, 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BufferConfig {
    /// HTTP methods whose bodies are buffered.
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,

    /// Fragment the content type must contain.
    #[serde(default = "default_content_type_fragment")]
    pub content_type_fragment: String,

    /// Buffer requests that send no content type at all.
    #[serde(default = "default_true")]
    pub buffer_missing_content_type: bool,

    /// Maximum captured body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            methods: default_methods(),
            content_type_fragment: default_content_type_fragment(),
            buffer_missing_content_type: true,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_methods() -> Vec<String> {
    vec!["POST".to_string()]
}

fn default_content_type_fragment() -> String {
    "json".to_string()
}

fn default_max_body_bytes() -> usize {
    multibody_extract::DEFAULT_MAX_BODY_SIZE
}

fn default_true() -> bool {
    true
}

/// Resolver section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Marker names that switch validation on.
    #[serde(default = "default_validation_markers")]
    pub validation_markers: Vec<String>,

    /// Accept numeric strings (`"42"`) for numeric parameters.
    #[serde(default)]
    pub coerce_numeric_strings: bool,

    /// Charset assumed when the request declares none.
    #[serde(default = "default_charset")]
    pub default_charset: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            validation_markers: default_validation_markers(),
            coerce_numeric_strings: false,
            default_charset: default_charset(),
        }
    }
}

fn default_validation_markers() -> Vec<String> {
    vec!["Valid".to_string(), "Validated".to_string()]
}

fn default_charset() -> String {
    "utf-8".to_string()
}

/// Request ID section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RequestIdConfig {
    /// Reuse a valid UUID sent in the `x-request-id` header instead of
    /// generating a new one.
    #[serde(default)]
    pub trust_incoming: bool,
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or env filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,

    /// Service name announced in logs.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
            service_name: default_service_name(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "multibody".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_config_defaults() {
        let config = BufferConfig::default();
        assert_eq!(config.methods, vec!["POST"]);
        assert_eq!(config.content_type_fragment, "json");
        assert!(config.buffer_missing_content_type);
        assert_eq!(config.max_body_bytes, 1_048_576);
    }

    #[test]
    fn test_resolver_config_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.validation_markers, vec!["Valid", "Validated"]);
        assert!(!config.coerce_numeric_strings);
        assert_eq!(config.default_charset, "utf-8");
    }

    #[test]
    fn test_request_id_config_defaults() {
        assert!(!RequestIdConfig::default().trust_incoming);

        let config: RequestIdConfig = serde_json::from_str(r#"{"trust_incoming": true}"#).unwrap();
        assert!(config.trust_incoming);
    }

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_log_format_serde() {
        let format: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, LogFormat::Json);

        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config: BufferConfig = serde_json::from_str(r#"{"max_body_bytes": 2048}"#).unwrap();
        assert_eq!(config.max_body_bytes, 2048);
        assert_eq!(config.methods, vec!["POST"]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ResolverConfig, _> = serde_json::from_str(r#"{"markers": ["Valid"]}"#);
        assert!(result.is_err());
    }
}
