//! Facade error type.

use multibody_config::ConfigError;
use multibody_telemetry::TelemetryError;
use thiserror::Error;

/// Errors raised while assembling a [`MultibodyStack`](crate::MultibodyStack).
#[derive(Error, Debug)]
pub enum MultibodyError {
    /// Configuration could not be loaded or converted.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_transparent() {
        let err: MultibodyError = ConfigError::validation_error("bad").into();
        assert_eq!(err.to_string(), "configuration validation failed: bad");
    }

    #[test]
    fn test_telemetry_error_converts() {
        let err: MultibodyError = TelemetryError::InvalidConfig("empty".to_string()).into();
        assert!(matches!(err, MultibodyError::Telemetry(_)));
    }
}
