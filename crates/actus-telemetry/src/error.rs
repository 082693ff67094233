//! Telemetry error types.

use thiserror::Error;

/// Failure to set up logging or metrics.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The Prometheus recorder could not be installed.
    #[error("metrics recorder not installed: {0}")]
    MetricsInit(String),

    /// The log subscriber could not be installed.
    #[error("log subscriber not installed: {0}")]
    LoggingInit(String),

    /// A telemetry setting is unusable.
    #[error("invalid telemetry setting: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::MetricsInit("already installed".to_string());
        assert_eq!(err.to_string(), "metrics recorder not installed: already installed");
    }

    #[test]
    fn test_invalid_config_display() {
        let err = TelemetryError::InvalidConfig("empty bucket list".to_string());
        assert_eq!(err.to_string(), "invalid telemetry setting: empty bucket list");
    }
}
