//! The root configuration type.

use actus_core::ActionSettings;
use actus_extract::FormLimits;
use actus_telemetry::logging::create_env_filter;
use actus_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, MetricsSettings};

/// Complete Actus configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use actus_config::ActusConfig;
///
/// let config = ActusConfig::default();
/// assert_eq!(config.forms.max_depth, 32);
/// assert!(config.actions.record_metrics);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ActusConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsSettings,

    /// Defaults applied to every built action.
    #[serde(default)]
    pub actions: ActionSettings,

    /// Limits for form key decoding.
    #[serde(default)]
    pub forms: FormLimits,
}

impl ActusConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The log level is not a valid filter directive
    /// - A form limit is zero
    /// - Duration buckets are empty or not strictly increasing
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(err) = create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", err.to_string()));
        }

        if self.forms.max_depth == 0 {
            return Err(ConfigError::invalid_value(
                "forms.max_depth",
                "must be at least 1",
            ));
        }

        if self.forms.max_index == 0 {
            return Err(ConfigError::invalid_value(
                "forms.max_index",
                "must be at least 1",
            ));
        }

        if self.metrics.enabled {
            let buckets = &self.metrics.duration_buckets;
            if buckets.is_empty() {
                return Err(ConfigError::invalid_value(
                    "metrics.duration_buckets",
                    "must not be empty",
                ));
            }
            if buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(ConfigError::invalid_value(
                    "metrics.duration_buckets",
                    "must be strictly increasing",
                ));
            }
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logs with source locations, rejected input logged at
    /// `warn`, metrics off.
    ///
    /// # Example
    ///
    /// ```
    /// use actus_config::ActusConfig;
    ///
    /// let config = ActusConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert!(config.actions.log_validation_failures);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.span_events = true;
        config.logging.include_location = true;

        config.metrics.enabled = false;
        config.actions = ActionSettings::development();

        config
    }

    /// Create a production configuration preset.
    ///
    /// # Example
    ///
    /// ```
    /// use actus_config::{ActusConfig, LogFormat};
    ///
    /// let config = ActusConfig::production();
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.actions = ActionSettings::production();

        config
    }

    /// Telemetry settings derived from the logging and metrics sections.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            logging: self.logging.to_log_config(),
            metrics: self.metrics.to_metrics_config(),
        }
    }
}
