//! Configuration section types.
//!
//! The action and form sections reuse [`ActionSettings`](actus_core::ActionSettings)
//! and [`FormLimits`](actus_extract::FormLimits) directly; the types here
//! cover observability, which is described in configuration terms and
//! converted into [`actus_telemetry`] settings on demand.

use actus_telemetry::{LogConfig, MetricsConfig};
use serde::{Deserialize, Serialize};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line layout for terminals.
    Pretty,
}

impl LogFormat {
    /// Parses a format name, ignoring case.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// The `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Install a subscriber at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g. `info` or `actus=debug,warn`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` or `pretty`.
    #[serde(default)]
    pub format: LogFormat,

    /// Log when an action span opens and closes.
    #[serde(default)]
    pub span_events: bool,

    /// Attach source file and line to each event.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            span_events: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts into the settings consumed by
    /// [`init_logging`](actus_telemetry::init_logging).
    ///
    /// # Example
    ///
    /// ```
    /// use actus_config::{LogFormat, LoggingConfig};
    ///
    /// let logging = LoggingConfig {
    ///     format: LogFormat::Pretty,
    ///     ..LoggingConfig::default()
    /// };
    /// assert!(!logging.to_log_config().json);
    /// ```
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            filter: self.level.clone(),
            json: self.format == LogFormat::Json,
            span_events: self.span_events,
            include_location: self.include_location,
        }
    }
}

/// The `[metrics]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSettings {
    /// Install a Prometheus recorder.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Histogram buckets for invocation duration, in seconds.
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_buckets: default_duration_buckets(),
        }
    }
}

impl MetricsSettings {
    /// Converts into the settings consumed by
    /// [`init_metrics`](actus_telemetry::init_metrics).
    #[must_use]
    pub fn to_metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            enabled: self.enabled,
            duration_buckets: self.duration_buckets.clone(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_duration_buckets() -> Vec<f64> {
    MetricsConfig::default().duration_buckets
}
