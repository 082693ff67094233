//! Prometheus metrics for Actus actions.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `actus_action_invocations_total` | Counter | `action`, `kind`, `outcome` | Completed invocations |
//! | `actus_action_duration_seconds` | Histogram | `action`, `kind` | Invocation latency |
//! | `actus_validation_failures_total` | Counter | `action`, `kind` | Inputs rejected by the schema |
//!
//! Recording goes through the `metrics` facade, so nothing is exported
//! until a recorder is installed (for example with [`init_metrics`]).
//!
//! # Example
//!
//! ```rust
//! use actus_telemetry::metrics::{record_invocation, Outcome};
//! use std::time::Duration;
//!
//! record_invocation("createPost", "action", Outcome::Success, Duration::from_millis(4));
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// Counter of completed invocations.
pub const ACTION_INVOCATIONS_TOTAL: &str = "actus_action_invocations_total";

/// Histogram of invocation durations in seconds.
pub const ACTION_DURATION_SECONDS: &str = "actus_action_duration_seconds";

/// Counter of inputs rejected by validation.
pub const VALIDATION_FAILURES_TOTAL: &str = "actus_validation_failures_total";

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for invocation duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 1ms .. 10s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The handler ran and returned `Ok`.
    Success,
    /// The input was rejected before the handler ran.
    InvalidInput,
    /// A step, schema factory or handler returned an error.
    Error,
}

impl Outcome {
    /// Label value for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::InvalidInput => "invalid_input",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a Prometheus builder with the configured duration buckets.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` if the bucket list is empty.
pub fn prometheus_builder(config: &MetricsConfig) -> TelemetryResult<PrometheusBuilder> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(ACTION_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::InvalidConfig(e.to_string()))
}

/// Installs the global Prometheus recorder.
///
/// No HTTP listener is started; scrape output is available through
/// [`render_metrics`].
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let handle = prometheus_builder(config)?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);
    describe_metrics();

    Ok(())
}

/// Returns the global metrics handle if initialized.
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers descriptions for all standard metrics.
pub fn describe_metrics() {
    describe_counter!(
        ACTION_INVOCATIONS_TOTAL,
        "Total number of completed action invocations"
    );
    describe_histogram!(
        ACTION_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Action invocation duration in seconds"
    );
    describe_counter!(
        VALIDATION_FAILURES_TOTAL,
        "Total number of action inputs rejected by validation"
    );
}

/// Records a completed invocation.
///
/// Updates the following metrics:
/// - `actus_action_invocations_total` (incremented)
/// - `actus_action_duration_seconds` (histogram observation)
pub fn record_invocation(action: &str, kind: &'static str, outcome: Outcome, duration: Duration) {
    counter!(
        ACTION_INVOCATIONS_TOTAL,
        "action" => action.to_string(),
        "kind" => kind,
        "outcome" => outcome.as_str()
    )
    .increment(1);

    histogram!(
        ACTION_DURATION_SECONDS,
        "action" => action.to_string(),
        "kind" => kind
    )
    .record(duration.as_secs_f64());
}

/// Records an input rejected by validation.
pub fn record_validation_failure(action: &str, kind: &'static str) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "action" => action.to_string(),
        "kind" => kind
    )
    .increment(1);
}
