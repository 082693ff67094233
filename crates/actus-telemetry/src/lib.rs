//! Observability for Actus actions.
//!
//! This crate provides the logging and metrics setup for services built
//! with Actus:
//!
//! - **Logging**: `tracing-subscriber` fmt layer, JSON or pretty
//! - **Metrics**: Prometheus-format metrics via the `metrics` crate
//!
//! The action executor only talks to the `tracing` and `metrics` facades;
//! nothing is emitted until the application installs a subscriber and a
//! recorder, for example with [`init_telemetry`].
//!
//! # Example
//!
//! ```rust,ignore
//! use actus_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::development()).expect("telemetry");
//!
//!     // Actions now log and record metrics...
//!     println!("{}", actus_telemetry::metrics::render_metrics().unwrap_or_default());
//! }
//! ```
//!
//! # Metrics Output
//!
//! ```text
//! # HELP actus_action_invocations_total Total number of completed action invocations
//! # TYPE actus_action_invocations_total counter
//! actus_action_invocations_total{action="createPost",kind="action",outcome="success"} 12
//! actus_action_invocations_total{action="createPost",kind="action",outcome="invalid_input"} 3
//! ```

#![doc(html_root_url = "https://docs.rs/actus-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, MetricsConfig, Outcome};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryConfig {
    /// Logging configuration.
    pub logging: LogConfig,

    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

impl TelemetryConfig {
    /// Pretty debug logs, metrics enabled.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            metrics: MetricsConfig::default(),
        }
    }

    /// JSON info logs, metrics enabled.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}
