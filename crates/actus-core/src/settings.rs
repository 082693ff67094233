//! Per-action runtime settings.

use serde::{Deserialize, Serialize};

/// Switches for the ambient behaviour of a produced action.
///
/// These never change what a handler receives; they only control logging
/// and metrics around it.
///
/// # Example
///
/// ```
/// use actus_core::ActionSettings;
///
/// let settings = ActionSettings::default();
/// assert!(settings.record_metrics);
/// assert!(!settings.log_validation_failures);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActionSettings {
    /// Log rejected input at `warn` instead of `debug`.
    pub log_validation_failures: bool,

    /// Emit invocation counters and duration histograms.
    pub record_metrics: bool,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            log_validation_failures: false,
            record_metrics: true,
        }
    }
}

impl ActionSettings {
    /// Settings for local development: rejected input is logged loudly.
    #[must_use]
    pub fn development() -> Self {
        Self {
            log_validation_failures: true,
            record_metrics: false,
        }
    }

    /// Settings for production.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}
