//! Typed configuration for Actus.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are errors)
//! - Layered configuration (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use actus_config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("actus.toml")?
//!     .with_env_prefix("ACTUS")
//!     .load()?;
//!
//! actus_telemetry::init_telemetry(&config.telemetry())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! duration_buckets = [0.005, 0.05, 0.5, 5.0]
//!
//! [actions]
//! log_validation_failures = false
//! record_metrics = true
//!
//! [forms]
//! max_depth = 32
//! max_index = 10000
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY`:
//!
//! - `ACTUS__LOGGING__LEVEL=debug`
//! - `ACTUS__METRICS__DURATION_BUCKETS=0.01,0.1,1`
//! - `ACTUS__ACTIONS__LOG_VALIDATION_FAILURES=true`
//! - `ACTUS__FORMS__MAX_INDEX=500`

#![doc(html_root_url = "https://docs.rs/actus-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::ActusConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig, MetricsSettings};

pub use actus_core::ActionSettings;
pub use actus_extract::FormLimits;
