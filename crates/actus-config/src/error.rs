//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded or was rejected.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required config file does not exist.
    #[error("config file {path} does not exist")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A config file exists but could not be read.
    #[error("could not read config file {path}")]
    Read {
        /// The unreadable path.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// TOML content did not match [`ActusConfig`](crate::ActusConfig).
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON content did not match [`ActusConfig`](crate::ActusConfig).
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// A file extension or format name other than `toml` or `json`.
    #[error("unsupported config format `{0}`")]
    UnsupportedFormat(String),

    /// A field parsed but holds an unusable value.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field, e.g. `forms.max_depth`.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A prefixed environment variable could not be applied.
    #[error("environment variable {var}: {reason}")]
    EnvVar {
        /// Full variable name.
        var: String,
        /// What was expected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Rejects the value at `field`.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env_var(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvVar {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// The offending field, for value errors.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }
}
