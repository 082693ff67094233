//! Error types for Actus.
//!
//! [`ActError`] covers the failures the library itself can produce. Caller
//! code chooses its own error type `E: From<ActError>`; errors raised by
//! steps, schema factories and handlers are returned to the caller as-is.

use crate::issue::{get_input_errors, InputErrors, Issue};
use std::fmt;
use thiserror::Error;

/// Result type alias using [`ActError`].
pub type ActResult<T> = Result<T, ActError>;

/// Standard error type for Actus.
///
/// # Example
///
/// ```
/// use actus_core::{ActError, Issue};
///
/// let err = ActError::validation(vec![Issue::new("Expected string, received number")]);
/// assert!(err.is_validation());
/// assert_eq!(
///     err.to_string(),
///     "Validation error: Expected string, received number"
/// );
/// ```
#[derive(Error, Debug)]
pub enum ActError {
    /// Raw input was rejected by the schema.
    #[error(transparent)]
    Validation(#[from] InputValidationError),

    /// A context step returned something other than an object or nothing.
    #[error("context step must return an object or nothing, got {found}")]
    InvalidPatch {
        /// JSON type name of the rejected value.
        found: &'static str,
    },

    /// A typed context read found no value under the key.
    #[error("context key `{key}` is not set")]
    MissingContext {
        /// The requested key.
        key: String,
    },

    /// A typed context read found a value of the wrong shape.
    #[error("context key `{key}` has an unexpected shape: {source}")]
    ContextType {
        /// The requested key.
        key: String,
        /// Deserialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// Any other error, typically raised by caller code using `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ActError {
    /// Creates a validation error from schema issues.
    #[must_use]
    pub fn validation(issues: Vec<Issue>) -> Self {
        Self::Validation(InputValidationError::new(issues))
    }

    /// Creates a missing-context error.
    #[must_use]
    pub fn missing_context(key: impl Into<String>) -> Self {
        Self::MissingContext { key: key.into() }
    }

    /// Returns `true` if this is an input validation failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the validation failure, if this is one.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&InputValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Input rejected by a schema.
///
/// Carries the issues in the order the schema reported them. The display
/// form lists every message with its dotted path, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValidationError {
    issues: Vec<Issue>,
}

impl InputValidationError {
    /// Wraps a list of issues.
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// The issues reported by the schema.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Issues grouped by field.
    #[must_use]
    pub fn errors(&self) -> InputErrors {
        get_input_errors(&self.issues)
    }

    /// Consumes the error, returning its issues.
    #[must_use]
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

impl fmt::Display for InputValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validation error")?;
        for (idx, issue) in self.issues.iter().enumerate() {
            f.write_str(if idx == 0 { ": " } else { "; " })?;
            match issue.dot_path() {
                Some(path) => write!(f, "{} at \"{}\"", issue.message, path)?,
                None => f.write_str(&issue.message)?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for InputValidationError {}
