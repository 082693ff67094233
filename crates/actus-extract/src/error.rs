//! Form extraction error types.

use std::fmt;

/// Error that occurs while reading or decoding form data.
///
/// # Example
///
/// ```rust
/// use actus_extract::ExtractionError;
///
/// let err = ExtractionError::depth_exceeded("a.b.c", 2);
/// assert_eq!(err.error_code(), "FORM_DEPTH_EXCEEDED");
/// assert_eq!(err.field(), Some("a.b.c"));
/// assert!(err.to_string().contains("a.b.c"));
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    kind: ExtractionErrorKind,
    field: Option<String>,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Body could not be parsed
    DeserializationFailed,
    /// Key nests deeper than allowed
    DepthExceeded,
    /// Array index above the configured maximum
    IndexTooLarge,
    /// Key addresses a value as both a leaf and a container
    Conflict,
}

impl ExtractionError {
    /// Creates an error for a body that could not be parsed.
    #[must_use]
    pub fn deserialization_failed(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            kind: ExtractionErrorKind::DeserializationFailed,
            message: format!("failed to deserialize form body: {error}"),
            field: None,
        }
    }

    /// Creates an error for a key with too many segments.
    #[must_use]
    pub fn depth_exceeded(field: impl Into<String>, max_depth: usize) -> Self {
        let field = field.into();
        Self {
            kind: ExtractionErrorKind::DepthExceeded,
            message: format!("form key '{field}' nests deeper than {max_depth} levels"),
            field: Some(field),
        }
    }

    /// Creates an error for an array index above the limit.
    #[must_use]
    pub fn index_too_large(field: impl Into<String>, index: usize, max_index: usize) -> Self {
        let field = field.into();
        Self {
            kind: ExtractionErrorKind::IndexTooLarge,
            message: format!("form key '{field}' uses index {index}, maximum is {max_index}"),
            field: Some(field),
        }
    }

    /// Creates an error for a key that conflicts with an earlier entry.
    #[must_use]
    pub fn conflict(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            kind: ExtractionErrorKind::Conflict,
            message: format!("form key '{field}' conflicts with an earlier entry"),
            field: Some(field),
        }
    }

    /// Returns the offending form key, if applicable.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns a stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::DeserializationFailed => "DESERIALIZATION_FAILED",
            ExtractionErrorKind::DepthExceeded => "FORM_DEPTH_EXCEEDED",
            ExtractionErrorKind::IndexTooLarge => "FORM_INDEX_TOO_LARGE",
            ExtractionErrorKind::Conflict => "FORM_KEY_CONFLICT",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}
