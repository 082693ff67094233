//! Calling shape of a produced action.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How many arguments a produced action expects.
///
/// Decided once, when the terminal call is made, from whether an input
/// resolver is configured and whether its schema accepts absent input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// No input resolver: the action takes no argument.
    None,
    /// The schema accepts absent input: the argument may be omitted.
    Optional,
    /// The argument is required.
    Required,
}

impl Arity {
    /// Arity for a schema with the given optionality.
    #[must_use]
    pub const fn for_schema(optional: bool) -> Self {
        if optional {
            Self::Optional
        } else {
            Self::Required
        }
    }

    /// Returns `true` if the action may be called without input.
    #[must_use]
    pub const fn accepts_no_input(self) -> bool {
        matches!(self, Self::None | Self::Optional)
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Optional => "optional",
            Self::Required => "required",
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_schema() {
        assert_eq!(Arity::for_schema(true), Arity::Optional);
        assert_eq!(Arity::for_schema(false), Arity::Required);
    }

    #[test]
    fn test_accepts_no_input() {
        assert!(Arity::None.accepts_no_input());
        assert!(Arity::Optional.accepts_no_input());
        assert!(!Arity::Required.accepts_no_input());
    }
}
