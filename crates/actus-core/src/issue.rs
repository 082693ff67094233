//! Validation issues and their normalized, per-field form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of the path to an offending field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object key.
    Key(String),
    /// Array index.
    Index(usize),
}

impl PathSegment {
    /// Creates a key segment.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// Creates an index segment.
    #[must_use]
    pub const fn index(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A single validation failure.
///
/// An issue without a path (or with an empty one) is a form-level error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Human-readable message.
    pub message: String,
    /// Path to the offending field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
}

impl Issue {
    /// Creates a form-level issue.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    /// Creates an issue attached to a field path.
    #[must_use]
    pub fn at<I, S>(message: impl Into<String>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        Self {
            message: message.into(),
            path: Some(path.into_iter().map(Into::into).collect()),
        }
    }

    /// Joins the path with dots, e.g. `list.0.foo`.
    ///
    /// Returns `None` for form-level issues.
    ///
    /// ```
    /// use actus_core::{Issue, PathSegment};
    ///
    /// let issue = Issue::at("Required", [PathSegment::key("list"), PathSegment::index(0)]);
    /// assert_eq!(issue.dot_path().as_deref(), Some("list.0"));
    /// assert_eq!(Issue::new("Required").dot_path(), None);
    /// ```
    #[must_use]
    pub fn dot_path(&self) -> Option<String> {
        let path = self.path.as_deref()?;
        if path.is_empty() {
            return None;
        }
        let mut joined = String::new();
        for (idx, segment) in path.iter().enumerate() {
            if idx > 0 {
                joined.push('.');
            }
            joined.push_str(&segment.to_string());
        }
        Some(joined)
    }
}

/// Issues grouped into form-level messages and per-field messages.
///
/// This is the error shape handed to state and form handlers.
///
/// Serializes as `{"messages": [...], "fieldErrors": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputErrors {
    /// Messages of issues without a path.
    pub messages: Vec<String>,
    /// Messages keyed by dotted field path, in encounter order.
    pub field_errors: IndexMap<String, Vec<String>>,
}

impl InputErrors {
    /// Groups issues by their dotted path.
    #[must_use]
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut errors = Self::default();
        for issue in issues {
            match issue.dot_path() {
                Some(path) => errors
                    .field_errors
                    .entry(path)
                    .or_default()
                    .push(issue.message.clone()),
                None => errors.messages.push(issue.message.clone()),
            }
        }
        errors
    }

    /// Messages recorded for a field.
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&[String]> {
        self.field_errors.get(path).map(Vec::as_slice)
    }

    /// Returns `true` if there are no messages at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.field_errors.is_empty()
    }

    /// Total number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len() + self.field_errors.values().map(Vec::len).sum::<usize>()
    }
}

/// Groups issues into [`InputErrors`].
pub fn get_input_errors(issues: &[Issue]) -> InputErrors {
    InputErrors::from_issues(issues)
}

/// Form-centric name for [`get_input_errors`].
pub fn get_form_errors(issues: &[Issue]) -> InputErrors {
    InputErrors::from_issues(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_single_field_issue() {
        let errors = get_form_errors(&[Issue::at("Required", ["foo"])]);
        assert!(errors.messages.is_empty());
        assert_eq!(errors.field("foo"), Some(&["Required".to_string()][..]));
    }

    #[test]
    fn test_nested_path_is_dotted() {
        let issue = Issue::at(
            "Required",
            [
                PathSegment::key("list"),
                PathSegment::index(0),
                PathSegment::key("foo"),
            ],
        );
        let errors = get_input_errors(&[issue]);
        assert_eq!(errors.field("list.0.foo"), Some(&["Required".to_string()][..]));
    }

    #[test]
    fn test_pathless_issues_go_to_messages() {
        let errors = get_input_errors(&[
            Issue::new("Passwords do not match"),
            Issue::at("Empty path", Vec::<PathSegment>::new()),
        ]);
        assert_eq!(errors.messages, vec!["Passwords do not match", "Empty path"]);
        assert!(errors.field_errors.is_empty());
    }

    #[test]
    fn test_same_path_appends_in_order() {
        let errors = get_input_errors(&[
            Issue::at("Too short", ["password"]),
            Issue::at("Required", ["email"]),
            Issue::at("Missing digit", ["password"]),
        ]);
        assert_eq!(
            errors.field("password"),
            Some(&["Too short".to_string(), "Missing digit".to_string()][..])
        );
        let keys: Vec<_> = errors.field_errors.keys().cloned().collect();
        assert_eq!(keys, vec!["password", "email"]);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_serialized_shape() {
        let errors = get_input_errors(&[Issue::at("Required", ["foo"]), Issue::new("Nope")]);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"messages": ["Nope"], "fieldErrors": {"foo": ["Required"]}})
        );
    }

    #[test]
    fn test_issue_serde_path_segments() {
        let issue: Issue =
            serde_json::from_value(json!({"message": "Required", "path": ["list", 0, "foo"]}))
                .unwrap();
        assert_eq!(issue.dot_path().as_deref(), Some("list.0.foo"));
    }

    proptest! {
        #[test]
        fn prop_every_message_is_kept(
            entries in proptest::collection::vec(
                (proptest::option::of("[a-c]"), "[a-z]{1,6}"),
                0..20,
            )
        ) {
            let issues: Vec<Issue> = entries
                .iter()
                .map(|(path, message)| match path {
                    Some(key) => Issue::at(message.clone(), [key.as_str()]),
                    None => Issue::new(message.clone()),
                })
                .collect();

            let errors = get_input_errors(&issues);
            prop_assert_eq!(errors.len(), issues.len());

            let pathless: Vec<String> = entries
                .iter()
                .filter(|(path, _)| path.is_none())
                .map(|(_, m)| m.clone())
                .collect();
            prop_assert_eq!(&errors.messages, &pathless);
        }
    }
}
