//! Deserializing validated values into Rust types.

use crate::value::ValueSchema;
use actus_core::{BoxFuture, Issue, Schema, ValidationOutcome};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A [`ValueSchema`] whose output is deserialized into `T`.
///
/// Validation runs first and reports every issue with its path. Only a
/// valid value is deserialized; a deserialization failure becomes a single
/// form-level issue.
///
/// # Example
///
/// ```
/// use actus_schema::ValueSchema;
/// use actus_core::Schema;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Login {
///     email: String,
///     remember: Option<bool>,
/// }
///
/// let schema = ValueSchema::object([
///     ("email", ValueSchema::string().min_length(3)),
///     ("remember", ValueSchema::boolean().optional()),
/// ])
/// .typed::<Login>();
///
/// # tokio_test::block_on(async {
/// let login = schema.validate(json!({"email": "a@b.c"})).await.value().unwrap();
/// assert_eq!(login, Login { email: "a@b.c".into(), remember: None });
/// # });
/// ```
pub struct Typed<T> {
    schema: ValueSchema,
    _output: PhantomData<fn() -> T>,
}

impl<T> Typed<T> {
    /// The underlying value schema.
    #[must_use]
    pub fn schema(&self) -> &ValueSchema {
        &self.schema
    }
}

impl<T> Clone for Typed<T> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            _output: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typed")
            .field("schema", &self.schema)
            .field("output", &std::any::type_name::<T>())
            .finish()
    }
}

impl ValueSchema {
    /// Deserializes the validated value into `T`.
    #[must_use]
    pub fn typed<T: DeserializeOwned>(self) -> Typed<T> {
        Typed {
            schema: self,
            _output: PhantomData,
        }
    }
}

impl<T> Schema for Typed<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Input = Value;
    type Output = T;

    fn validate(&self, input: Value) -> BoxFuture<'_, ValidationOutcome<T>> {
        let outcome = match self.schema.parse(&input) {
            ValidationOutcome::Valid(value) => match serde_json::from_value(value) {
                Ok(parsed) => ValidationOutcome::Valid(parsed),
                Err(err) => ValidationOutcome::Invalid(vec![Issue::new(err.to_string())]),
            },
            ValidationOutcome::Invalid(issues) => ValidationOutcome::Invalid(issues),
        };
        Box::pin(std::future::ready(outcome))
    }

    fn accepts_absent(&self) -> bool {
        self.schema.is_optional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Foo {
        foo: String,
    }

    #[tokio::test]
    async fn test_typed_valid() {
        let schema = ValueSchema::object([("foo", ValueSchema::string())]).typed::<Foo>();
        let outcome = schema.validate(json!({"foo": "bar", "ignored": 1})).await;
        assert_eq!(outcome.value(), Some(Foo { foo: "bar".into() }));
    }

    #[tokio::test]
    async fn test_typed_keeps_paths() {
        let schema = ValueSchema::object([("foo", ValueSchema::string())]).typed::<Foo>();
        let outcome = schema.validate(json!({})).await;
        let issues = outcome.issues().unwrap();
        assert_eq!(issues[0].dot_path().as_deref(), Some("foo"));
        assert_eq!(issues[0].message, "Required");
    }

    #[tokio::test]
    async fn test_deserialize_failure_is_form_level() {
        let schema = ValueSchema::any().typed::<Foo>();
        let outcome = schema.validate(json!({"foo": 1})).await;
        let issues = outcome.issues().unwrap();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].path.is_none());
    }
}
