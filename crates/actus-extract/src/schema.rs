//! Validating form submissions with JSON schemas.

use crate::decode::{FormDecoder, FormLimits};
use crate::form_data::FormData;
use actus_core::{BoxFuture, Issue, Schema, ValidationOutcome};
use serde_json::Value;

/// A schema over [`FormData`] that decodes nested keys, then delegates to
/// a schema over JSON values.
///
/// A key that cannot be decoded becomes one form-level issue.
///
/// # Example
///
/// ```
/// use actus_core::Schema;
/// use actus_extract::{FormData, FormSchema};
/// use actus_schema::ValueSchema;
/// use serde_json::json;
///
/// let schema = FormSchema::new(ValueSchema::object([
///     ("user", ValueSchema::object([("name", ValueSchema::string())])),
/// ]));
///
/// # tokio_test::block_on(async {
/// let form = FormData::new().with("user.name", "Ada");
/// let parsed = schema.validate(form).await.value().unwrap();
/// assert_eq!(parsed, json!({"user": {"name": "Ada"}}));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct FormSchema<S> {
    inner: S,
    decoder: FormDecoder,
}

impl<S> FormSchema<S> {
    /// Wraps a JSON schema with default decoding limits.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: FormDecoder::new(),
        }
    }

    /// Replaces the decoding limits.
    #[must_use]
    pub fn with_limits(mut self, limits: FormLimits) -> Self {
        self.decoder = FormDecoder::with_limits(limits);
        self
    }

    /// The wrapped schema.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S> Schema for FormSchema<S>
where
    S: Schema<Input = Value>,
{
    type Input = FormData;
    type Output = S::Output;

    fn validate(&self, input: FormData) -> BoxFuture<'_, ValidationOutcome<S::Output>> {
        match self.decoder.decode_json(&input) {
            Ok(value) => self.inner.validate(value),
            Err(err) => Box::pin(std::future::ready(ValidationOutcome::Invalid(vec![
                Issue::new(err.to_string()),
            ]))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actus_core::get_form_errors;
    use actus_schema::ValueSchema;

    fn contact() -> FormSchema<ValueSchema> {
        FormSchema::new(ValueSchema::object([
            ("email", ValueSchema::string().min_length(3)),
            ("tags", ValueSchema::array(ValueSchema::string()).optional()),
        ]))
    }

    #[tokio::test]
    async fn test_missing_field_is_reported_at_path() {
        let outcome = contact().validate(FormData::new()).await;
        let errors = get_form_errors(outcome.issues().unwrap());
        assert_eq!(errors.field("email"), Some(&["Required".to_string()][..]));
    }

    #[tokio::test]
    async fn test_repeated_keys_validate_as_array() {
        let form = FormData::new()
            .with("email", "a@b.c")
            .with("tags[]", "x")
            .with("tags[]", "y");
        assert!(contact().validate(form).await.is_valid());
    }

    #[tokio::test]
    async fn test_decode_error_is_form_level() {
        let schema = contact().with_limits(FormLimits {
            max_depth: 1,
            ..FormLimits::default()
        });
        let form = FormData::new().with("a.b", "x");
        let outcome = schema.validate(form).await;
        let errors = get_form_errors(outcome.issues().unwrap());
        assert_eq!(errors.messages.len(), 1);
        assert!(errors.field_errors.is_empty());
    }
}
