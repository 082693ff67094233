//! The validation seam.
//!
//! Actus makes exactly one assumption about a validation library: it can
//! turn a raw value into either a parsed value or an ordered list of
//! [`Issue`]s. That operation is the [`Schema`] trait. Validation may be
//! synchronous or asynchronous; both are expressed as a boxed future.
//!
//! # Example
//!
//! ```
//! use actus_core::{schema_fn, Issue, Schema, ValidationOutcome};
//!
//! let non_empty = schema_fn(|raw: String| {
//!     if raw.is_empty() {
//!         ValidationOutcome::Invalid(vec![Issue::new("Required")])
//!     } else {
//!         ValidationOutcome::Valid(raw)
//!     }
//! });
//!
//! # tokio_test::block_on(async {
//! assert!(non_empty.validate("foo".to_string()).await.is_valid());
//! assert!(!non_empty.validate(String::new()).await.is_valid());
//! # });
//! ```

use crate::issue::Issue;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of validating raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome<T> {
    /// The parsed (possibly transformed) value.
    Valid(T),
    /// Issues in the order the schema found them.
    Invalid(Vec<Issue>),
}

impl<T> ValidationOutcome<T> {
    /// Returns `true` for [`ValidationOutcome::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns the parsed value, if any.
    #[must_use]
    pub fn value(self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }

    /// Returns the issues, if any.
    #[must_use]
    pub fn issues(&self) -> Option<&[Issue]> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(issues) => Some(issues),
        }
    }

    /// Maps the parsed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationOutcome<U> {
        match self {
            Self::Valid(value) => ValidationOutcome::Valid(f(value)),
            Self::Invalid(issues) => ValidationOutcome::Invalid(issues),
        }
    }

    /// Converts into a `Result`, issues on the error side.
    pub fn into_result(self) -> Result<T, Vec<Issue>> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(issues) => Err(issues),
        }
    }
}

impl<T> From<Result<T, Vec<Issue>>> for ValidationOutcome<T> {
    fn from(result: Result<T, Vec<Issue>>) -> Self {
        match result {
            Ok(value) => Self::Valid(value),
            Err(issues) => Self::Invalid(issues),
        }
    }
}

/// A value that can validate raw input.
///
/// `Input` is what callers pass to the produced callable; `Output` is what
/// the handler receives. `OPTIONAL` tells the builder whether the callable
/// may be invoked without input.
pub trait Schema: Send + Sync + 'static {
    /// Raw input type.
    type Input: Send + 'static;
    /// Parsed output type.
    type Output: Send + 'static;
    /// Whether the input itself may be absent, for every value of this type.
    const OPTIONAL: bool = false;

    /// Validates `input`.
    fn validate(&self, input: Self::Input) -> BoxFuture<'_, ValidationOutcome<Self::Output>>;

    /// Whether this particular schema accepts absent input.
    ///
    /// Defaults to [`OPTIONAL`](Self::OPTIONAL). Schemas whose optionality is
    /// configured at runtime override it.
    fn accepts_absent(&self) -> bool {
        Self::OPTIONAL
    }
}

impl<S: Schema> Schema for Arc<S> {
    type Input = S::Input;
    type Output = S::Output;
    const OPTIONAL: bool = S::OPTIONAL;

    fn validate(&self, input: Self::Input) -> BoxFuture<'_, ValidationOutcome<Self::Output>> {
        (**self).validate(input)
    }

    fn accepts_absent(&self) -> bool {
        (**self).accepts_absent()
    }
}

/// Makes a schema's input optional at the call site.
///
/// `None` is accepted as-is; `Some` is validated by the inner schema.
///
/// ```
/// use actus_core::{schema_fn, Optional, Schema, ValidationOutcome};
///
/// fn accepts_absent<S: Schema>(_: &S) -> bool {
///     S::OPTIONAL
/// }
///
/// let schema = Optional(schema_fn(|raw: String| -> ValidationOutcome<String> {
///     ValidationOutcome::Valid(raw)
/// }));
/// assert!(accepts_absent(&schema));
///
/// # tokio_test::block_on(async {
/// assert_eq!(schema.validate(None).await, ValidationOutcome::Valid(None));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Optional<S>(pub S);

impl<S: Schema> Schema for Optional<S> {
    type Input = Option<S::Input>;
    type Output = Option<S::Output>;
    const OPTIONAL: bool = true;

    fn validate(&self, input: Self::Input) -> BoxFuture<'_, ValidationOutcome<Self::Output>> {
        Box::pin(async move {
            match input {
                Some(raw) => self.0.validate(raw).await.map(Some),
                None => ValidationOutcome::Valid(None),
            }
        })
    }
}

/// A schema backed by a synchronous closure.
pub struct FnSchema<F, I, O> {
    func: F,
    _phantom: PhantomData<fn(I) -> O>,
}

/// Wraps a synchronous closure as a [`Schema`].
pub fn schema_fn<F, I, O>(func: F) -> FnSchema<F, I, O>
where
    F: Fn(I) -> ValidationOutcome<O> + Send + Sync + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    FnSchema {
        func,
        _phantom: PhantomData,
    }
}

impl<F, I, O> Schema for FnSchema<F, I, O>
where
    F: Fn(I) -> ValidationOutcome<O> + Send + Sync + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = O;

    fn validate(&self, input: I) -> BoxFuture<'_, ValidationOutcome<O>> {
        let outcome = (self.func)(input);
        Box::pin(std::future::ready(outcome))
    }
}

/// A schema backed by an asynchronous closure.
pub struct AsyncFnSchema<F, I, O> {
    func: F,
    _phantom: PhantomData<fn(I) -> O>,
}

/// Wraps an asynchronous closure as a [`Schema`].
pub fn async_schema_fn<F, Fut, I, O>(func: F) -> AsyncFnSchema<F, I, O>
where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ValidationOutcome<O>> + Send + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    AsyncFnSchema {
        func,
        _phantom: PhantomData,
    }
}

impl<F, Fut, I, O> Schema for AsyncFnSchema<F, I, O>
where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ValidationOutcome<O>> + Send + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = O;

    fn validate(&self, input: I) -> BoxFuture<'_, ValidationOutcome<O>> {
        Box::pin((self.func)(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn even() -> impl Schema<Input = i64, Output = i64> {
        schema_fn(|n: i64| {
            if n % 2 == 0 {
                ValidationOutcome::Valid(n)
            } else {
                ValidationOutcome::Invalid(vec![Issue::new("Expected an even number")])
            }
        })
    }

    #[tokio::test]
    async fn test_fn_schema() {
        let schema = even();
        assert_eq!(schema.validate(4).await, ValidationOutcome::Valid(4));
        assert_eq!(
            schema.validate(3).await.issues().map(<[Issue]>::len),
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_async_fn_schema() {
        let schema = async_schema_fn(|raw: String| async move {
            tokio::task::yield_now().await;
            ValidationOutcome::Valid(raw.len())
        });
        assert_eq!(schema.validate("four".to_string()).await, ValidationOutcome::Valid(4));
    }

    #[tokio::test]
    async fn test_optional_delegates_when_present() {
        let schema = Optional(even());
        assert_eq!(schema.validate(Some(2)).await, ValidationOutcome::Valid(Some(2)));
        assert!(!schema.validate(Some(1)).await.is_valid());
        assert_eq!(schema.validate(None).await, ValidationOutcome::Valid(None));
    }

    #[test]
    fn test_optional_flag() {
        assert!(!<FnSchema<fn(i64) -> ValidationOutcome<i64>, i64, i64> as Schema>::OPTIONAL);
        assert!(<Optional<Arc<FnSchema<fn(i64) -> ValidationOutcome<i64>, i64, i64>>> as Schema>::OPTIONAL);
    }

    #[test]
    fn test_outcome_conversions() {
        let ok: ValidationOutcome<u8> = Ok(1).into();
        assert_eq!(ok.clone().into_result(), Ok(1));
        assert_eq!(ok.map(|n| n + 1).value(), Some(2));

        let err: ValidationOutcome<u8> = Err(vec![Issue::new("bad")]).into();
        assert!(err.clone().value().is_none());
        assert_eq!(err.into_result(), Err(vec![Issue::new("bad")]));
    }
}
