//! Input resolvers.
//!
//! A resolver turns the raw argument of a produced action into the parsed
//! input its handler receives. There are three:
//!
//! - [`NoInput`] - no schema configured; the action takes `()`
//! - [`StaticInput`] - a schema fixed when the builder was made
//! - [`ContextInput`] - a schema built per call from the final context
//!
//! Resolvers are part of the builder's type, so the raw and parsed input
//! types of a produced action are known statically.

use actus_core::{Arity, BoxFuture, Context, Schema, ValidationOutcome};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

/// Resolves and validates raw input against the context of one call.
pub trait InputResolver<E>: Send + Sync + 'static {
    /// What callers pass to the produced action.
    type Raw: Send + 'static;
    /// What the handler receives.
    type Parsed: Send + 'static;

    /// Calling shape of actions using this resolver.
    fn arity(&self) -> Arity;

    /// Validates `raw`.
    ///
    /// `ctx` is the fully merged context; every step has already run.
    /// An `Err` is an upstream failure and is returned to the caller
    /// unchanged. Rejected input is `Ok(ValidationOutcome::Invalid(..))`.
    fn resolve<'a>(
        &'a self,
        ctx: &Context,
        raw: Self::Raw,
    ) -> BoxFuture<'a, Result<ValidationOutcome<Self::Parsed>, E>>;
}

/// No input schema: the action takes no argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoInput;

impl<E: Send + 'static> InputResolver<E> for NoInput {
    type Raw = ();
    type Parsed = ();

    fn arity(&self) -> Arity {
        Arity::None
    }

    fn resolve<'a>(
        &'a self,
        _ctx: &Context,
        _raw: (),
    ) -> BoxFuture<'a, Result<ValidationOutcome<()>, E>> {
        Box::pin(std::future::ready(Ok(ValidationOutcome::Valid(()))))
    }
}

/// A schema configured with [`ActionBuilder::input`](crate::ActionBuilder::input).
#[derive(Debug, Clone)]
pub struct StaticInput<S> {
    schema: S,
}

impl<S> StaticInput<S> {
    pub(crate) const fn new(schema: S) -> Self {
        Self { schema }
    }

    /// The configured schema.
    pub fn schema(&self) -> &S {
        &self.schema
    }
}

impl<E, S> InputResolver<E> for StaticInput<S>
where
    E: Send + 'static,
    S: Schema,
{
    type Raw = S::Input;
    type Parsed = S::Output;

    fn arity(&self) -> Arity {
        Arity::for_schema(self.schema.accepts_absent())
    }

    fn resolve<'a>(
        &'a self,
        _ctx: &Context,
        raw: S::Input,
    ) -> BoxFuture<'a, Result<ValidationOutcome<S::Output>, E>> {
        Box::pin(async move { Ok::<_, E>(self.schema.validate(raw).await) })
    }
}

/// A schema factory configured with
/// [`ActionBuilder::input_with`](crate::ActionBuilder::input_with).
///
/// The factory runs once per call, after all context steps.
pub struct ContextInput<F, S> {
    factory: F,
    _schema: PhantomData<fn() -> S>,
}

impl<F, S> ContextInput<F, S> {
    pub(crate) const fn new(factory: F) -> Self {
        Self {
            factory,
            _schema: PhantomData,
        }
    }
}

impl<F, S> fmt::Debug for ContextInput<F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextInput")
            .field("schema", &std::any::type_name::<S>())
            .finish_non_exhaustive()
    }
}

impl<E, F, Fut, S> InputResolver<E> for ContextInput<F, S>
where
    E: Send + 'static,
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<S, E>> + Send + 'static,
    S: Schema,
{
    type Raw = S::Input;
    type Parsed = S::Output;

    fn arity(&self) -> Arity {
        Arity::for_schema(S::OPTIONAL)
    }

    fn resolve<'a>(
        &'a self,
        ctx: &Context,
        raw: S::Input,
    ) -> BoxFuture<'a, Result<ValidationOutcome<S::Output>, E>> {
        let pending = (self.factory)(ctx.clone());
        Box::pin(async move {
            let schema = pending.await?;
            let outcome = schema.validate(raw).await;
            Ok::<_, E>(outcome)
        })
    }
}
