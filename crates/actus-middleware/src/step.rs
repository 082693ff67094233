//! Core context step trait and types.
//!
//! This module defines the [`ContextStep`] trait that every step added with
//! `use_step` / `middleware` ends up as. Steps receive an owned snapshot of
//! the context accumulated so far and return an optional [`Patch`].
//!
//! Closures are accepted in two shapes, both asynchronous:
//!
//! - `|| async { ... }` for steps that do not read the context
//! - `|ctx: Context| async move { ... }` for steps that do
//!
//! [`SyncStep`] wraps a synchronous closure that borrows the context.
//!
//! # Example
//!
//! ```ignore
//! use actus_middleware::{ContextStep, BoxedStep};
//! use actus_core::{ActError, BoxFuture, Context, Patch};
//!
//! struct Session;
//!
//! impl ContextStep<ActError> for Session {
//!     fn name(&self) -> &'static str {
//!         "session"
//!     }
//!
//!     fn run(&self, _ctx: Context) -> BoxFuture<'static, Result<Option<Patch>, ActError>> {
//!         Box::pin(async { Ok(Some(Patch::new().with("user_id", "u-1"))) })
//!     }
//! }
//! ```

use actus_core::{ActError, BoxFuture, Context, IntoPatch, Patch};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// A type-erased step that can be stored in a vector.
pub type BoxedStep<E> = Arc<dyn ContextStep<E>>;

/// A function of the accumulated context that produces a patch.
///
/// # Invariants
///
/// - A step sees exactly the merge of the steps before it, never later ones
/// - Errors are returned unchanged to the caller of the produced action
/// - `Ok(None)` contributes nothing to the context
pub trait ContextStep<E>: Send + Sync + 'static {
    /// Returns the name of this step.
    ///
    /// This name is used for logging and debugging.
    fn name(&self) -> &'static str {
        "step"
    }

    /// Runs the step against the context accumulated so far.
    fn run(&self, ctx: Context) -> BoxFuture<'static, Result<Option<Patch>, E>>;
}

impl<E: 'static> ContextStep<E> for Arc<dyn ContextStep<E>> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn run(&self, ctx: Context) -> BoxFuture<'static, Result<Option<Patch>, E>> {
        (**self).run(ctx)
    }
}

/// Marker for closures that take the accumulated context.
#[derive(Debug, Clone, Copy)]
pub struct WithContext;

/// Marker for closures that take no arguments.
#[derive(Debug, Clone, Copy)]
pub struct NoArgs;

/// Marker for values that already implement [`ContextStep`].
#[derive(Debug, Clone, Copy)]
pub struct Custom;

/// A step created from an async closure.
///
/// # Example
///
/// ```
/// use actus_core::{ActError, Context};
/// use actus_middleware::{ContextStep, FnStep};
/// use serde_json::json;
///
/// let step = FnStep::with_context(|ctx: Context| async move {
///     Ok::<_, ActError>(json!({"seen": ctx.len()}))
/// })
/// .named("count");
///
/// assert_eq!(ContextStep::<ActError>::name(&step), "count");
/// ```
pub struct FnStep<F, M> {
    name: &'static str,
    func: F,
    _marker: PhantomData<fn() -> M>,
}

impl<F> FnStep<F, WithContext> {
    /// Wraps a closure that receives the accumulated context.
    pub const fn with_context(func: F) -> Self {
        Self {
            name: "step",
            func,
            _marker: PhantomData,
        }
    }
}

impl<F> FnStep<F, NoArgs> {
    /// Wraps a closure that ignores the context.
    pub const fn no_args(func: F) -> Self {
        Self {
            name: "step",
            func,
            _marker: PhantomData,
        }
    }
}

impl<F, M> FnStep<F, M> {
    /// Sets the name used in logs.
    #[must_use]
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl<E, F, Fut, P> ContextStep<E> for FnStep<F, WithContext>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, E>> + Send + 'static,
    P: IntoPatch,
    E: From<ActError> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&self, ctx: Context) -> BoxFuture<'static, Result<Option<Patch>, E>> {
        let fut = (self.func)(ctx);
        Box::pin(async move { fut.await?.into_patch().map_err(E::from) })
    }
}

impl<E, F, Fut, P> ContextStep<E> for FnStep<F, NoArgs>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, E>> + Send + 'static,
    P: IntoPatch,
    E: From<ActError> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&self, _ctx: Context) -> BoxFuture<'static, Result<Option<Patch>, E>> {
        let fut = (self.func)();
        Box::pin(async move { fut.await?.into_patch().map_err(E::from) })
    }
}

/// A step created from a synchronous closure.
///
/// The closure borrows the accumulated context and runs before the
/// returned future is first polled.
pub struct SyncStep<F> {
    name: &'static str,
    func: F,
}

impl<F> SyncStep<F> {
    /// Wraps a synchronous closure.
    pub const fn new(func: F) -> Self {
        Self { name: "step", func }
    }

    /// Sets the name used in logs.
    #[must_use]
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl<E, F, P> ContextStep<E> for SyncStep<F>
where
    F: Fn(&Context) -> Result<P, E> + Send + Sync + 'static,
    P: IntoPatch,
    E: From<ActError> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&self, ctx: Context) -> BoxFuture<'static, Result<Option<Patch>, E>> {
        let result = (self.func)(&ctx).and_then(|patch| patch.into_patch().map_err(E::from));
        Box::pin(std::future::ready(result))
    }
}

/// Conversion into a boxed step.
///
/// Implemented for every [`ContextStep`], for zero-argument async closures
/// and for async closures taking a [`Context`]. The marker parameter `M`
/// only disambiguates the three shapes and is always inferred.
pub trait IntoContextStep<E, M> {
    /// Boxes `self` as a step.
    fn into_step(self) -> BoxedStep<E>;
}

impl<E, S> IntoContextStep<E, Custom> for S
where
    S: ContextStep<E>,
{
    fn into_step(self) -> BoxedStep<E> {
        Arc::new(self)
    }
}

impl<E, F, Fut, P> IntoContextStep<E, WithContext> for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, E>> + Send + 'static,
    P: IntoPatch + 'static,
    E: From<ActError> + Send + 'static,
{
    fn into_step(self) -> BoxedStep<E> {
        Arc::new(FnStep::with_context(self))
    }
}

impl<E, F, Fut, P> IntoContextStep<E, NoArgs> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, E>> + Send + 'static,
    P: IntoPatch + 'static,
    E: From<ActError> + Send + 'static,
{
    fn into_step(self) -> BoxedStep<E> {
        Arc::new(FnStep::no_args(self))
    }
}
