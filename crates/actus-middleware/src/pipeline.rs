//! Sequential step pipeline.
//!
//! [`StepChain`] holds the ordered steps of one action definition. It is
//! immutable in practice: [`StepChain::with_step`] returns a new chain and
//! leaves the original untouched, so definitions derived from a shared
//! parent never see each other's steps.
//!
//! ## Execution
//!
//! Steps run strictly in insertion order. Step `i` receives the merge of
//! the patches of steps `0..i`; step `i + 1` does not start until step
//! `i`'s patch has been merged. The first error stops the chain and is
//! returned unchanged.

use crate::step::{BoxedStep, IntoContextStep};
use actus_core::Context;
use std::fmt;

/// Ordered, copy-on-write list of context steps.
///
/// # Example
///
/// ```
/// use actus_core::{ActError, Context};
/// use actus_middleware::StepChain;
/// use serde_json::json;
///
/// let base: StepChain<ActError> = StepChain::new()
///     .with_step(|| async { Ok(json!({"a": 1})) });
/// let extended = base.with_step(|| async { Ok(json!({"b": 2})) });
///
/// assert_eq!(base.len(), 1);
/// assert_eq!(extended.len(), 2);
/// ```
pub struct StepChain<E> {
    steps: Vec<BoxedStep<E>>,
}

impl<E: 'static> StepChain<E> {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Returns a new chain with `step` appended.
    ///
    /// The steps already in `self` are shared, not re-created.
    #[must_use]
    pub fn with_step<M>(&self, step: impl IntoContextStep<E, M>) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(step.into_step());
        Self { steps }
    }

    /// Appends a step in place.
    pub fn push<M>(&mut self, step: impl IntoContextStep<E, M>) {
        self.steps.push(step.into_step());
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if there are no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Names of the steps in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Iterates over the steps in order.
    pub fn iter(&self) -> impl Iterator<Item = &BoxedStep<E>> {
        self.steps.iter()
    }

    /// Runs every step in order, merging each patch into `ctx`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a step, unchanged.
    pub async fn run(&self, mut ctx: Context) -> Result<Context, E> {
        for (index, step) in self.steps.iter().enumerate() {
            let patch = step.run(ctx.clone()).await?;
            match patch {
                Some(patch) => {
                    tracing::trace!(
                        step = step.name(),
                        index,
                        keys = patch.len(),
                        "context step produced patch"
                    );
                    ctx.merge(patch);
                }
                None => {
                    tracing::trace!(step = step.name(), index, "context step produced nothing");
                }
            }
        }
        Ok(ctx)
    }
}

impl<E: 'static> Default for StepChain<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for StepChain<E> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
        }
    }
}

impl<E: 'static> fmt::Debug for StepChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepChain")
            .field("steps", &self.names())
            .finish()
    }
}
