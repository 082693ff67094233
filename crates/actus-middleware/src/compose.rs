//! Composing several steps into one.
//!
//! [`chain_steps`] bundles an ordered list of steps into a single
//! [`ContextStep`]. The bundled steps run in order: each sees the outer
//! context merged with the patches of the bundled steps before it. The
//! composite contributes the union of those patches, so adding it to a
//! builder behaves exactly like adding its steps one by one.
//!
//! [`Chain::isolated`] switches to a self-contained composite: the first
//! bundled step sees an empty context instead of the outer one.

use crate::step::{BoxedStep, ContextStep};
use actus_core::{BoxFuture, Context, Patch};
use std::sync::Arc;

/// A group of steps that behaves as one step.
pub struct Chain<E> {
    name: &'static str,
    steps: Arc<[BoxedStep<E>]>,
    isolated: bool,
}

impl<E> Chain<E> {
    /// Sets the name used in logs.
    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Runs the bundled steps from an empty context.
    ///
    /// Their patches still land in the outer context afterwards.
    #[must_use]
    pub fn isolated(mut self) -> Self {
        self.isolated = true;
        self
    }

    /// Returns `true` if the bundled steps ignore the outer context.
    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    /// Number of bundled steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if no steps are bundled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<E> Clone for Chain<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            steps: Arc::clone(&self.steps),
            isolated: self.isolated,
        }
    }
}

/// Bundles `steps` into one step.
///
/// # Example
///
/// ```
/// use actus_core::{ActError, Context};
/// use actus_middleware::{chain_steps, BoxedStep, ContextStep, IntoContextStep};
/// use serde_json::json;
///
/// let auth: BoxedStep<ActError> = (|| async { Ok(json!({"user": "u-1"})) }).into_step();
/// let org: BoxedStep<ActError> = (|ctx: Context| async move {
///     Ok::<_, ActError>(json!({"org": format!("org-of-{}", ctx.get::<String>("user")?)}))
/// })
/// .into_step();
///
/// let both = chain_steps([auth, org]);
///
/// # tokio_test::block_on(async {
/// let patch = both.run(Context::new()).await.unwrap().unwrap();
/// assert_eq!(patch.get("org"), Some(&json!("org-of-u-1")));
/// # });
/// ```
pub fn chain_steps<E, I>(steps: I) -> Chain<E>
where
    I: IntoIterator<Item = BoxedStep<E>>,
{
    Chain {
        name: "chain",
        steps: steps.into_iter().collect(),
        isolated: false,
    }
}

impl<E: Send + 'static> ContextStep<E> for Chain<E> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&self, ctx: Context) -> BoxFuture<'static, Result<Option<Patch>, E>> {
        let steps = Arc::clone(&self.steps);
        let mut running = if self.isolated { Context::new() } else { ctx };
        Box::pin(async move {
            let mut union: Option<Patch> = None;
            for step in steps.iter() {
                if let Some(patch) = step.run(running.clone()).await? {
                    running.merge(patch.clone());
                    union.get_or_insert_with(Patch::new).extend(patch);
                }
            }
            Ok(union)
        })
    }
}

impl<E: Send + 'static> Chain<E> {
    /// Boxes the chain.
    #[must_use]
    pub fn boxed(self) -> BoxedStep<E> {
        Arc::new(self)
    }
}
