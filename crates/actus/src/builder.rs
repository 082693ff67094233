//! The action builder.
//!
//! An [`ActionBuilder`] wraps a [`Definition`]: the ordered context steps,
//! the input resolver, and the name and settings used for logs and
//! metrics. Every chain call returns a new builder holding a new
//! definition; the receiver is borrowed, never changed, and stays usable.
//!
//! ```text
//! builder()
//!   .use_step(a)          Definition { steps: [a] }
//!   .use_step(b)          Definition { steps: [a, b] }
//!   .input(schema)        Definition { steps: [a, b], input: StaticInput }
//!   .action(handler)      Action
//! ```

use crate::action::{
    Action, ActionParams, FormAction, FormParams, StateAction, StateParams,
};
use crate::executor::ActionKind;
use crate::input::{ContextInput, InputResolver, NoInput, StaticInput};
use actus_core::{ActError, ActionSettings, Arity, BoxFuture, Context, Schema};
use actus_middleware::{IntoContextStep, StepChain};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Name used in logs and metrics for actions built without [`ActionBuilder::named`].
pub const DEFAULT_ACTION_NAME: &str = "anonymous";

/// Everything a builder has accumulated.
///
/// Definitions are immutable. Cloning one shares its steps and resolver.
pub struct Definition<R, E> {
    steps: StepChain<E>,
    input: Arc<R>,
    name: Option<Arc<str>>,
    settings: ActionSettings,
}

impl<R, E: 'static> Definition<R, E> {
    /// The context steps, in execution order.
    pub fn steps(&self) -> &StepChain<E> {
        &self.steps
    }

    /// The input resolver.
    pub fn input(&self) -> &R {
        &self.input
    }

    /// Name used in logs and metrics.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_ACTION_NAME)
    }

    /// Logging and metrics switches.
    pub fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    /// Number of context steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Calling shape of actions built from this definition.
    pub fn arity(&self) -> Arity
    where
        R: InputResolver<E>,
    {
        self.input.arity()
    }

    fn with_input<R2>(&self, input: R2) -> Definition<R2, E> {
        Definition {
            steps: self.steps.clone(),
            input: Arc::new(input),
            name: self.name.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<R, E> Clone for Definition<R, E> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
            input: Arc::clone(&self.input),
            name: self.name.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<R, E: 'static> fmt::Debug for Definition<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name())
            .field("steps", &self.steps.names())
            .field("input", &std::any::type_name::<R>())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Fluent, immutable builder for actions.
///
/// `R` is the input resolver and `E` the error type of produced actions.
/// `E` must accept framework errors through `From<ActError>`; every error
/// raised by steps, schema factories and handlers is returned unchanged.
///
/// # Example
///
/// ```
/// use actus::prelude::*;
/// use serde_json::{json, Value};
///
/// # tokio_test::block_on(async {
/// let greet = actus::builder()
///     .use_step(|| async { Ok(json!({"prefix": "best"})) })
///     .input(ValueSchema::string())
///     .action(|params: ActionParams<Value>| async move {
///         let prefix = params.ctx.str("prefix").unwrap_or_default().to_string();
///         Ok(format!("{prefix}-{}-bar", params.input.as_str().unwrap_or_default()))
///     });
///
/// assert_eq!(greet.call(json!("foo")).await.unwrap(), "best-foo-bar");
/// # });
/// ```
pub struct ActionBuilder<R = NoInput, E = ActError> {
    def: Definition<R, E>,
}

impl<E> ActionBuilder<NoInput, E>
where
    E: From<ActError> + Send + 'static,
{
    /// Creates a builder with no steps and no input.
    ///
    /// Use [`crate::builder`] for the default [`ActError`] error type.
    pub fn new() -> Self {
        Self {
            def: Definition {
                steps: StepChain::new(),
                input: Arc::new(NoInput),
                name: None,
                settings: ActionSettings::default(),
            },
        }
    }
}

impl<E> Default for ActionBuilder<NoInput, E>
where
    E: From<ActError> + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, E> Clone for ActionBuilder<R, E> {
    fn clone(&self) -> Self {
        Self {
            def: self.def.clone(),
        }
    }
}

impl<R, E: 'static> fmt::Debug for ActionBuilder<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionBuilder")
            .field("def", &self.def)
            .finish()
    }
}

impl<R, E> ActionBuilder<R, E>
where
    R: InputResolver<E>,
    E: From<ActError> + Send + 'static,
{
    /// Appends a context step.
    ///
    /// `step` is an async closure taking nothing or the [`Context`]
    /// accumulated so far, or any [`ContextStep`](actus_middleware::ContextStep).
    /// Its patch is shallow-merged over the context before the next step
    /// runs. Steps added after [`input_with`](Self::input_with) still run
    /// before the schema factory.
    pub fn use_step<M>(&self, step: impl IntoContextStep<E, M>) -> Self {
        Self {
            def: Definition {
                steps: self.def.steps.with_step(step),
                ..self.def.clone()
            },
        }
    }

    /// Alias of [`use_step`](Self::use_step).
    pub fn middleware<M>(&self, step: impl IntoContextStep<E, M>) -> Self {
        self.use_step(step)
    }

    /// Sets a static input schema, replacing any previous resolver.
    pub fn input<S: Schema>(&self, schema: S) -> ActionBuilder<StaticInput<S>, E> {
        ActionBuilder {
            def: self.def.with_input(StaticInput::new(schema)),
        }
    }

    /// Sets a schema factory, replacing any previous resolver.
    ///
    /// The factory receives the final context of each call, after every
    /// step has run. Its errors are returned to the caller unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use actus::prelude::*;
    /// use serde_json::json;
    ///
    /// let action = actus::builder()
    ///     .use_step(|| async { Ok(json!({"max": 3})) })
    ///     .input_with(|ctx: Context| async move {
    ///         Ok::<_, ActError>(ValueSchema::string().max_length(ctx.get("max")?))
    ///     })
    ///     .action(|params: ActionParams<serde_json::Value>| async move { Ok(params.input) });
    ///
    /// # tokio_test::block_on(async {
    /// assert!(action.call(json!("abcd")).await.unwrap_err().is_validation());
    /// # });
    /// ```
    pub fn input_with<F, Fut, S>(&self, factory: F) -> ActionBuilder<ContextInput<F, S>, E>
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S, E>> + Send + 'static,
        S: Schema,
    {
        ActionBuilder {
            def: self.def.with_input(ContextInput::new(factory)),
        }
    }

    /// Sets the name used in logs and metrics.
    pub fn named(&self, name: impl Into<Arc<str>>) -> Self {
        Self {
            def: Definition {
                name: Some(name.into()),
                ..self.def.clone()
            },
        }
    }

    /// Replaces the logging and metrics switches.
    pub fn settings(&self, settings: ActionSettings) -> Self {
        Self {
            def: Definition {
                settings,
                ..self.def.clone()
            },
        }
    }

    /// The accumulated definition.
    pub fn definition(&self) -> &Definition<R, E> {
        &self.def
    }

    /// Calling shape of actions built from this builder.
    pub fn arity(&self) -> Arity {
        self.def.arity()
    }

    /// Produces an action that fails when input is rejected.
    ///
    /// The handler runs only for valid input. Rejected input returns
    /// `Err(E::from(ActError::Validation(..)))`.
    pub fn action<F, Fut, O>(&self, handler: F) -> Action<R, O, E>
    where
        F: Fn(ActionParams<R::Parsed>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        O: Send + 'static,
    {
        let handler = Arc::new(
            move |params: ActionParams<R::Parsed>| -> BoxFuture<'static, Result<O, E>> {
                Box::pin(handler(params))
            },
        );
        Action::new(self.def.clone(), handler)
    }

    /// Produces an action that hands rejected input to the handler.
    ///
    /// The handler always runs; [`StateParams::input`] holds either the
    /// parsed input or the grouped validation messages. The previous state
    /// is passed through untouched.
    pub fn state_action<F, Fut, O>(&self, handler: F) -> StateAction<R, O, E>
    where
        R::Raw: Clone,
        F: Fn(StateParams<R::Raw, R::Parsed, O>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        O: Send + 'static,
    {
        self.state_action_with_prev(handler)
    }

    /// [`state_action`](Self::state_action) with a previous-state type `S`
    /// that differs from the output type.
    ///
    /// Useful when the first call is seeded with an initial state of another
    /// shape. Fix `S` by annotating the handler's parameter.
    ///
    /// ```rust
    /// use actus::prelude::*;
    ///
    /// # tokio_test::block_on(async {
    /// let action = actus::builder()
    ///     .state_action_with_prev(|params: StateParams<(), (), u32>| async move {
    ///         Ok(format!("seen {}", params.prev_state.unwrap_or_default()))
    ///     });
    /// assert_eq!(action.call(Some(3), ()).await.unwrap(), "seen 3");
    /// # });
    /// ```
    pub fn state_action_with_prev<F, Fut, S, O>(&self, handler: F) -> StateAction<R, O, E, S>
    where
        R::Raw: Clone,
        F: Fn(StateParams<R::Raw, R::Parsed, S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        S: Send + 'static,
        O: Send + 'static,
    {
        let handler = Arc::new(
            move |params: StateParams<R::Raw, R::Parsed, S>| -> BoxFuture<'static, Result<O, E>> {
                Box::pin(handler(params))
            },
        );
        StateAction::new(self.def.clone(), handler, ActionKind::StateAction)
    }

    /// Form-centric variant of [`state_action`](Self::state_action).
    ///
    /// Identical behaviour; the handler sees `form_data` and
    /// `form_errors()` instead of `raw_input` and `input_errors()`.
    #[deprecated(since = "0.1.0", note = "use `state_action` instead")]
    pub fn form_action<F, Fut, O>(&self, handler: F) -> FormAction<R, O, E>
    where
        R::Raw: Clone,
        F: Fn(FormParams<R::Raw, R::Parsed, O>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        O: Send + 'static,
    {
        let handler = Arc::new(
            move |params: StateParams<R::Raw, R::Parsed, O>| -> BoxFuture<'static, Result<O, E>> {
                Box::pin(handler(FormParams::from(params)))
            },
        );
        FormAction::new(StateAction::new(
            self.def.clone(),
            handler,
            ActionKind::FormAction,
        ))
    }
}
