//! Produced actions and the parameters their handlers receive.
//!
//! | Terminal | Callable | Rejected input |
//! |----------|----------|----------------|
//! | `action` | [`Action::call`]`(raw)` | `Err(ActError::Validation)`, handler not called |
//! | `state_action` | [`StateAction::call`]`(prev_state, raw)` | handler gets `Err(InputErrors)` |
//! | `form_action` | [`FormAction::call`]`(prev_state, form_data)` | handler gets `Err(InputErrors)` |
//!
//! All three are cheap to clone and hold no state between calls.

use crate::builder::Definition;
use crate::executor::{self, ActionKind};
use crate::input::{InputResolver, NoInput};
use actus_core::{get_input_errors, ActError, Arity, BoxFuture, Context, InputErrors, ValidationOutcome};
use std::fmt;
use std::sync::Arc;

/// A type-erased handler.
pub(crate) type ErasedHandler<P, O, E> =
    Arc<dyn Fn(P) -> BoxFuture<'static, Result<O, E>> + Send + Sync>;

/// What an [`Action`] handler receives.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionParams<P> {
    /// The merged context.
    pub ctx: Context,
    /// The parsed input.
    pub input: P,
}

/// What a [`StateAction`] handler receives.
///
/// `input` holds the parsed input when validation passed and the grouped
/// messages when it did not.
#[derive(Debug, Clone, PartialEq)]
pub struct StateParams<Raw, P, S> {
    /// The merged context.
    pub ctx: Context,
    /// State returned by the previous call, as passed by the caller.
    pub prev_state: Option<S>,
    /// The input exactly as passed by the caller.
    pub raw_input: Raw,
    /// Parsed input or validation messages.
    pub input: Result<P, InputErrors>,
}

impl<Raw, P, S> StateParams<Raw, P, S> {
    /// The parsed input, if validation passed.
    pub fn input(&self) -> Option<&P> {
        self.input.as_ref().ok()
    }

    /// The validation messages, if validation failed.
    pub fn input_errors(&self) -> Option<&InputErrors> {
        self.input.as_ref().err()
    }
}

/// What a [`FormAction`] handler receives.
#[derive(Debug, Clone, PartialEq)]
pub struct FormParams<Raw, P, S> {
    /// The merged context.
    pub ctx: Context,
    /// State returned by the previous call, as passed by the caller.
    pub prev_state: Option<S>,
    /// The submitted form, as passed by the caller.
    pub form_data: Raw,
    /// Parsed input or validation messages.
    pub input: Result<P, InputErrors>,
}

impl<Raw, P, S> FormParams<Raw, P, S> {
    /// The parsed input, if validation passed.
    pub fn input(&self) -> Option<&P> {
        self.input.as_ref().ok()
    }

    /// The validation messages, if validation failed.
    pub fn form_errors(&self) -> Option<&InputErrors> {
        self.input.as_ref().err()
    }
}

impl<Raw, P, S> From<StateParams<Raw, P, S>> for FormParams<Raw, P, S> {
    fn from(params: StateParams<Raw, P, S>) -> Self {
        Self {
            ctx: params.ctx,
            prev_state: params.prev_state,
            form_data: params.raw_input,
            input: params.input,
        }
    }
}

/// An action that fails on rejected input.
///
/// Built with [`ActionBuilder::action`](crate::ActionBuilder::action).
pub struct Action<R, O, E = ActError>
where
    R: InputResolver<E>,
{
    def: Definition<R, E>,
    handler: ErasedHandler<ActionParams<R::Parsed>, O, E>,
}

impl<R, O, E> Action<R, O, E>
where
    R: InputResolver<E>,
    O: Send + 'static,
    E: From<ActError> + Send + 'static,
{
    pub(crate) fn new(
        def: Definition<R, E>,
        handler: ErasedHandler<ActionParams<R::Parsed>, O, E>,
    ) -> Self {
        Self { def, handler }
    }

    /// Calls the action.
    ///
    /// # Errors
    ///
    /// - `E::from(ActError::Validation(..))` if the input is rejected; the
    ///   handler does not run
    /// - any error of a step, the schema factory or the handler, unchanged
    pub async fn call(&self, raw: R::Raw) -> Result<O, E> {
        executor::execute(&self.def, ActionKind::Action, raw, |ctx, outcome| {
            let fut: BoxFuture<'static, Result<O, E>> = match outcome {
                ValidationOutcome::Valid(input) => (self.handler)(ActionParams { ctx, input }),
                ValidationOutcome::Invalid(issues) => {
                    let err = E::from(ActError::validation(issues));
                    Box::pin(std::future::ready(Err(err)))
                }
            };
            fut
        })
        .await
    }

    /// Calling shape of this action.
    pub fn arity(&self) -> Arity {
        self.def.arity()
    }

    /// The definition this action was built from.
    pub fn definition(&self) -> &Definition<R, E> {
        &self.def
    }
}

impl<O, E> Action<NoInput, O, E>
where
    O: Send + 'static,
    E: From<ActError> + Send + 'static,
{
    /// Calls an action that takes no input.
    ///
    /// # Errors
    ///
    /// Any error of a step or the handler, unchanged.
    pub async fn invoke(&self) -> Result<O, E> {
        self.call(()).await
    }
}

impl<R, O, E> Clone for Action<R, O, E>
where
    R: InputResolver<E>,
{
    fn clone(&self) -> Self {
        Self {
            def: self.def.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<R, O, E> fmt::Debug for Action<R, O, E>
where
    R: InputResolver<E>,
    E: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("def", &self.def)
            .finish_non_exhaustive()
    }
}

/// An action that hands rejected input to its handler.
///
/// Built with [`ActionBuilder::state_action`](crate::ActionBuilder::state_action).
/// `S` is the type of the previous state and defaults to the output type;
/// [`ActionBuilder::state_action_with_prev`](crate::ActionBuilder::state_action_with_prev)
/// picks a different one.
pub struct StateAction<R, O, E = ActError, S = O>
where
    R: InputResolver<E>,
{
    def: Definition<R, E>,
    handler: ErasedHandler<StateParams<R::Raw, R::Parsed, S>, O, E>,
    kind: ActionKind,
}

impl<R, O, E, S> StateAction<R, O, E, S>
where
    R: InputResolver<E>,
    R::Raw: Clone,
    O: Send + 'static,
    S: Send + 'static,
    E: From<ActError> + Send + 'static,
{
    pub(crate) fn new(
        def: Definition<R, E>,
        handler: ErasedHandler<StateParams<R::Raw, R::Parsed, S>, O, E>,
        kind: ActionKind,
    ) -> Self {
        Self { def, handler, kind }
    }

    /// Calls the action with the previous state and raw input.
    ///
    /// Rejected input never fails the call; the handler decides the result.
    ///
    /// # Errors
    ///
    /// Any error of a step, the schema factory or the handler, unchanged.
    pub async fn call(&self, prev_state: Option<S>, raw: R::Raw) -> Result<O, E> {
        let echoed = raw.clone();
        executor::execute(&self.def, self.kind, raw, move |ctx, outcome| {
            let input = outcome
                .into_result()
                .map_err(|issues| get_input_errors(&issues));
            (self.handler)(StateParams {
                ctx,
                prev_state,
                raw_input: echoed,
                input,
            })
        })
        .await
    }

    /// Calling shape of the input argument.
    pub fn arity(&self) -> Arity {
        self.def.arity()
    }

    /// The definition this action was built from.
    pub fn definition(&self) -> &Definition<R, E> {
        &self.def
    }
}

impl<R, O, E, S> Clone for StateAction<R, O, E, S>
where
    R: InputResolver<E>,
{
    fn clone(&self) -> Self {
        Self {
            def: self.def.clone(),
            handler: Arc::clone(&self.handler),
            kind: self.kind,
        }
    }
}

impl<R, O, E, S> fmt::Debug for StateAction<R, O, E, S>
where
    R: InputResolver<E>,
    E: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateAction")
            .field("def", &self.def)
            .field("kind", &self.kind.as_str())
            .finish_non_exhaustive()
    }
}

/// Form-centric [`StateAction`].
///
/// Built with the deprecated
/// [`ActionBuilder::form_action`](crate::ActionBuilder::form_action).
pub struct FormAction<R, O, E = ActError, S = O>
where
    R: InputResolver<E>,
{
    inner: StateAction<R, O, E, S>,
}

impl<R, O, E, S> FormAction<R, O, E, S>
where
    R: InputResolver<E>,
    R::Raw: Clone,
    O: Send + 'static,
    S: Send + 'static,
    E: From<ActError> + Send + 'static,
{
    pub(crate) fn new(inner: StateAction<R, O, E, S>) -> Self {
        Self { inner }
    }

    /// Calls the action with the previous state and submitted form.
    ///
    /// # Errors
    ///
    /// Any error of a step, the schema factory or the handler, unchanged.
    pub async fn call(&self, prev_state: Option<S>, form_data: R::Raw) -> Result<O, E> {
        self.inner.call(prev_state, form_data).await
    }

    /// Calling shape of the form argument.
    pub fn arity(&self) -> Arity {
        self.inner.arity()
    }

    /// The definition this action was built from.
    pub fn definition(&self) -> &Definition<R, E> {
        self.inner.definition()
    }
}

impl<R, O, E, S> Clone for FormAction<R, O, E, S>
where
    R: InputResolver<E>,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R, O, E, S> fmt::Debug for FormAction<R, O, E, S>
where
    R: InputResolver<E>,
    E: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormAction")
            .field("def", &self.inner.def)
            .finish_non_exhaustive()
    }
}
