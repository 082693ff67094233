//! The pipeline shared by every produced action.
//!
//! 1. Run the context steps in order, merging each patch.
//! 2. Resolve the input against the final context and validate it.
//! 3. Hand context and outcome to the terminal-specific branch.
//!
//! Step and schema-factory errors end the call at once and reach the
//! caller unchanged. Only the branch decides what rejected input means.

use crate::builder::Definition;
use crate::input::InputResolver;
use actus_core::{ActError, ActionSettings, Context, Issue, ValidationOutcome};
use actus_telemetry::metrics::{record_invocation, record_validation_failure, Outcome};
use std::future::Future;
use std::time::Instant;
use tracing::{debug, debug_span, warn, Instrument};

/// Which terminal call produced an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActionKind {
    Action,
    StateAction,
    FormAction,
}

impl ActionKind {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::StateAction => "state_action",
            Self::FormAction => "form_action",
        }
    }
}

/// Timing and reporting for one call.
struct Invocation<'a> {
    action: &'a str,
    kind: ActionKind,
    settings: &'a ActionSettings,
    started: Instant,
}

impl<'a> Invocation<'a> {
    fn start(action: &'a str, kind: ActionKind, settings: &'a ActionSettings, steps: usize) -> Self {
        debug!(action, kind = kind.as_str(), steps, "running action");
        Self {
            action,
            kind,
            settings,
            started: Instant::now(),
        }
    }

    fn rejected(&self, issues: &[Issue]) {
        let kind = self.kind.as_str();
        if self.settings.log_validation_failures {
            warn!(action = self.action, kind, issues = issues.len(), "input rejected");
        } else {
            debug!(action = self.action, kind, issues = issues.len(), "input rejected");
        }
        if self.settings.record_metrics {
            record_validation_failure(self.action, kind);
        }
    }

    fn finish(self, outcome: Outcome) {
        let elapsed = self.started.elapsed();
        debug!(
            action = self.action,
            kind = self.kind.as_str(),
            outcome = outcome.as_str(),
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "action finished"
        );
        if self.settings.record_metrics {
            record_invocation(self.action, self.kind.as_str(), outcome, elapsed);
        }
    }
}

/// Outcome label for a finished call.
///
/// Rejected input counts as `InvalidInput` whether the action returned the
/// validation error or a state handler turned it into a value. Any other
/// error is `Error`.
fn classify(kind: ActionKind, rejected: bool, succeeded: bool) -> Outcome {
    match (rejected, succeeded) {
        (false, true) => Outcome::Success,
        (true, true) => Outcome::InvalidInput,
        (true, false) if kind == ActionKind::Action => Outcome::InvalidInput,
        (_, false) => Outcome::Error,
    }
}

/// Runs the steps and resolves input.
async fn prepare<R, E>(
    def: &Definition<R, E>,
    raw: R::Raw,
) -> Result<(Context, ValidationOutcome<R::Parsed>), E>
where
    R: InputResolver<E>,
    E: From<ActError> + Send + 'static,
{
    let ctx = def.steps().run(Context::new()).await?;
    let outcome = def.input().resolve(&ctx, raw).await?;
    Ok((ctx, outcome))
}

/// Runs one call of an action built from `def`.
///
/// `branch` receives the final context and the validation outcome and
/// produces the call's result.
pub(crate) async fn execute<R, E, O, B, Fut>(
    def: &Definition<R, E>,
    kind: ActionKind,
    raw: R::Raw,
    branch: B,
) -> Result<O, E>
where
    R: InputResolver<E>,
    E: From<ActError> + Send + 'static,
    B: FnOnce(Context, ValidationOutcome<R::Parsed>) -> Fut,
    Fut: Future<Output = Result<O, E>>,
{
    let span = debug_span!("action", action = def.name(), kind = kind.as_str());

    async move {
        let invocation = Invocation::start(def.name(), kind, def.settings(), def.step_count());

        let (ctx, outcome) = match prepare(def, raw).await {
            Ok(prepared) => prepared,
            Err(err) => {
                invocation.finish(Outcome::Error);
                return Err(err);
            }
        };

        let rejected = match outcome.issues() {
            Some(issues) => {
                invocation.rejected(issues);
                true
            }
            None => false,
        };

        let result = branch(ctx, outcome).await;
        invocation.finish(classify(kind, rejected, result.is_ok()));
        result
    }
    .instrument(span)
    .await
}
