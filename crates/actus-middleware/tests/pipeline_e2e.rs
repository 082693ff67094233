//! End-to-end step pipeline integration tests.
//!
//! These tests verify that steps built from every supported shape work
//! together in one chain:
//!
//! 1. Zero-argument async closures
//! 2. Context-reading async closures
//! 3. Synchronous steps
//! 4. Hand-written [`ContextStep`] implementations
//! 5. Composite steps from [`chain_steps`]

use actus_core::fixtures::{CallCounter, OrderLog};
use actus_core::{ActError, BoxFuture, Context, Patch};
use actus_middleware::{chain_steps, BoxedStep, ContextStep, IntoContextStep, StepChain, SyncStep};
use serde_json::json;

/// Application error that is not [`ActError`].
#[derive(Debug, PartialEq)]
enum AppError {
    Unauthorized(String),
    Framework(String),
}

impl From<ActError> for AppError {
    fn from(err: ActError) -> Self {
        Self::Framework(err.to_string())
    }
}

/// Looks up a tenant for the user already in context.
struct TenantLookup;

impl ContextStep<AppError> for TenantLookup {
    fn name(&self) -> &'static str {
        "tenant"
    }

    fn run(&self, ctx: Context) -> BoxFuture<'static, Result<Option<Patch>, AppError>> {
        Box::pin(async move {
            let user = ctx
                .str("user")
                .ok_or_else(|| AppError::Unauthorized("no user".into()))?
                .to_string();
            Ok(Some(Patch::new().with("tenant", format!("tenant-of-{user}"))))
        })
    }
}

#[tokio::test]
async fn test_mixed_step_shapes_in_order() {
    let log = OrderLog::new();
    let (a, b, c) = (log.clone(), log.clone(), log.clone());

    let chain: StepChain<AppError> = StepChain::new()
        .with_step(move || {
            a.push("auth");
            async { Ok(json!({"user": "ada"})) }
        })
        .with_step(TenantLookup)
        .with_step(SyncStep::new(move |ctx: &Context| {
            b.push("audit");
            Ok::<_, AppError>(json!({"audited": ctx.contains("tenant")}))
        }))
        .with_step(move |ctx: Context| {
            let log = c.clone();
            async move {
                log.push("final");
                Ok::<_, AppError>(json!({"keys": ctx.len()}))
            }
        });

    let ctx = chain.run(Context::new()).await.unwrap();

    assert_eq!(log.entries(), vec!["auth", "audit", "final"]);
    assert_eq!(ctx.str("tenant"), Some("tenant-of-ada"));
    assert_eq!(ctx.value("audited"), Some(&json!(true)));
    assert_eq!(ctx.get::<usize>("keys").unwrap(), 3);
}

#[tokio::test]
async fn test_custom_error_passes_through_unchanged() {
    let chain: StepChain<AppError> = StepChain::new().with_step(TenantLookup);
    let err = chain.run(Context::new()).await.unwrap_err();
    assert_eq!(err, AppError::Unauthorized("no user".into()));
}

#[tokio::test]
async fn test_framework_errors_convert_into_custom_error() {
    let chain: StepChain<AppError> =
        StepChain::new().with_step(|| async { Ok::<_, AppError>(json!([1, 2, 3])) });
    let err = chain.run(Context::new()).await.unwrap_err();
    assert!(matches!(err, AppError::Framework(msg) if msg.contains("array")));
}

#[tokio::test]
async fn test_later_patch_overwrites_earlier_key() {
    let chain: StepChain<ActError> = StepChain::new()
        .with_step(|| async { Ok(json!({"role": "guest", "first": true})) })
        .with_step(|| async { Ok(json!({"role": "admin"})) });

    let ctx = chain.run(Context::new()).await.unwrap();
    assert_eq!(ctx.str("role"), Some("admin"));
    assert_eq!(ctx.keys().collect::<Vec<_>>(), vec!["role", "first"]);
}

#[tokio::test]
async fn test_composite_step_runs_each_inner_step_once() {
    let counter = CallCounter::new();
    let hits = counter.clone();

    let inner: BoxedStep<ActError> = (move || {
        hits.hit();
        async { Ok(json!({"a": 1})) }
    })
    .into_step();
    let next: BoxedStep<ActError> = (|ctx: Context| async move {
        Ok::<_, ActError>(json!({"b": ctx.get::<i64>("a")? + 1}))
    })
    .into_step();

    let chain: StepChain<ActError> = StepChain::new()
        .with_step(chain_steps([inner, next]))
        .with_step(|ctx: Context| async move {
            Ok::<_, ActError>(json!({"c": ctx.get::<i64>("a")? + ctx.get::<i64>("b")?}))
        });

    let ctx = chain.run(Context::new()).await.unwrap();
    assert_eq!(ctx.get::<i64>("c").unwrap(), 3);
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_shared_parent_chains_are_independent() {
    let parent: StepChain<ActError> =
        StepChain::new().with_step(|| async { Ok(json!({"shared": true})) });
    let left = parent.with_step(|| async { Ok(json!({"side": "left"})) });
    let right = parent.with_step(|| async { Ok(json!({"side": "right"})) });

    assert_eq!(
        left.run(Context::new()).await.unwrap().str("side"),
        Some("left")
    );
    assert_eq!(
        right.run(Context::new()).await.unwrap().str("side"),
        Some("right")
    );
    assert!(!parent.run(Context::new()).await.unwrap().contains("side"));
}
