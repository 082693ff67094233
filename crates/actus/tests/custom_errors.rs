//! Actions whose steps and handlers fail with an application error type.

use actus::prelude::*;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Action(#[from] ActError),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn app_builder() -> ActionBuilder<NoInput, AppError> {
    ActionBuilder::new()
}

#[tokio::test]
async fn test_step_error_reaches_caller_unchanged() {
    let action = app_builder()
        .use_step(|ctx: Context| async move {
            match ctx.str("role") {
                Some("admin") => Ok(json!({"allowed": true})),
                _ => Err(AppError::Forbidden("admin only".to_string())),
            }
        })
        .action(|_params: ActionParams<()>| async { Ok::<_, AppError>("deleted") });

    let err = action.invoke().await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(ref reason) if reason == "admin only"));
    assert_eq!(err.to_string(), "forbidden: admin only");
}

#[tokio::test]
async fn test_rejected_input_converts_into_app_error() {
    let action = app_builder()
        .input(ValueSchema::object([("id", ValueSchema::integer())]))
        .action(|params: ActionParams<Value>| async move { Ok(params.input["id"].clone()) });

    assert_eq!(action.call(json!({"id": 4})).await.unwrap(), json!(4));

    let err = action.call(json!({"id": "x"})).await.unwrap_err();
    let AppError::Action(inner) = err else {
        panic!("expected a converted validation error");
    };
    assert!(inner.is_validation());
}

#[tokio::test]
async fn test_context_lookup_errors_convert() {
    let action = app_builder()
        .use_step(|| async { Ok::<_, AppError>(json!({"count": "three"})) })
        .action(|params: ActionParams<()>| async move {
            let count: i64 = params.ctx.get("count")?;
            Ok(count)
        });

    let err = action.invoke().await.unwrap_err();
    assert!(matches!(err, AppError::Action(ActError::ContextType { .. })));
}

#[tokio::test]
async fn test_handler_can_fail_with_anyhow() {
    let action = app_builder()
        .input(ValueSchema::string())
        .action(|params: ActionParams<Value>| async move {
            let raw = params.input.as_str().unwrap_or_default();
            let parsed: u16 = raw
                .parse()
                .map_err(|e| anyhow::anyhow!("bad port {raw}: {e}"))?;
            Ok(parsed)
        });

    assert_eq!(action.call(json!("8080")).await.unwrap(), 8080);

    let err = action.call(json!("http")).await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
    assert!(err.to_string().starts_with("bad port http"));
}

#[tokio::test]
async fn test_schema_factory_error_propagates() {
    let action = app_builder()
        .input_with(|ctx: Context| async move {
            if ctx.is_empty() {
                return Err(AppError::Forbidden("no session".to_string()));
            }
            Ok(ValueSchema::any())
        })
        .action(|params: ActionParams<Value>| async move { Ok(params.input) });

    let err = action.call(json!(1)).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}
