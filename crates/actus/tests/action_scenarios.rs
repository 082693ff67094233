//! End-to-end behaviour of actions built with the fluent builder.

use actus::prelude::*;
use actus_core::fixtures::{accept_all, reject_all, required_at, CallCounter, OrderLog};
use serde_json::{json, Value};
use std::sync::Arc;

#[tokio::test]
async fn test_action_without_input() {
    let action = actus::builder().action(|_params: ActionParams<()>| async { Ok("bar") });

    assert_eq!(action.arity(), Arity::None);
    assert_eq!(action.invoke().await.unwrap(), "bar");
}

#[tokio::test]
async fn test_step_input_and_handler() {
    let action = actus::builder()
        .use_step(|| async { Ok(json!({"prefix": "best"})) })
        .input(accept_all::<String>())
        .action(|params: ActionParams<String>| async move {
            let prefix: String = params.ctx.get("prefix")?;
            Ok(format!("{prefix}-{}-bar", params.input))
        });

    assert_eq!(action.arity(), Arity::Required);
    assert_eq!(action.call("foo".to_string()).await.unwrap(), "best-foo-bar");
}

#[tokio::test]
async fn test_chained_steps_see_earlier_patches() {
    let action = actus::builder()
        .use_step(|| async { Ok(json!({"a": 1})) })
        .use_step(|ctx: Context| async move {
            Ok::<_, ActError>(json!({"b": ctx.get::<i64>("a")? + 1}))
        })
        .action(|params: ActionParams<()>| async move {
            Ok(params.ctx.get::<i64>("a")? + params.ctx.get::<i64>("b")?)
        });

    assert_eq!(action.invoke().await.unwrap(), 3);

    let longer = actus::builder()
        .use_step(|| async { Ok(json!({"a": 1})) })
        .use_step(|ctx: Context| async move {
            Ok::<_, ActError>(json!({"b": ctx.get::<i64>("a")? + 1}))
        })
        .use_step(|ctx: Context| async move {
            let a: i64 = ctx.get("a")?;
            let b: i64 = ctx.get("b")?;
            Ok::<_, ActError>(json!({"c": a + b}))
        })
        .action(|params: ActionParams<()>| async move {
            let ctx = &params.ctx;
            Ok(ctx.get::<i64>("a")? + ctx.get::<i64>("b")? + ctx.get::<i64>("c")?)
        });

    assert_eq!(longer.invoke().await.unwrap(), 6);
}

#[tokio::test]
async fn test_step_sees_only_earlier_steps() {
    let action = actus::builder()
        .use_step(|ctx: Context| async move {
            Ok::<_, ActError>(json!({"first_saw": ctx.keys().collect::<Vec<_>>()}))
        })
        .use_step(|| async { Ok(json!({"late": true})) })
        .action(|params: ActionParams<()>| async move { Ok(params.ctx.into_value()) });

    let ctx = action.invoke().await.unwrap();
    assert_eq!(ctx, json!({"first_saw": [], "late": true}));
}

#[tokio::test]
async fn test_later_step_overrides_key() {
    let action = actus::builder()
        .use_step(|| async { Ok(json!({"role": "guest", "id": 1})) })
        .use_step(|| async { Ok(json!({"role": "admin"})) })
        .action(|params: ActionParams<()>| async move { Ok(params.ctx.into_value()) });

    let ctx = action.invoke().await.unwrap();
    assert_eq!(ctx, json!({"role": "admin", "id": 1}));
    let keys: Vec<String> = ctx.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["role", "id"]);
}

struct Db {
    rows: Vec<&'static str>,
}

impl Db {
    fn query(&self, prefix: &str) -> Vec<&'static str> {
        self.rows.iter().copied().filter(|r| r.starts_with(prefix)).collect()
    }
}

#[tokio::test]
async fn test_step_hands_typed_value_to_handler() {
    let db = Arc::new(Db {
        rows: vec!["foo-1", "bar-1", "foo-2"],
    });
    let action = actus::builder()
        .use_step(move || {
            let db = Arc::clone(&db);
            async move { Ok(Patch::new().with("table", "posts").with_shared(db)) }
        })
        .use_step(|| async { Ok(json!({"table": "drafts"})) })
        .input(accept_all::<String>())
        .action(|params: ActionParams<String>| async move {
            let db = params.ctx.require::<Db>()?;
            Ok((params.ctx.str("table").unwrap_or_default().to_string(), db.query(&params.input)))
        });

    let (table, rows) = action.call("foo".to_string()).await.unwrap();
    assert_eq!(table, "drafts");
    assert_eq!(rows, vec!["foo-1", "foo-2"]);
}

#[tokio::test]
async fn test_missing_typed_value_is_reported() {
    let action = actus::builder()
        .action(|params: ActionParams<()>| async move { Ok(params.ctx.require::<Db>()?.rows.len()) });

    let err = action.invoke().await.unwrap_err();
    assert!(matches!(err, ActError::MissingContext { ref key } if key.ends_with("Db")));
}

#[tokio::test]
async fn test_rejected_input_fails_without_calling_handler() {
    let calls = CallCounter::new();
    let hits = calls.clone();
    let action = actus::builder()
        .input(ValueSchema::object([("foo", ValueSchema::string())]))
        .action(move |_params: ActionParams<Value>| {
            hits.hit();
            async { Ok("bar") }
        });

    let err = action.call(json!({})).await.unwrap_err();
    assert!(err.is_validation());
    let errors = err.as_validation().unwrap().errors();
    assert_eq!(errors.field("foo"), Some(&["Required".to_string()][..]));
    assert_eq!(calls.count(), 0);

    assert_eq!(action.call(json!({"foo": "x"})).await.unwrap(), "bar");
    assert_eq!(calls.count(), 1);
}

#[tokio::test]
async fn test_wrong_type_is_rejected() {
    let action = actus::builder()
        .input(ValueSchema::string())
        .action(|_params: ActionParams<Value>| async { Ok("bar") });

    let err = action.call(json!(1)).await.unwrap_err();
    assert_eq!(
        err.as_validation().unwrap().issues()[0].message,
        "Expected string, received number"
    );
}

#[tokio::test]
async fn test_refined_input() {
    let action = actus::builder()
        .input(ValueSchema::string().refine(
            |v| v.as_str().is_some_and(|s| s.starts_with('f')),
            "Must start with f",
        ))
        .action(|_params: ActionParams<Value>| async { Ok("bar") });

    assert_eq!(action.call(json!("foo")).await.unwrap(), "bar");
    assert!(action.call(json!("boo")).await.unwrap_err().is_validation());
}

#[tokio::test]
async fn test_optional_input() {
    let action = actus::builder()
        .input(Optional(accept_all::<String>()))
        .action(|params: ActionParams<Option<String>>| async move {
            Ok(params.input.unwrap_or_else(|| "bar".to_string()))
        });

    assert_eq!(action.arity(), Arity::Optional);
    assert_eq!(action.call(Some("foo".to_string())).await.unwrap(), "foo");
    assert_eq!(action.call(None).await.unwrap(), "bar");
}

#[tokio::test]
async fn test_optional_value_schema_input() {
    let builder = actus::builder().input(ValueSchema::string().optional());
    assert_eq!(builder.arity(), Arity::Optional);

    let action = builder.action(|params: ActionParams<Value>| async move {
        Ok(params.input.as_str().unwrap_or("bar").to_string())
    });
    assert_eq!(action.arity(), Arity::Optional);
    assert_eq!(action.call(Value::Null).await.unwrap(), "bar");
    assert_eq!(action.call(json!("foo")).await.unwrap(), "foo");
    assert!(action.call(json!(1)).await.unwrap_err().is_validation());

    let required = actus::builder().input(ValueSchema::string());
    assert_eq!(required.arity(), Arity::Required);
}

#[tokio::test]
async fn test_optional_schema_from_factory() {
    let action = actus::builder()
        .use_step(|| async { Ok(json!({"fallback": "baz"})) })
        .input_with(|_ctx| async { Ok(ValueSchema::string().into_optional()) })
        .action(|params: ActionParams<Value>| async move {
            let fallback = params.ctx.str("fallback").unwrap_or_default().to_string();
            Ok(params.input.as_str().map_or(fallback, str::to_string))
        });

    assert_eq!(action.arity(), Arity::Optional);
    assert_eq!(action.call(Value::Null).await.unwrap(), "baz");
}

#[tokio::test]
async fn test_middleware_runs_once_per_call() {
    let calls = CallCounter::new();
    let hits = calls.clone();
    let action = actus::builder()
        .middleware(move || {
            hits.hit();
            async { Ok(json!({"prefix": "best"})) }
        })
        .input(accept_all::<String>())
        .action(|params: ActionParams<String>| async move {
            Ok(format!("{}-{}-bar", params.ctx.str("prefix").unwrap_or_default(), params.input))
        });

    assert_eq!(action.call("foo".to_string()).await.unwrap(), "best-foo-bar");
    assert_eq!(calls.count(), 1);

    action.call("foo".to_string()).await.unwrap();
    assert_eq!(calls.count(), 2);
}

#[tokio::test]
async fn test_schema_factory_uses_context() {
    let action = actus::builder()
        .middleware(|| async { Ok(json!({"prefix": "best"})) })
        .input_with(|ctx: Context| async move {
            let prefix: String = ctx.get("prefix")?;
            Ok::<_, ActError>(ValueSchema::string().transform(move |v| {
                json!(format!("{prefix}-{}", v.as_str().unwrap_or_default()))
            }))
        })
        .action(|params: ActionParams<Value>| async move {
            Ok(format!(
                "{}-{}-bar",
                params.input.as_str().unwrap_or_default(),
                params.ctx.str("prefix").unwrap_or_default()
            ))
        });

    assert_eq!(action.call(json!("foo")).await.unwrap(), "best-foo-best-bar");
}

#[tokio::test]
async fn test_schema_factory_sees_steps_added_after_it() {
    let action = actus::builder()
        .input_with(|ctx: Context| async move {
            let max: usize = ctx.get("max_length")?;
            Ok::<_, ActError>(ValueSchema::string().max_length(max))
        })
        .use_step(|| async { Ok(json!({"max_length": 3})) })
        .action(|params: ActionParams<Value>| async move { Ok(params.input) });

    assert_eq!(action.call(json!("abc")).await.unwrap(), json!("abc"));
    assert!(action.call(json!("abcd")).await.unwrap_err().is_validation());
}

#[tokio::test]
async fn test_execution_order() {
    let log = OrderLog::new();
    let (first, second, factory, handler) = (log.clone(), log.clone(), log.clone(), log.clone());

    let action = actus::builder()
        .use_step(move || {
            first.push("step 1");
            async { Ok(()) }
        })
        .input_with(move |_ctx: Context| {
            factory.push("schema");
            async { Ok::<_, ActError>(accept_all::<i64>()) }
        })
        .use_step(move || {
            second.push("step 2");
            async { Ok(()) }
        })
        .action(move |params: ActionParams<i64>| {
            handler.push("handler");
            async move { Ok(params.input) }
        });

    assert_eq!(action.call(7).await.unwrap(), 7);
    assert_eq!(log.entries(), vec!["step 1", "step 2", "schema", "handler"]);
}

#[tokio::test]
async fn test_last_input_wins() {
    let base = actus::builder().input(reject_all::<i64>(vec![required_at(["n"])]));
    let replaced = base.input(accept_all::<i64>());

    let rejecting = base.action(|params: ActionParams<i64>| async move { Ok(params.input) });
    let accepting = replaced.action(|params: ActionParams<i64>| async move { Ok(params.input) });

    assert!(rejecting.call(1).await.unwrap_err().is_validation());
    assert_eq!(accepting.call(1).await.unwrap(), 1);
}

#[tokio::test]
async fn test_builders_are_immutable() {
    let base = actus::builder().use_step(|| async { Ok(json!({"who": "base"})) });
    let derived = base.use_step(|| async { Ok(json!({"who": "derived"})) });

    let from_base = base.action(|p: ActionParams<()>| async move { Ok(p.ctx.into_value()) });
    let from_derived = derived.action(|p: ActionParams<()>| async move { Ok(p.ctx.into_value()) });

    assert_eq!(from_base.invoke().await.unwrap(), json!({"who": "base"}));
    assert_eq!(from_derived.invoke().await.unwrap(), json!({"who": "derived"}));
    assert_eq!(base.definition().step_count(), 1);

    // A terminal call leaves the builder usable.
    let again = base.action(|_p: ActionParams<()>| async { Ok(1) });
    assert_eq!(again.invoke().await.unwrap(), 1);
}

#[tokio::test]
async fn test_non_object_patch_fails() {
    let action = actus::builder()
        .use_step(|| async { Ok(json!([1, 2])) })
        .action(|_p: ActionParams<()>| async { Ok(()) });

    let err = action.invoke().await.unwrap_err();
    assert!(matches!(err, ActError::InvalidPatch { found: "array" }));
}

#[tokio::test]
async fn test_chain_steps_composite() {
    let auth: actus::middleware::BoxedStep<ActError> =
        (|| async { Ok(json!({"prefix": "best"})) }).into_step();
    let greet: actus::middleware::BoxedStep<ActError> = (|ctx: Context| async move {
        let prefix: String = ctx.get("prefix")?;
        Ok::<_, ActError>(json!({"message": format!("{prefix}-bar")}))
    })
    .into_step();

    let action = actus::builder()
        .use_step(chain_steps([auth, greet]))
        .action(|p: ActionParams<()>| async move { Ok(p.ctx.into_value()) });

    assert_eq!(
        action.invoke().await.unwrap(),
        json!({"prefix": "best", "message": "best-bar"})
    );
}

#[tokio::test]
async fn test_chain_steps_context_visibility() {
    let count_keys = || -> actus::middleware::BoxedStep<ActError> {
        (|ctx: Context| async move { Ok::<_, ActError>(json!({"seen": ctx.len()})) }).into_step()
    };

    let shared = actus::builder()
        .use_step(|| async { Ok(json!({"user": "u-1", "org": "o-1"})) })
        .use_step(chain_steps([count_keys()]))
        .action(|p: ActionParams<()>| async move { Ok(p.ctx.get::<usize>("seen")?) });
    assert_eq!(shared.invoke().await.unwrap(), 2);

    let isolated = actus::builder()
        .use_step(|| async { Ok(json!({"user": "u-1", "org": "o-1"})) })
        .use_step(chain_steps([count_keys()]).isolated())
        .action(|p: ActionParams<()>| async move {
            Ok((p.ctx.get::<usize>("seen")?, p.ctx.contains("user")))
        });
    assert_eq!(isolated.invoke().await.unwrap(), (0, true));
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let action = actus::builder()
        .input(accept_all::<i64>())
        .use_step(|| async { Ok(json!({"base": 100})) })
        .action(|params: ActionParams<i64>| async move {
            tokio::task::yield_now().await;
            Ok(params.ctx.get::<i64>("base")? + params.input)
        });

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let action = action.clone();
            tokio::spawn(async move { action.call(n).await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }
    assert_eq!(results, (100..108).collect::<Vec<_>>());
}
