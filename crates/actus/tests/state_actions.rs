//! State and form actions: rejected input reaches the handler.

#![allow(deprecated)]

use actus::prelude::*;
use actus_core::fixtures::CallCounter;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
enum State {
    Done(String),
    Invalid(InputErrors),
}

fn foo_schema() -> ValueSchema {
    ValueSchema::object([("foo", ValueSchema::string())])
}

#[tokio::test]
async fn test_prev_state_is_passed_through() {
    let action = actus::builder().state_action(|params: StateParams<(), (), &'static str>| async move {
        Ok(if params.prev_state.is_none() { "foo" } else { "bar" })
    });

    assert_eq!(action.arity(), Arity::None);
    assert_eq!(action.call(None, ()).await.unwrap(), "foo");
    assert_eq!(action.call(Some("x"), ()).await.unwrap(), "bar");
}

#[derive(Debug, Clone, PartialEq)]
enum Seed {
    Initial(u32),
    Step(String),
}

#[tokio::test]
async fn test_prev_state_type_differs_from_output() {
    let action = actus::builder().state_action_with_prev(|params: StateParams<(), (), Seed>| async move {
        Ok(match params.prev_state {
            Some(Seed::Initial(n)) => format!("started at {n}"),
            Some(Seed::Step(last)) => format!("after {last}"),
            None => "fresh".to_string(),
        })
    });

    assert_eq!(action.call(Some(Seed::Initial(5)), ()).await.unwrap(), "started at 5");
    assert_eq!(action.call(Some(Seed::Step("a".into())), ()).await.unwrap(), "after a");
    assert_eq!(action.call(None, ()).await.unwrap(), "fresh");
}

#[tokio::test]
async fn test_valid_input_reaches_handler() {
    let action = actus::builder()
        .use_step(|| async { Ok(json!({"prefix": "best"})) })
        .input(foo_schema())
        .state_action(|params: StateParams<Value, Value, State>| async move {
            assert!(params.input_errors().is_none());
            let foo = params.input().and_then(|v| v["foo"].as_str()).unwrap_or_default();
            Ok(State::Done(format!(
                "{}-{foo}",
                params.ctx.str("prefix").unwrap_or_default()
            )))
        });

    let state = action.call(None, json!({"foo": "bar"})).await.unwrap();
    assert_eq!(state, State::Done("best-bar".to_string()));
}

#[tokio::test]
async fn test_rejected_input_is_handed_to_handler() {
    let action = actus::builder()
        .input(foo_schema())
        .state_action(|params: StateParams<Value, Value, State>| async move {
            assert!(params.input().is_none());
            assert_eq!(params.raw_input, json!({"bar": 1}));
            match params.input {
                Ok(_) => Ok(State::Done("unexpected".to_string())),
                Err(errors) => Ok(State::Invalid(errors)),
            }
        });

    let errors = match action.call(None, json!({"bar": 1})).await.unwrap() {
        State::Invalid(errors) => errors,
        other => panic!("expected validation errors, got {other:?}"),
    };
    assert!(errors.messages.is_empty());
    assert_eq!(errors.field("foo"), Some(&["Required".to_string()][..]));
    assert_eq!(
        serde_json::to_value(&errors).unwrap(),
        json!({"messages": [], "fieldErrors": {"foo": ["Required"]}})
    );
}

#[tokio::test]
async fn test_nested_paths_are_dotted() {
    let schema = ValueSchema::object([(
        "list",
        ValueSchema::array(ValueSchema::object([("foo", ValueSchema::string())])),
    )]);
    let action = actus::builder()
        .input(schema)
        .state_action(|params: StateParams<Value, Value, InputErrors>| async move {
            Ok(params.input_errors().cloned().unwrap_or_default())
        });

    let errors = action.call(None, json!({"list": [{}]})).await.unwrap();
    assert_eq!(errors.field("list.0.foo"), Some(&["Required".to_string()][..]));
}

#[tokio::test]
async fn test_state_handler_decides_returned_state() {
    let action = actus::builder()
        .input(ValueSchema::string().min_length(3))
        .state_action(|params: StateParams<Value, Value, String>| async move {
            Ok(match params.input {
                Ok(name) => format!("saved {}", name.as_str().unwrap_or_default()),
                Err(_) => params.prev_state.unwrap_or_else(|| "draft".to_string()),
            })
        });

    assert_eq!(action.call(None, json!("ab")).await.unwrap(), "draft");
    assert_eq!(
        action.call(Some("kept".to_string()), json!("ab")).await.unwrap(),
        "kept"
    );
    assert_eq!(action.call(None, json!("abc")).await.unwrap(), "saved abc");
}

#[tokio::test]
async fn test_step_errors_still_propagate() {
    let calls = CallCounter::new();
    let hits = calls.clone();
    let action = actus::builder()
        .use_step(|| async { Err::<(), _>(ActError::missing_context("session")) })
        .input(foo_schema())
        .state_action(move |_params: StateParams<Value, Value, String>| {
            hits.hit();
            async { Ok("unreachable".to_string()) }
        });

    let err = action.call(None, json!({})).await.unwrap_err();
    assert!(matches!(err, ActError::MissingContext { .. }));
    assert_eq!(calls.count(), 0);
}

#[tokio::test]
async fn test_form_action_with_form_data() {
    let schema = FormSchema::new(ValueSchema::object([(
        "user",
        ValueSchema::object([
            ("name", ValueSchema::string().min_length(1)),
            ("tags", ValueSchema::array(ValueSchema::string()).optional()),
        ]),
    )]));

    let action = actus::builder()
        .named("saveProfile")
        .input(schema)
        .form_action(|params: FormParams<FormData, Value, State>| async move {
            if let Some(errors) = params.form_errors() {
                return Ok(State::Invalid(errors.clone()));
            }
            let echoed = params.form_data.text("user.name").unwrap_or_default().to_string();
            let parsed = params.input().map(|v| v["user"]["name"].clone());
            assert_eq!(parsed, Some(json!(echoed)));
            Ok(State::Done(echoed))
        });

    assert_eq!(action.definition().name(), "saveProfile");

    let form = FormData::new()
        .with("user.name", "Ada")
        .with("user.tags[]", "a")
        .with("user.tags[]", "b");
    assert_eq!(
        action.call(None, form).await.unwrap(),
        State::Done("Ada".to_string())
    );

    let missing = FormData::parse_urlencoded(b"user.tags[]=a").unwrap();
    let State::Invalid(errors) = action.call(None, missing).await.unwrap() else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.field("user.name"), Some(&["Required".to_string()][..]));
}

#[tokio::test]
async fn test_form_action_matches_state_action() {
    let form = actus::builder()
        .input(foo_schema())
        .form_action(|params: FormParams<Value, Value, InputErrors>| async move {
            Ok(params.form_errors().cloned().unwrap_or_default())
        });
    let state = actus::builder()
        .input(foo_schema())
        .state_action(|params: StateParams<Value, Value, InputErrors>| async move {
            Ok(params.input_errors().cloned().unwrap_or_default())
        });

    let raw = json!({"foo": 1});
    assert_eq!(
        form.call(None, raw.clone()).await.unwrap(),
        state.call(None, raw).await.unwrap()
    );
}
