//! # Actus
//!
//! **Fluent, immutable builder for validated async actions.**
//!
//! Actus wraps an async handler with:
//!
//! - **Context steps** – ordered functions whose outputs are shallow-merged
//!   into a per-call context
//! - **Input validation** – a static schema, or one built from the context
//! - **Three calling conventions** – [`Action`], [`StateAction`] and the
//!   deprecated [`FormAction`], sharing one execution pipeline
//!
//! ## Quick Start
//!
//! ```rust
//! use actus::prelude::*;
//! use serde_json::{json, Value};
//!
//! # tokio_test::block_on(async {
//! let create_post = actus::builder()
//!     .named("createPost")
//!     .use_step(|| async { Ok(json!({"user": "u-1"})) })
//!     .input(ValueSchema::object([("title", ValueSchema::string().min_length(1))]))
//!     .action(|params: ActionParams<Value>| async move {
//!         Ok(format!("{} wrote {}", params.ctx.str("user").unwrap_or("?"), params.input["title"]))
//!     });
//!
//! let created = create_post.call(json!({"title": "Hello"})).await.unwrap();
//! assert_eq!(created, r#"u-1 wrote "Hello""#);
//!
//! let err = create_post.call(json!({})).await.unwrap_err();
//! assert_eq!(err.as_validation().unwrap().errors().field("title"), Some(&["Required".to_string()][..]));
//! # });
//! ```
//!
//! ## Execution
//!
//! ```text
//! call(raw) → step 0 → merge → … → step N → resolve schema → validate
//!                                                              ↓
//!               action: Err(Validation) | handler({ctx, input})
//!         state_action: handler({ctx, prev_state, raw_input, input: Ok | Err(InputErrors)})
//! ```

#![doc(html_root_url = "https://docs.rs/actus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod builder;
mod executor;
mod input;

pub use action::{Action, ActionParams, FormAction, FormParams, StateAction, StateParams};
pub use builder::{ActionBuilder, Definition, DEFAULT_ACTION_NAME};
pub use input::{ContextInput, InputResolver, NoInput, StaticInput};

// Re-export the member crates
pub use actus_config as config;
pub use actus_core as core;
pub use actus_extract as extract;
pub use actus_middleware as middleware;
pub use actus_schema as schema;
pub use actus_telemetry as telemetry;

pub use actus_core::{
    get_form_errors, get_input_errors, ActError, ActResult, ActionSettings, Arity, Context,
    Extensions, InputErrors, Issue, PathSegment, Patch, Schema, ValidationOutcome,
};

/// Creates a builder whose actions fail with [`ActError`].
///
/// For a caller-defined error type use
/// `ActionBuilder::<NoInput, MyError>::new()`.
pub fn builder() -> ActionBuilder {
    ActionBuilder::new()
}

/// Prelude module for convenient imports.
///
/// ```rust
/// use actus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Action, ActionBuilder, ActionParams, FormAction, FormParams, NoInput, StateAction,
        StateParams,
    };

    pub use actus_core::{
        async_schema_fn, get_form_errors, get_input_errors, schema_fn, ActError, ActionSettings,
        Arity, Context, InputErrors, Issue, Optional, PathSegment, Patch, Schema,
        ValidationOutcome,
    };

    pub use actus_middleware::{chain_steps, ContextStep, IntoContextStep, SyncStep};

    pub use actus_schema::ValueSchema;

    pub use actus_extract::{FormData, FormSchema};
}
