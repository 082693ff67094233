//! # Actus Middleware
//!
//! Context steps and the sequential pipeline that runs them.
//!
//! A context step is a function of the context accumulated so far that
//! produces a patch (or nothing). Steps run strictly one after another in
//! the order they were added; each step's patch is shallow-merged into the
//! running context before the next step starts.
//!
//! ```text
//! {} → step 0 → merge → step 1 → merge → … → step N → final context
//! ```
//!
//! ## Example
//!
//! ```
//! use actus_core::{ActError, Context};
//! use actus_middleware::{StepChain, SyncStep};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let chain: StepChain<ActError> = StepChain::new()
//!     .with_step(SyncStep::new(|_ctx: &Context| Ok::<_, ActError>(json!({"a": 1}))))
//!     .with_step(SyncStep::new(|ctx: &Context| {
//!         Ok::<_, ActError>(json!({"b": ctx.get::<i64>("a")? + 1}))
//!     }));
//!
//! let ctx = chain.run(Context::new()).await.unwrap();
//! assert_eq!(ctx.get::<i64>("b").unwrap(), 2);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/actus-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod compose;
pub mod pipeline;
pub mod step;

// Re-export main types at crate root
pub use compose::{chain_steps, Chain};
pub use pipeline::StepChain;
pub use step::{BoxedStep, ContextStep, FnStep, IntoContextStep, SyncStep};
