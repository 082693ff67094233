//! # Actus Core
//!
//! Core types and traits shared by every Actus crate.
//!
//! This crate provides the foundational types the action builder is made of:
//!
//! - [`Context`] / [`Patch`] - Per-call context and the shallow, last-wins merge
//! - [`Extensions`] - Typed values without a JSON form, carried in the context
//! - [`Schema`] / [`ValidationOutcome`] - The one operation a validation library must expose
//! - [`Issue`] / [`PathSegment`] - A single validation failure and where it happened
//! - [`InputErrors`] - Issues grouped into per-field and form-level messages
//! - [`Arity`] - How many arguments a produced callable expects
//! - [`ActError`] - Standard error type
//!
//! ## Example
//!
//! ```
//! use actus_core::{get_input_errors, Issue, PathSegment};
//!
//! let issues = vec![Issue::at("Required", [PathSegment::key("foo")])];
//! let errors = get_input_errors(&issues);
//!
//! assert!(errors.messages.is_empty());
//! assert_eq!(errors.field("foo"), Some(&["Required".to_string()][..]));
//! ```

#![doc(html_root_url = "https://docs.rs/actus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod arity;
mod context;
mod error;
mod extensions;
pub mod fixtures;
mod issue;
pub mod schema;
mod settings;

pub use arity::Arity;
pub use context::{Context, IntoPatch, Patch};
pub use error::{ActError, ActResult, InputValidationError};
pub use extensions::Extensions;
pub use issue::{get_form_errors, get_input_errors, InputErrors, Issue, PathSegment};
pub use schema::{
    async_schema_fn, schema_fn, BoxFuture, Optional, Schema, ValidationOutcome,
};
pub use settings::ActionSettings;
