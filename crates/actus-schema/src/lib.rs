//! # Actus Schema
//!
//! Declarative validation for JSON action input.
//!
//! [`ValueSchema`] implements [`actus_core::Schema`] over
//! [`serde_json::Value`], reporting every issue with the path at which it
//! occurred. [`Typed`] adds a final deserialization step into a Rust type.
//!
//! ## Example
//!
//! ```
//! use actus_core::{get_input_errors, Schema};
//! use actus_schema::ValueSchema;
//! use serde_json::json;
//!
//! let schema = ValueSchema::object([
//!     ("foo", ValueSchema::string()),
//!     ("list", ValueSchema::array(ValueSchema::object([("id", ValueSchema::integer())]))),
//! ]);
//!
//! # tokio_test::block_on(async {
//! let outcome = schema.validate(json!({"list": [{"id": "x"}]})).await;
//! let errors = get_input_errors(outcome.issues().unwrap());
//! assert_eq!(errors.field_errors["foo"], vec!["Required"]);
//! assert_eq!(errors.field_errors["list.0.id"], vec!["Expected integer, received string"]);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/actus-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod typed;
mod value;

pub use typed::Typed;
pub use value::{OptionalValue, ValueSchema};
