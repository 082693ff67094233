//! # Actus Extract
//!
//! Form submissions for Actus form actions.
//!
//! This crate turns flat form submissions into nested JSON and validates
//! them:
//!
//! - [`FormData`] - ordered text and file entries, parsed from
//!   `application/x-www-form-urlencoded` bodies or built by hand
//! - [`FormDecoder`] - rebuilds nesting from keys like `users[0].name`
//! - [`FormSchema`] - a [`Schema`](actus_core::Schema) over [`FormData`]
//!
//! ## Example
//!
//! ```
//! use actus_extract::{form_data_to_object, FormData};
//! use serde_json::json;
//!
//! let form = FormData::parse_urlencoded(b"items[]=a&items[]=b&user.name=Ada").unwrap();
//! assert_eq!(
//!     form_data_to_object(&form).unwrap(),
//!     json!({"items": ["a", "b"], "user": {"name": "Ada"}})
//! );
//! ```

#![doc(html_root_url = "https://docs.rs/actus-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod decode;
mod error;
mod form_data;
mod schema;

pub use decode::{form_data_to_object, FormDecoder, FormLimits, FormNode};
pub use error::ExtractionError;
pub use form_data::{FileEntry, FormData, FormValue};
pub use schema::FormSchema;
