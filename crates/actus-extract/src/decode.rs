//! Nested decoding of flat form keys.
//!
//! Browsers submit forms as flat `(key, value)` pairs. [`FormDecoder`]
//! rebuilds the nesting encoded in the keys:
//!
//! | Key                  | Meaning                                   |
//! |----------------------|-------------------------------------------|
//! | `user.name`          | field `name` of object `user`             |
//! | `items[0]`, `items.0`| element 0 of array `items`                |
//! | `items[]`            | appended to array `items`                 |
//! | `data[key with dash]`| field `key with dash` of object `data`    |
//!
//! Numeric segments create arrays; skipped indices leave holes. A
//! non-numeric segment addressing an existing array turns it into an object
//! keyed by index. A numeric segment addressing an existing object is used
//! as a plain key. Repeating a leaf key collects its values into an array.
//!
//! # Example
//!
//! ```
//! use actus_extract::{form_data_to_object, FormData};
//! use serde_json::json;
//!
//! let form = FormData::new()
//!     .with("users[0].name", "John")
//!     .with("users[0].tags", "a")
//!     .with("users[0].tags", "b")
//!     .with("users[1].name", "Jane");
//!
//! assert_eq!(
//!     form_data_to_object(&form).unwrap(),
//!     json!({"users": [{"name": "John", "tags": ["a", "b"]}, {"name": "Jane"}]})
//! );
//! ```

use crate::error::ExtractionError;
use crate::form_data::{FormData, FormValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Guards against pathological form keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormLimits {
    /// Maximum number of segments in one key.
    pub max_depth: usize,
    /// Largest accepted array index.
    pub max_index: usize,
}

impl Default for FormLimits {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_index: 10_000,
        }
    }
}

/// A decoded form tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNode {
    /// A submitted value.
    Value(FormValue),
    /// An array; `None` marks a hole.
    Array(Vec<Option<FormNode>>),
    /// An object in key insertion order.
    Object(IndexMap<String, FormNode>),
}

impl FormNode {
    /// Renders the tree as JSON.
    ///
    /// Holes become `null`; files become `{"name", "type", "size"}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Value(FormValue::Text(text)) => Value::String(text.clone()),
            Self::Value(FormValue::File(file)) => json!({
                "name": file.name,
                "type": file.content_type,
                "size": file.size(),
            }),
            Self::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.as_ref().map_or(Value::Null, FormNode::to_json))
                    .collect(),
            ),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, node)| (key.clone(), node.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    /// Looks up a direct child by key or index.
    #[must_use]
    pub fn get(&self, segment: &str) -> Option<&FormNode> {
        match self {
            Self::Value(_) => None,
            Self::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .and_then(Option::as_ref),
            Self::Object(fields) => fields.get(segment),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
    Push,
}

impl Segment {
    fn wants_array(&self) -> bool {
        matches!(self, Self::Index(_) | Self::Push)
    }

    fn object_key(&self) -> String {
        match self {
            Self::Key(key) => key.clone(),
            Self::Index(index) => index.to_string(),
            Self::Push => String::new(),
        }
    }
}

/// Decodes [`FormData`] into a [`FormNode`] tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormDecoder {
    limits: FormLimits,
}

impl FormDecoder {
    /// Creates a decoder with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder with the given limits.
    #[must_use]
    pub fn with_limits(limits: FormLimits) -> Self {
        Self { limits }
    }

    /// The limits in effect.
    #[must_use]
    pub fn limits(&self) -> FormLimits {
        self.limits
    }

    /// Decodes every entry, in order, into one object tree.
    pub fn decode(&self, form: &FormData) -> Result<FormNode, ExtractionError> {
        let mut root = FormNode::Object(IndexMap::new());
        for (key, value) in form.entries() {
            let segments = self.parse_key(key)?;
            insert(&mut root, key, &segments, value.clone())?;
        }
        Ok(root)
    }

    /// Decodes and renders as JSON.
    pub fn decode_json(&self, form: &FormData) -> Result<Value, ExtractionError> {
        self.decode(form).map(|node| node.to_json())
    }

    fn parse_key(&self, key: &str) -> Result<Vec<Segment>, ExtractionError> {
        let mut segments = Vec::new();
        let mut buffer = String::new();
        let mut chars = key.chars();

        while let Some(c) = chars.next() {
            match c {
                '.' => flush(&mut buffer, &mut segments),
                '[' => {
                    let rest = chars.as_str();
                    if let Some(end) = rest.find(']') {
                        flush(&mut buffer, &mut segments);
                        let inner = &rest[..end];
                        segments.push(if inner.is_empty() {
                            Segment::Push
                        } else {
                            classify(inner)
                        });
                        chars = rest[end + 1..].chars();
                    } else {
                        buffer.push(c);
                    }
                }
                other => buffer.push(other),
            }
        }
        flush(&mut buffer, &mut segments);

        if segments.is_empty() {
            segments.push(Segment::Key(key.to_string()));
        }
        if segments.len() > self.limits.max_depth {
            return Err(ExtractionError::depth_exceeded(key, self.limits.max_depth));
        }
        for segment in &segments {
            if let Segment::Index(index) = segment {
                if *index > self.limits.max_index {
                    return Err(ExtractionError::index_too_large(
                        key,
                        *index,
                        self.limits.max_index,
                    ));
                }
            }
        }
        Ok(segments)
    }
}

/// Decodes `form` with default limits and renders it as JSON.
pub fn form_data_to_object(form: &FormData) -> Result<Value, ExtractionError> {
    FormDecoder::new().decode_json(form)
}

fn flush(buffer: &mut String, segments: &mut Vec<Segment>) {
    if !buffer.is_empty() {
        segments.push(classify(buffer));
        buffer.clear();
    }
}

fn classify(raw: &str) -> Segment {
    let numeric = raw.bytes().all(|b| b.is_ascii_digit()) && (raw == "0" || !raw.starts_with('0'));
    if numeric {
        if let Ok(index) = raw.parse() {
            return Segment::Index(index);
        }
    }
    Segment::Key(raw.to_string())
}

fn insert(
    container: &mut FormNode,
    key: &str,
    segments: &[Segment],
    value: FormValue,
) -> Result<(), ExtractionError> {
    let Some((first, rest)) = segments.split_first() else {
        return Ok(());
    };
    let Some(next) = rest.first() else {
        return set_leaf(container, key, first, value);
    };

    let child = child_slot(container, key, first, next.wants_array())?;
    if matches!(child, FormNode::Value(_)) {
        return Err(ExtractionError::conflict(key));
    }
    if !next.wants_array() {
        array_to_object(child);
    }
    insert(child, key, rest, value)
}

fn empty_container(array: bool) -> FormNode {
    if array {
        FormNode::Array(Vec::new())
    } else {
        FormNode::Object(IndexMap::new())
    }
}

fn child_slot<'a>(
    container: &'a mut FormNode,
    key: &str,
    segment: &Segment,
    array: bool,
) -> Result<&'a mut FormNode, ExtractionError> {
    match container {
        FormNode::Object(fields) => Ok(fields
            .entry(segment.object_key())
            .or_insert_with(|| empty_container(array))),
        FormNode::Array(items) => {
            let index = match segment {
                Segment::Index(index) => *index,
                Segment::Push => items.len(),
                Segment::Key(_) => return Err(ExtractionError::conflict(key)),
            };
            if items.len() <= index {
                items.resize(index + 1, None);
            }
            Ok(items[index].get_or_insert_with(|| empty_container(array)))
        }
        FormNode::Value(_) => Err(ExtractionError::conflict(key)),
    }
}

fn set_leaf(
    container: &mut FormNode,
    key: &str,
    segment: &Segment,
    value: FormValue,
) -> Result<(), ExtractionError> {
    match container {
        FormNode::Object(fields) => match fields.get_mut(&segment.object_key()) {
            Some(existing) => append_repeated(existing, key, value),
            None => {
                fields.insert(segment.object_key(), FormNode::Value(value));
                Ok(())
            }
        },
        FormNode::Array(items) => match segment {
            Segment::Push => {
                items.push(Some(FormNode::Value(value)));
                Ok(())
            }
            Segment::Index(index) => {
                if items.len() <= *index {
                    items.resize(index + 1, None);
                }
                let slot = &mut items[*index];
                match slot {
                    Some(existing) => append_repeated(existing, key, value),
                    None => {
                        *slot = Some(FormNode::Value(value));
                        Ok(())
                    }
                }
            }
            Segment::Key(_) => Err(ExtractionError::conflict(key)),
        },
        FormNode::Value(_) => Err(ExtractionError::conflict(key)),
    }
}

fn append_repeated(
    existing: &mut FormNode,
    key: &str,
    value: FormValue,
) -> Result<(), ExtractionError> {
    match existing {
        FormNode::Array(items) => items.push(Some(FormNode::Value(value))),
        FormNode::Value(_) => {
            let first = std::mem::replace(existing, FormNode::Array(Vec::new()));
            *existing = FormNode::Array(vec![Some(first), Some(FormNode::Value(value))]);
        }
        FormNode::Object(_) => return Err(ExtractionError::conflict(key)),
    }
    Ok(())
}

fn array_to_object(node: &mut FormNode) {
    if let FormNode::Array(items) = node {
        let fields = std::mem::take(items)
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| item.map(|child| (index.to_string(), child)))
            .collect();
        *node = FormNode::Object(fields);
    }
}
