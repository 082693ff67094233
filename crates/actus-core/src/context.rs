//! Per-call context and patch merging.
//!
//! A [`Context`] starts empty on every call. Each context step produces an
//! optional [`Patch`] that is shallow-merged on top of the accumulated
//! context: later keys overwrite earlier keys of the same name, nested
//! values are replaced wholesale rather than deep-merged.
//!
//! Values without a JSON form (pools, clients, session objects) ride along
//! as typed [`Extensions`] and merge the same way, keyed by type.

use crate::error::ActError;
use crate::extensions::Extensions;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Merged key-value context visible to later steps, input resolvers and handlers.
///
/// Keys keep the position of their first insertion; overwriting a key
/// replaces the value in place.
///
/// # Example
///
/// ```
/// use actus_core::{Context, Patch};
///
/// let ctx = Context::new()
///     .merged(Patch::new().with("prefix", "best").with("a", 1))
///     .merged(Patch::new().with("a", 2));
///
/// assert_eq!(ctx.str("prefix"), Some("best"));
/// assert_eq!(ctx.get::<i64>("a").unwrap(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    values: IndexMap<String, Value>,
    #[serde(skip)]
    extensions: Extensions,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw JSON value stored under `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value under `key` if it is a string.
    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Deserializes the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ActError::MissingContext`] if the key is absent and
    /// [`ActError::ContextType`] if the value does not deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ActError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ActError::missing_context(key))?;
        serde_json::from_value(value.clone()).map_err(|source| ActError::ContextType {
            key: key.to_string(),
            source,
        })
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys in the context.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no step has contributed anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the extension of type `T`, if a step provided one.
    #[must_use]
    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    /// Returns the extension of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ActError::MissingContext`] naming the type if no step
    /// provided one.
    pub fn require<T: Send + Sync + 'static>(&self) -> Result<&T, ActError> {
        self.extension::<T>()
            .ok_or_else(|| ActError::missing_context(std::any::type_name::<T>()))
    }

    /// All typed extensions.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Shallow-merges `patch` into this context, later keys winning.
    pub fn merge(&mut self, patch: Patch) {
        for (key, value) in patch.values {
            self.values.insert(key, value);
        }
        self.extensions.extend(patch.extensions);
    }

    /// Returns a new context with `patch` merged on top.
    #[must_use]
    pub fn merged(mut self, patch: Patch) -> Self {
        self.merge(patch);
        self
    }

    /// Converts the context into a JSON object. Extensions are dropped.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.values.into_iter().collect())
    }
}

/// A set of keys produced by one context step.
///
/// # Example
///
/// ```
/// use actus_core::Patch;
///
/// let patch = Patch::new().with("user", "alice").with("roles", vec!["admin"]);
/// assert_eq!(patch.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    values: IndexMap<String, Value>,
    #[serde(skip)]
    extensions: Extensions,
}

impl Patch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key to the patch.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a key, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Adds a typed extension, replacing any previous one of type `T`.
    ///
    /// ```
    /// use actus_core::{Context, Patch};
    ///
    /// struct Db {
    ///     url: &'static str,
    /// }
    ///
    /// let ctx = Context::new().merged(Patch::new().with_extension(Db { url: "pg://" }));
    /// assert_eq!(ctx.extension::<Db>().map(|db| db.url), Some("pg://"));
    /// ```
    #[must_use]
    pub fn with_extension<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    /// Adds an already shared extension.
    #[must_use]
    pub fn with_shared<T: Send + Sync + 'static>(mut self, value: Arc<T>) -> Self {
        self.extensions.insert_arc(value);
        self
    }

    /// Builds a patch from any serializable struct or map.
    ///
    /// # Errors
    ///
    /// Returns [`ActError::InvalidPatch`] if `value` does not serialize to
    /// a JSON object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, ActError> {
        let value = serde_json::to_value(value).map_err(|e| ActError::Other(e.into()))?;
        match value.into_patch()? {
            Some(patch) => Ok(patch),
            None => Ok(Self::new()),
        }
    }

    /// Number of JSON keys in the patch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the patch contributes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.extensions.is_empty()
    }

    /// Returns the value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Merges `other` on top of this patch.
    pub fn extend(&mut self, other: Patch) {
        self.values.extend(other.values);
        self.extensions.extend(other.extensions);
    }
}

impl From<Map<String, Value>> for Patch {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            values: map.into_iter().collect(),
            extensions: Extensions::new(),
        }
    }
}

impl From<Context> for Patch {
    fn from(ctx: Context) -> Self {
        Self {
            values: ctx.values,
            extensions: ctx.extensions,
        }
    }
}

impl FromIterator<(String, Value)> for Patch {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            extensions: Extensions::new(),
        }
    }
}

/// Conversion from a step's return value into an optional patch.
///
/// "Nothing" (`()`, `None`, JSON `null`) means the step contributes no
/// keys. Object-shaped values become patches. Anything else is rejected
/// at the merge boundary.
pub trait IntoPatch {
    /// Converts `self` into a patch.
    ///
    /// # Errors
    ///
    /// Returns [`ActError::InvalidPatch`] for non-object values.
    fn into_patch(self) -> Result<Option<Patch>, ActError>;
}

impl IntoPatch for () {
    fn into_patch(self) -> Result<Option<Patch>, ActError> {
        Ok(None)
    }
}

impl IntoPatch for Patch {
    fn into_patch(self) -> Result<Option<Patch>, ActError> {
        Ok(Some(self))
    }
}

impl IntoPatch for Context {
    fn into_patch(self) -> Result<Option<Patch>, ActError> {
        Ok(Some(self.into()))
    }
}

impl IntoPatch for Map<String, Value> {
    fn into_patch(self) -> Result<Option<Patch>, ActError> {
        Ok(Some(self.into()))
    }
}

impl IntoPatch for IndexMap<String, Value> {
    fn into_patch(self) -> Result<Option<Patch>, ActError> {
        Ok(Some(Patch {
            values: self,
            extensions: Extensions::new(),
        }))
    }
}

impl IntoPatch for Value {
    fn into_patch(self) -> Result<Option<Patch>, ActError> {
        match self {
            Value::Null => Ok(None),
            Value::Object(map) => Ok(Some(map.into())),
            other => Err(ActError::InvalidPatch {
                found: value_kind(&other),
            }),
        }
    }
}

impl<P: IntoPatch> IntoPatch for Option<P> {
    fn into_patch(self) -> Result<Option<Patch>, ActError> {
        match self {
            Some(inner) => inner.into_patch(),
            None => Ok(None),
        }
    }
}

/// Returns a human-readable name for a JSON value type.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
