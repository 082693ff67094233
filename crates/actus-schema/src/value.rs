//! Declarative schemas over JSON values.
//!
//! A [`ValueSchema`] describes the expected shape of a
//! [`serde_json::Value`] and validates it, collecting every issue together
//! with the path at which it was found. Fields are required by default;
//! a missing key and an explicit `null` both count as absent.
//!
//! # Example
//!
//! ```
//! use actus_schema::ValueSchema;
//! use serde_json::json;
//!
//! let schema = ValueSchema::object([
//!     ("name", ValueSchema::string().min_length(1)),
//!     ("age", ValueSchema::integer().min(0.0).optional()),
//! ]);
//!
//! assert!(schema.parse(&json!({"name": "Ada"})).is_valid());
//!
//! let outcome = schema.parse(&json!({"age": -1}));
//! let issues = outcome.issues().unwrap();
//! assert_eq!(issues.len(), 2);
//! assert_eq!(issues[0].message, "Required");
//! assert_eq!(issues[0].dot_path().as_deref(), Some("name"));
//! ```

use actus_core::{BoxFuture, Issue, PathSegment, Schema, ValidationOutcome};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

type Refinement = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// The type-specific part of a schema.
#[derive(Debug, Clone)]
enum Kind {
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    Integer {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
    Any,
    Literal(Value),
    Array {
        items: Box<ValueSchema>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    Object {
        fields: Vec<(String, ValueSchema)>,
        strict: bool,
    },
}

/// A schema for JSON values.
///
/// Built from one of the constructors and refined with modifiers. Each
/// modifier returns a new schema; modifiers that do not apply to the
/// schema's type leave it unchanged.
#[derive(Clone)]
pub struct ValueSchema {
    kind: Kind,
    optional: bool,
    type_message: Option<String>,
    required_message: Option<String>,
    refinements: Vec<(Refinement, String)>,
    transforms: Vec<Transform>,
}

impl fmt::Debug for ValueSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSchema")
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("refinements", &self.refinements.len())
            .field("transforms", &self.transforms.len())
            .finish_non_exhaustive()
    }
}

/// Outcome of checking one node.
enum Checked {
    /// Absent and allowed to be.
    Absent,
    /// Present and valid.
    Value(Value),
    /// Issues were recorded.
    Failed,
}

impl ValueSchema {
    fn of(kind: Kind) -> Self {
        Self {
            kind,
            optional: false,
            type_message: None,
            required_message: None,
            refinements: Vec::new(),
            transforms: Vec::new(),
        }
    }

    /// Creates a string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::of(Kind::String {
            min_length: None,
            max_length: None,
        })
    }

    /// Creates an integer schema.
    #[must_use]
    pub fn integer() -> Self {
        Self::of(Kind::Integer {
            minimum: None,
            maximum: None,
        })
    }

    /// Creates a number schema.
    #[must_use]
    pub fn number() -> Self {
        Self::of(Kind::Number {
            minimum: None,
            maximum: None,
        })
    }

    /// Creates a boolean schema.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of(Kind::Boolean)
    }

    /// Creates a schema that accepts any present value, including `null`.
    #[must_use]
    pub fn any() -> Self {
        Self::of(Kind::Any)
    }

    /// Creates a schema that accepts exactly `value`.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::of(Kind::Literal(value.into()))
    }

    /// Creates an array schema.
    #[must_use]
    pub fn array(items: ValueSchema) -> Self {
        Self::of(Kind::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        })
    }

    /// Creates an object schema from `(key, schema)` pairs.
    ///
    /// Unknown keys are dropped from the output unless [`strict`](Self::strict)
    /// is set.
    #[must_use]
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ValueSchema)>,
    {
        Self::of(Kind::Object {
            fields: fields
                .into_iter()
                .map(|(key, schema)| (key.into(), schema))
                .collect(),
            strict: false,
        })
    }

    /// Allows the value to be absent or `null`.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Returns whether this schema accepts an absent value.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Makes the schema optional and records that in its type.
    ///
    /// Use it where only the type is known up front, such as a schema
    /// returned by an `input_with` factory.
    #[must_use]
    pub fn into_optional(self) -> OptionalValue {
        OptionalValue(self.optional())
    }

    /// Sets the minimum length for string schemas.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        if let Kind::String { min_length, .. } = &mut self.kind {
            *min_length = Some(len);
        }
        self
    }

    /// Sets the maximum length for string schemas.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        if let Kind::String { max_length, .. } = &mut self.kind {
            *max_length = Some(len);
        }
        self
    }

    /// Sets the inclusive minimum for integer and number schemas.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        match &mut self.kind {
            Kind::Integer { minimum, .. } | Kind::Number { minimum, .. } => *minimum = Some(min),
            _ => {}
        }
        self
    }

    /// Sets the inclusive maximum for integer and number schemas.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        match &mut self.kind {
            Kind::Integer { maximum, .. } | Kind::Number { maximum, .. } => *maximum = Some(max),
            _ => {}
        }
        self
    }

    /// Sets the minimum number of items for array schemas.
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        if let Kind::Array { min_items, .. } = &mut self.kind {
            *min_items = Some(min);
        }
        self
    }

    /// Sets the maximum number of items for array schemas.
    #[must_use]
    pub fn max_items(mut self, max: usize) -> Self {
        if let Kind::Array { max_items, .. } = &mut self.kind {
            *max_items = Some(max);
        }
        self
    }

    /// Rejects unknown keys on object schemas.
    #[must_use]
    pub fn strict(mut self) -> Self {
        if let Kind::Object { strict, .. } = &mut self.kind {
            *strict = true;
        }
        self
    }

    /// Replaces the type-mismatch message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }

    /// Replaces the message used when a required value is absent.
    #[must_use]
    pub fn required_message(mut self, message: impl Into<String>) -> Self {
        self.required_message = Some(message.into());
        self
    }

    /// Adds a check that runs after the built-in checks pass.
    ///
    /// ```
    /// use actus_schema::ValueSchema;
    /// use serde_json::json;
    ///
    /// let even = ValueSchema::integer()
    ///     .refine(|v| v.as_i64().is_some_and(|n| n % 2 == 0), "Must be even");
    /// assert!(even.parse(&json!(4)).is_valid());
    /// assert_eq!(even.parse(&json!(3)).issues().unwrap()[0].message, "Must be even");
    /// ```
    #[must_use]
    pub fn refine<F>(mut self, check: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.refinements.push((Arc::new(check), message.into()));
        self
    }

    /// Maps the value once every check has passed.
    #[must_use]
    pub fn transform<F>(mut self, map: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transforms.push(Arc::new(map));
        self
    }

    /// Validates `value` synchronously.
    ///
    /// An absent top-level value (`null`) parses to `null` when the schema
    /// is optional.
    pub fn parse(&self, value: &Value) -> ValidationOutcome<Value> {
        let mut path = Vec::new();
        let mut issues = Vec::new();
        match self.check(Some(value), &mut path, &mut issues) {
            Checked::Value(parsed) if issues.is_empty() => ValidationOutcome::Valid(parsed),
            Checked::Absent if issues.is_empty() => ValidationOutcome::Valid(Value::Null),
            _ => ValidationOutcome::Invalid(issues),
        }
    }

    fn check(
        &self,
        value: Option<&Value>,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
    ) -> Checked {
        let value = match value {
            Some(Value::Null) if !matches!(self.kind, Kind::Any) => None,
            other => other,
        };

        let Some(value) = value else {
            if self.optional {
                return Checked::Absent;
            }
            let message = self.required_message.as_deref().unwrap_or("Required");
            issues.push(issue_at(message, path));
            return Checked::Failed;
        };

        let before = issues.len();
        let parsed = self.check_kind(value, path, issues);
        let Some(mut parsed) = parsed.filter(|_| issues.len() == before) else {
            return Checked::Failed;
        };

        for (check, message) in &self.refinements {
            if !check(&parsed) {
                issues.push(issue_at(message, path));
            }
        }
        if issues.len() != before {
            return Checked::Failed;
        }

        for map in &self.transforms {
            parsed = map(parsed);
        }
        Checked::Value(parsed)
    }

    fn check_kind(
        &self,
        value: &Value,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        match &self.kind {
            Kind::Any => Some(value.clone()),
            Kind::Boolean => match value {
                Value::Bool(_) => Some(value.clone()),
                other => self.mismatch("boolean", other, path, issues),
            },
            Kind::String {
                min_length,
                max_length,
            } => {
                let Value::String(s) = value else {
                    return self.mismatch("string", value, path, issues);
                };
                let len = s.chars().count();
                if let Some(min) = *min_length {
                    if len < min {
                        issues.push(issue_at(
                            format!("String must contain at least {min} character(s)"),
                            path,
                        ));
                    }
                }
                if let Some(max) = *max_length {
                    if len > max {
                        issues.push(issue_at(
                            format!("String must contain at most {max} character(s)"),
                            path,
                        ));
                    }
                }
                Some(value.clone())
            }
            Kind::Integer { minimum, maximum } => {
                let Some(n) = value.as_f64() else {
                    return self.mismatch("integer", value, path, issues);
                };
                if !(value.is_i64() || value.is_u64()) && n.fract() != 0.0 {
                    let message = self
                        .type_message
                        .clone()
                        .unwrap_or_else(|| "Expected integer, received float".to_string());
                    issues.push(issue_at(message, path));
                    return None;
                }
                check_range(n, *minimum, *maximum, path, issues);
                Some(value.clone())
            }
            Kind::Number { minimum, maximum } => {
                let Some(n) = value.as_f64() else {
                    return self.mismatch("number", value, path, issues);
                };
                check_range(n, *minimum, *maximum, path, issues);
                Some(value.clone())
            }
            Kind::Literal(expected) => {
                if value == expected {
                    Some(value.clone())
                } else {
                    let message = self
                        .type_message
                        .clone()
                        .unwrap_or_else(|| format!("Invalid literal value, expected {expected}"));
                    issues.push(issue_at(message, path));
                    None
                }
            }
            Kind::Array {
                items,
                min_items,
                max_items,
            } => {
                let Value::Array(elements) = value else {
                    return self.mismatch("array", value, path, issues);
                };
                if let Some(min) = *min_items {
                    if elements.len() < min {
                        issues.push(issue_at(
                            format!("Array must contain at least {min} element(s)"),
                            path,
                        ));
                    }
                }
                if let Some(max) = *max_items {
                    if elements.len() > max {
                        issues.push(issue_at(
                            format!("Array must contain at most {max} element(s)"),
                            path,
                        ));
                    }
                }
                let mut parsed = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    match items.check(Some(element), path, issues) {
                        Checked::Value(item) => parsed.push(item),
                        Checked::Absent => parsed.push(Value::Null),
                        Checked::Failed => {}
                    }
                    path.pop();
                }
                Some(Value::Array(parsed))
            }
            Kind::Object { fields, strict } => {
                let Value::Object(entries) = value else {
                    return self.mismatch("object", value, path, issues);
                };
                let mut parsed = Map::new();
                for (key, schema) in fields {
                    path.push(PathSegment::Key(key.clone()));
                    if let Checked::Value(field) = schema.check(entries.get(key), path, issues) {
                        parsed.insert(key.clone(), field);
                    }
                    path.pop();
                }
                if *strict {
                    for key in entries.keys() {
                        if !fields.iter().any(|(known, _)| known == key) {
                            issues.push(issue_at(format!("Unrecognized key: \"{key}\""), path));
                        }
                    }
                }
                Some(Value::Object(parsed))
            }
        }
    }

    fn mismatch(
        &self,
        expected: &str,
        received: &Value,
        path: &[PathSegment],
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        let message = self.type_message.clone().unwrap_or_else(|| {
            format!("Expected {expected}, received {}", type_name(received))
        });
        issues.push(issue_at(message, path));
        None
    }
}

impl Schema for ValueSchema {
    type Input = Value;
    type Output = Value;

    fn validate(&self, input: Value) -> BoxFuture<'_, ValidationOutcome<Value>> {
        Box::pin(std::future::ready(self.parse(&input)))
    }

    fn accepts_absent(&self) -> bool {
        self.optional
    }
}

/// A [`ValueSchema`] whose input is optional by type.
///
/// Built with [`ValueSchema::into_optional`]. `null` parses to `null`.
#[derive(Debug, Clone)]
pub struct OptionalValue(ValueSchema);

impl OptionalValue {
    /// The wrapped schema.
    #[must_use]
    pub fn inner(&self) -> &ValueSchema {
        &self.0
    }
}

impl Schema for OptionalValue {
    type Input = Value;
    type Output = Value;
    const OPTIONAL: bool = true;

    fn validate(&self, input: Value) -> BoxFuture<'_, ValidationOutcome<Value>> {
        self.0.validate(input)
    }
}

fn check_range(
    n: f64,
    minimum: Option<f64>,
    maximum: Option<f64>,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) {
    if let Some(min) = minimum {
        if n < min {
            issues.push(issue_at(
                format!("Number must be greater than or equal to {}", display_number(min)),
                path,
            ));
        }
    }
    if let Some(max) = maximum {
        if n > max {
            issues.push(issue_at(
                format!("Number must be less than or equal to {}", display_number(max)),
                path,
            ));
        }
    }
}

fn issue_at(message: impl Into<String>, path: &[PathSegment]) -> Issue {
    if path.is_empty() {
        Issue::new(message)
    } else {
        Issue::at(message, path.iter().cloned())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
