//! Schema shorthand.
//!
//! A [`Schema`] is the compact, declarative description handed to
//! [`crate::parse`]. It is consumed at compile time and discarded once a
//! validator tree exists.
//!
//! ```rust
//! use shapecheck::{parse, JsonType, Schema};
//! use serde_json::json;
//!
//! // the same shorthand, written two ways
//! let typed = Schema::map([
//!     ("+name", Schema::from("string")),
//!     ("tags", Schema::seq([Schema::from("string")])),
//!     ("score", Schema::from(JsonType::Number)),
//! ]);
//! let from_json = Schema::from(json!({
//!     "+name": "string",
//!     "tags": ["string"],
//!     "score": "number"
//! }));
//!
//! let value = json!({"name": "x", "tags": ["a"], "score": 1.5});
//! assert!(parse(typed).unwrap().is_valid(&value));
//! assert!(parse(from_json).unwrap().is_valid(&value));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::error::AdaptError;
use crate::validators::ValidatorRef;

/// A fallible predicate over a value, used by [`Schema::Predicate`] and
/// [`crate::validators::Condition`].
pub type PredicateFn = Arc<dyn Fn(&Value) -> Result<bool, AdaptError> + Send + Sync>;

/// Shorthand description of the expected shape of a value.
#[derive(Clone)]
pub enum Schema {
    /// An already-built validator, returned as is.
    Validator(ValidatorRef),
    /// A name: a registered shortcut, or text a factory understands (`"?integer"`).
    Name(String),
    /// A regular expression: the value must be a string matching it.
    Pattern(Regex),
    /// A type: the value must be of that JSON type.
    Type(JsonType),
    /// A sequence: one element means "array of", otherwise a fixed-arity tuple.
    Seq(Vec<Schema>),
    /// A map of field name (optionally prefixed by `+` or `?`) to field schema.
    Map(Vec<(String, Schema)>),
    /// A named predicate; compiled into a `Condition`.
    Predicate(String, PredicateFn),
    /// A scalar that no built-in rule understands; left for factories.
    Literal(Value),
    /// An arbitrary caller-defined shape; left for factories.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Schema {
    /// Creates a sequence shorthand.
    pub fn seq(items: impl IntoIterator<Item = Schema>) -> Self {
        Schema::Seq(items.into_iter().collect())
    }

    /// Creates a map shorthand from `(key, schema)` pairs, keeping their order.
    pub fn map<K, S>(fields: impl IntoIterator<Item = (K, S)>) -> Self
    where
        K: Into<String>,
        S: Into<Schema>,
    {
        Schema::Map(
            fields
                .into_iter()
                .map(|(k, s)| (k.into(), s.into()))
                .collect(),
        )
    }

    /// Creates a pattern shorthand from regex source.
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Schema::Pattern)
    }

    /// Creates a named predicate shorthand from an infallible function.
    pub fn predicate<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Schema::Predicate(name.into(), Arc::new(move |v| Ok(predicate(v))))
    }

    /// Wraps an arbitrary value for a registered factory to interpret.
    pub fn custom<T: Any + Send + Sync>(shape: T) -> Self {
        Schema::Custom(Arc::new(shape))
    }

    /// Returns the custom shape if it has type `T`.
    pub fn downcast_custom<T: Any>(&self) -> Option<&T> {
        match self {
            Schema::Custom(shape) => shape.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Validator(v) => write!(f, "<validator {}>", v.humanized_name()),
            Schema::Name(name) => write!(f, "{:?}", name),
            Schema::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Schema::Type(t) => write!(f, "<type {}>", t),
            Schema::Seq(items) => f.debug_list().entries(items).finish(),
            Schema::Map(fields) => f
                .debug_map()
                .entries(fields.iter().map(|(k, v)| (k, v)))
                .finish(),
            Schema::Predicate(name, _) => write!(f, "<predicate {}>", name),
            Schema::Literal(value) => write!(f, "{}", value),
            Schema::Custom(_) => f.write_str("<custom shape>"),
        }
    }
}

impl From<&str> for Schema {
    fn from(name: &str) -> Self {
        Schema::Name(name.to_string())
    }
}

impl From<String> for Schema {
    fn from(name: String) -> Self {
        Schema::Name(name)
    }
}

impl From<Regex> for Schema {
    fn from(re: Regex) -> Self {
        Schema::Pattern(re)
    }
}

impl From<JsonType> for Schema {
    fn from(t: JsonType) -> Self {
        Schema::Type(t)
    }
}

impl From<ValidatorRef> for Schema {
    fn from(v: ValidatorRef) -> Self {
        Schema::Validator(v)
    }
}

impl From<Vec<Schema>> for Schema {
    fn from(items: Vec<Schema>) -> Self {
        Schema::Seq(items)
    }
}

impl From<&Value> for Schema {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(name) => Schema::Name(name.clone()),
            Value::Array(items) => Schema::Seq(items.iter().map(Schema::from).collect()),
            Value::Object(fields) => Schema::Map(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Schema::from(v)))
                    .collect(),
            ),
            scalar => Schema::Literal(scalar.clone()),
        }
    }
}

impl From<Value> for Schema {
    fn from(value: Value) -> Self {
        Schema::from(&value)
    }
}

/// The JSON type of a value, as understood by `Type` and `AdaptTo` nodes.
///
/// `Integer` and `Float` are concrete kinds; `Number` covers both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    Null,
    Boolean,
    Integer,
    Float,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    /// The concrete kind of `value` (never `Number`).
    pub fn of(value: &Value) -> JsonType {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(n) if n.is_f64() => JsonType::Float,
            Value::Number(_) => JsonType::Integer,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    /// True if `value` is of this type, `Number` admitting both numeric kinds.
    pub fn contains(self, value: &Value) -> bool {
        let kind = JsonType::of(value);
        kind == self
            || (self == JsonType::Number && matches!(kind, JsonType::Integer | JsonType::Float))
    }

    /// The lowercase JSON name of this type.
    pub fn name(self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Float => "float",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
