//! Adaptor nodes.
//!
//! [`AdaptBy`] runs a caller-supplied conversion; [`AdaptTo`] converts to a
//! JSON type with [`crate::convert::coerce`]. Both consult their [`Traps`] to
//! decide whether a failed conversion is bad data or a broken adaptor.

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::Value;

use crate::convert;
use crate::error::{AdaptError, Error, Traps};
use crate::schema::JsonType;

use super::traits::Validator;

/// A conversion function used by [`AdaptBy`].
pub type AdaptFn = Arc<dyn Fn(&Value) -> Result<Value, AdaptError> + Send + Sync>;

/// Adapts every value with a function.
///
/// # Example
///
/// ```rust
/// use shapecheck::{AdaptError, FailureKind, Traps, Validator};
/// use shapecheck::validators::AdaptBy;
/// use serde_json::{json, Value};
///
/// let hex = AdaptBy::new(|v: &Value| {
///     let s = v.as_str().ok_or_else(|| AdaptError::type_error("expected text"))?;
///     i64::from_str_radix(s, 16)
///         .map(Value::from)
///         .map_err(|e| AdaptError::value_error(e.to_string()))
/// })
/// .traps(Traps::only([FailureKind::Value]));
///
/// assert_eq!(hex.adapt(&json!("ff")).unwrap(), json!(255));
/// assert!(!hex.is_valid(&json!("zz")));
/// assert!(hex.validate(&json!(12), true).unwrap_err().is_fatal());
/// ```
#[derive(Clone)]
pub struct AdaptBy {
    adaptor: AdaptFn,
    traps: Traps,
    name: String,
}

impl AdaptBy {
    /// Creates an adaptor trapping every failure kind.
    pub fn new<F>(adaptor: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, AdaptError> + Send + Sync + 'static,
    {
        Self {
            adaptor: Arc::new(adaptor),
            traps: Traps::All,
            name: "adaptable value".to_string(),
        }
    }

    /// Sets which failure kinds become validation errors.
    pub fn traps(mut self, traps: Traps) -> Self {
        self.traps = traps;
        self
    }

    /// Sets the name used in error reasons.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Validator for AdaptBy {
    fn validate<'a>(&self, value: &'a Value, _adapt: bool) -> Result<Cow<'a, Value>, Error> {
        (self.adaptor)(value)
            .map(Cow::Owned)
            .map_err(|failure| self.traps.classify(failure, value))
    }

    fn humanized_name(&self) -> String {
        self.name.clone()
    }
}

/// Adapts values to a JSON type, leaving values already of that type alone.
///
/// With `exact` set, only a value whose concrete kind equals the target is
/// left alone; otherwise `Number` also admits integers and floats.
///
/// # Example
///
/// ```rust
/// use shapecheck::{JsonType, Validator};
/// use shapecheck::validators::AdaptTo;
/// use serde_json::json;
///
/// let to_int = AdaptTo::new(JsonType::Integer);
///
/// assert_eq!(to_int.adapt(&json!("42")).unwrap(), json!(42));
/// assert_eq!(to_int.adapt(&json!(4.7)).unwrap(), json!(4));
///
/// let err = to_int.validate(&json!("4x"), true).unwrap_err();
/// assert_eq!(err.first().unwrap().reason, r#"invalid literal for integer: "4x""#);
/// ```
#[derive(Debug, Clone)]
pub struct AdaptTo {
    target: JsonType,
    traps: Traps,
    exact: bool,
}

impl AdaptTo {
    /// Creates a non-exact adaptor trapping every failure kind.
    pub fn new(target: JsonType) -> Self {
        Self {
            target,
            traps: Traps::All,
            exact: false,
        }
    }

    /// Sets which failure kinds become validation errors.
    pub fn traps(mut self, traps: Traps) -> Self {
        self.traps = traps;
        self
    }

    /// Requires an exact kind match to skip conversion.
    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    fn already_adapted(&self, value: &Value) -> bool {
        if self.exact {
            JsonType::of(value) == self.target
        } else {
            self.target.contains(value)
        }
    }
}

impl Validator for AdaptTo {
    fn validate<'a>(&self, value: &'a Value, _adapt: bool) -> Result<Cow<'a, Value>, Error> {
        if self.already_adapted(value) {
            return Ok(Cow::Borrowed(value));
        }
        convert::coerce(self.target, value)
            .map(Cow::Owned)
            .map_err(|failure| self.traps.classify(failure, value))
    }

    fn humanized_name(&self) -> String {
        self.target.name().to_string()
    }
}
