//! Primitive validators.
//!
//! Leaf nodes that check scalar categories: [`Type`] membership (with the
//! `boolean`, `integer`, `number` and `null` presets), [`StringValidator`],
//! [`Pattern`], [`Enum`] and [`Condition`].

use std::borrow::Cow;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::error::{AdaptError, Error, SchemaError, Traps};
use crate::schema::{JsonType, PredicateFn};

use super::traits::{join_or, must_be, Validator};

/// Accepts values whose JSON type is in an accept list and not in a reject list.
///
/// The reject list is checked first, so it wins on overlap.
///
/// # Example
///
/// ```rust
/// use shapecheck::{JsonType, Validator};
/// use shapecheck::validators::Type;
/// use serde_json::json;
///
/// let numbers_but_not_floats = Type::new([JsonType::Number]).reject([JsonType::Float]);
///
/// assert!(numbers_but_not_floats.is_valid(&json!(3)));
/// assert!(!numbers_but_not_floats.is_valid(&json!(3.5)));
/// ```
#[derive(Debug, Clone)]
pub struct Type {
    accept: Vec<JsonType>,
    reject: Vec<JsonType>,
    name: Option<String>,
}

impl Type {
    /// Creates a validator accepting any of `accept`.
    pub fn new(accept: impl IntoIterator<Item = JsonType>) -> Self {
        Self {
            accept: accept.into_iter().collect(),
            reject: Vec::new(),
            name: None,
        }
    }

    /// Adds types to reject even when they are accepted.
    pub fn reject(mut self, reject: impl IntoIterator<Item = JsonType>) -> Self {
        self.reject.extend(reject);
        self
    }

    /// Sets the name used in error reasons.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Accepts `true` and `false`.
    pub fn boolean() -> Self {
        Self::new([JsonType::Boolean]).named("boolean")
    }

    /// Accepts integral numbers.
    pub fn integer() -> Self {
        Self::new([JsonType::Integer]).named("integer")
    }

    /// Accepts any number.
    pub fn number() -> Self {
        Self::new([JsonType::Number]).named("number")
    }

    /// Accepts only `null`.
    pub fn null() -> Self {
        Self::new([JsonType::Null]).named("null")
    }

    fn accepts(&self, value: &Value) -> bool {
        !self.reject.iter().any(|t| t.contains(value)) && self.accept.iter().any(|t| t.contains(value))
    }
}

impl Validator for Type {
    fn validate<'a>(&self, value: &'a Value, _adapt: bool) -> Result<Cow<'a, Value>, Error> {
        if self.accepts(value) {
            Ok(Cow::Borrowed(value))
        } else {
            Err(must_be(&self.humanized_name(), value))
        }
    }

    fn humanized_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => {
                let names: Vec<_> = self.accept.iter().map(|t| t.name().to_string()).collect();
                join_or(&names)
            }
        }
    }
}

/// Accepts strings, optionally bounded in length (counted in characters).
#[derive(Debug, Clone, Default)]
pub struct StringValidator {
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl StringValidator {
    /// Creates a validator accepting any string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects strings shorter than `min` characters.
    pub fn min_len(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Rejects strings longer than `max` characters.
    pub fn max_len(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
}

impl Validator for StringValidator {
    fn validate<'a>(&self, value: &'a Value, _adapt: bool) -> Result<Cow<'a, Value>, Error> {
        let s = value
            .as_str()
            .ok_or_else(|| must_be(&self.humanized_name(), value))?;

        let len = s.chars().count();
        if let Some(min) = self.min_length {
            if len < min {
                return Err(Error::invalid(
                    format!("must be at least {} characters long", min),
                    value,
                ));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(Error::invalid(
                    format!("must be at most {} characters long", max),
                    value,
                ));
            }
        }
        Ok(Cow::Borrowed(value))
    }

    fn humanized_name(&self) -> String {
        "string".to_string()
    }
}

/// Accepts strings matching a regular expression at their start.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compiles `source` into a pattern validator.
    pub fn new(source: &str) -> Result<Self, SchemaError> {
        Ok(Self::from_regex(Regex::new(source)?))
    }

    /// Wraps an already compiled regex.
    pub fn from_regex(regex: Regex) -> Self {
        Self { regex }
    }

    /// Anchored at the start only, like a prefix match; add `$` to anchor the end.
    fn matches(&self, s: &str) -> bool {
        self.regex.find(s).is_some_and(|m| m.start() == 0)
    }
}

impl Validator for Pattern {
    fn validate<'a>(&self, value: &'a Value, _adapt: bool) -> Result<Cow<'a, Value>, Error> {
        match value.as_str() {
            None => Err(must_be("string", value)),
            Some(s) if self.matches(s) => Ok(Cow::Borrowed(value)),
            Some(_) => Err(Error::invalid(
                format!("must match {}", self.humanized_name()),
                value,
            )),
        }
    }

    fn humanized_name(&self) -> String {
        format!("pattern {}", self.regex.as_str())
    }
}

/// Accepts only values from a fixed set.
///
/// Numbers compare by numeric value, so `1` and `1.0` are the same member.
#[derive(Debug, Clone)]
pub struct Enum {
    values: Vec<Value>,
    name: Option<String>,
}

impl Enum {
    /// Creates a validator accepting exactly `values`.
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
            name: None,
        }
    }

    /// Sets the name used when the enum is registered as a shortcut.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Validator for Enum {
    fn validate<'a>(&self, value: &'a Value, _adapt: bool) -> Result<Cow<'a, Value>, Error> {
        if self.values.iter().any(|allowed| values_equal(allowed, value)) {
            Ok(Cow::Borrowed(value))
        } else {
            Err(must_be(&self.humanized_name(), value))
        }
    }

    fn humanized_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let rendered: Vec<_> = self.values.iter().map(Value::to_string).collect();
        format!("one of [{}]", rendered.join(", "))
    }
}

/// JSON equality, except that numbers compare numerically.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x == y,
                _ => x.as_f64() == y.as_f64(),
            },
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Accepts values for which a predicate holds.
///
/// A predicate may also fail outright. Failures whose kind is in the node's
/// [`Traps`] are reported as validation errors carrying the failure message;
/// any other failure is returned as [`Error::Adaptor`].
///
/// # Example
///
/// ```rust
/// use shapecheck::Validator;
/// use shapecheck::validators::Condition;
/// use serde_json::json;
///
/// let is_odd = Condition::new("is_odd", |v| v.as_i64().is_some_and(|n| n % 2 == 1));
///
/// assert!(is_odd.is_valid(&json!(3)));
/// let err = is_odd.validate(&json!(4), false).unwrap_err();
/// assert_eq!(err.first().unwrap().reason, "must satisfy predicate is_odd");
/// ```
#[derive(Clone)]
pub struct Condition {
    name: String,
    predicate: PredicateFn,
    traps: Traps,
}

impl Condition {
    /// Creates a condition from an infallible predicate.
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::from_fn(name, Arc::new(move |v| Ok(predicate(v))))
    }

    /// Creates a condition from a predicate that may fail.
    pub fn fallible<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, AdaptError> + Send + Sync + 'static,
    {
        Self::from_fn(name, Arc::new(predicate))
    }

    pub(crate) fn from_fn(name: impl Into<String>, predicate: PredicateFn) -> Self {
        Self {
            name: name.into(),
            predicate,
            traps: Traps::All,
        }
    }

    /// Sets which failure kinds become validation errors.
    pub fn traps(mut self, traps: Traps) -> Self {
        self.traps = traps;
        self
    }
}

impl Validator for Condition {
    fn validate<'a>(&self, value: &'a Value, _adapt: bool) -> Result<Cow<'a, Value>, Error> {
        match (self.predicate)(value) {
            Ok(true) => Ok(Cow::Borrowed(value)),
            Ok(false) => Err(Error::invalid(
                format!("must satisfy predicate {}", self.name),
                value,
            )),
            Err(failure) => Err(self.traps.classify(failure, value)),
        }
    }

    fn humanized_name(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use serde_json::json;

    fn reason(result: Result<Cow<'_, Value>, Error>) -> String {
        result.unwrap_err().first().unwrap().reason.clone()
    }

    #[test]
    fn test_boolean() {
        let v = Type::boolean();
        for valid in [json!(true), json!(false)] {
            assert!(v.is_valid(&valid));
        }
        for invalid in [json!(1), json!(1.1), json!("foo"), json!({}), json!([]), json!(null)] {
            assert!(!v.is_valid(&invalid));
        }
    }

    #[test]
    fn test_integer() {
        let v = Type::integer();
        assert!(v.is_valid(&json!(1)));
        assert!(v.is_valid(&json!(-7)));
        for invalid in [json!(1.1), json!("foo"), json!({}), json!([]), json!(true)] {
            assert!(!v.is_valid(&invalid));
        }
        assert_eq!(reason(v.validate(&json!("x"), true)), "must be integer");
    }

    #[test]
    fn test_number() {
        let v = Type::number();
        assert!(v.is_valid(&json!(1)));
        assert!(v.is_valid(&json!(1.1)));
        for invalid in [json!("foo"), json!({}), json!([]), json!(false)] {
            assert!(!v.is_valid(&invalid));
        }
    }

    #[test]
    fn test_type_reject_wins() {
        let v = Type::new([JsonType::Number, JsonType::String]).reject([JsonType::Integer]);
        assert!(v.is_valid(&json!(1.5)));
        assert!(v.is_valid(&json!("x")));
        assert!(!v.is_valid(&json!(1)));
        assert_eq!(v.humanized_name(), "number or string");
    }

    #[test]
    fn test_type_unnamed_humanized() {
        let v = Type::new([JsonType::Null, JsonType::Boolean, JsonType::Array]);
        assert_eq!(v.humanized_name(), "null, boolean or array");
    }

    #[test]
    fn test_string_lengths() {
        let v = StringValidator::new().min_len(2).max_len(3);
        assert!(v.is_valid(&json!("fo")));
        assert!(v.is_valid(&json!("foo")));
        assert_eq!(
            reason(v.validate(&json!("f"), false)),
            "must be at least 2 characters long"
        );
        assert_eq!(
            reason(v.validate(&json!("fooo"), false)),
            "must be at most 3 characters long"
        );
        assert_eq!(reason(v.validate(&json!(false), false)), "must be string");
    }

    #[test]
    fn test_string_length_counts_chars() {
        let v = StringValidator::new().max_len(2);
        assert!(v.is_valid(&json!("日本")));
    }

    #[test]
    fn test_pattern_matches_at_start() {
        let v = Pattern::new(r"a*$").unwrap();
        assert!(v.is_valid(&json!("aaa")));
        assert!(v.is_valid(&json!("")));
        assert!(!v.is_valid(&json!("aba")));
        assert!(!v.is_valid(&json!("baa")));
        assert!(!v.is_valid(&json!(3)));
        assert_eq!(reason(v.validate(&json!("b"), false)), "must match pattern a*$");
    }

    #[test]
    fn test_pattern_prefix_only() {
        let v = Pattern::new(r"\d{1,4}").unwrap();
        assert!(v.is_valid(&json!("123a")));
        assert!(!v.is_valid(&json!("a123")));
    }

    #[test]
    fn test_invalid_pattern_is_schema_error() {
        assert!(matches!(Pattern::new("("), Err(SchemaError::InvalidPattern(_))));
    }

    #[test]
    fn test_enum() {
        let v = Enum::new([json!(1), json!(2), json!(3)]);
        assert!(v.is_valid(&json!(2)));
        assert!(v.is_valid(&json!(2.0)));
        for invalid in [json!(0), json!(4), json!("1"), json!([1])] {
            assert!(!v.is_valid(&invalid));
        }
        assert_eq!(reason(v.validate(&json!(4), false)), "must be one of [1, 2, 3]");
    }

    #[test]
    fn test_enum_of_objects() {
        let v = Enum::new([json!({"foo": "bar"})]);
        assert!(v.is_valid(&json!({"foo": "bar"})));
        assert!(!v.is_valid(&json!({"foo": "quux"})));
    }

    #[test]
    fn test_named_enum() {
        let v = Enum::new([json!("male"), json!("female")]).named("gender");
        assert_eq!(reason(v.validate(&json!("other"), false)), "must be gender");
    }

    #[test]
    fn test_condition() {
        let is_even = Condition::new("is_even", |v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0));
        for valid in [json!(6), json!(-42), json!(4.0), json!(0)] {
            assert!(is_even.is_valid(&valid));
        }
        for invalid in [json!(1), json!(2.1), json!("2"), json!([])] {
            assert!(!is_even.is_valid(&invalid));
        }
    }

    #[test]
    fn test_condition_trapped_failure_uses_message() {
        let v = Condition::fallible("positive", |v| match v.as_i64() {
            Some(n) => Ok(n > 0),
            None => Err(AdaptError::type_error("not an integer")),
        });
        assert_eq!(reason(v.validate(&json!("x"), false)), "not an integer");
    }

    #[test]
    fn test_condition_untrapped_failure_is_fatal() {
        let v = Condition::fallible("positive", |v| match v.as_i64() {
            Some(n) => Ok(n > 0),
            None => Err(AdaptError::type_error("not an integer")),
        })
        .traps(Traps::only([FailureKind::Value]));

        let err = v.validate(&json!([2, 4]), false).unwrap_err();
        assert!(err.is_fatal());
        assert!(!v.is_valid(&json!([2, 4])));
    }

    #[test]
    fn test_values_equal() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(values_equal(&json!([1, {"a": 2}]), &json!([1.0, {"a": 2.0}])));
        assert!(!values_equal(&json!(true), &json!(1)));
        assert!(!values_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }
}
