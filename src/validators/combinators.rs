//! Combinator validators.
//!
//! Nodes built from other validators:
//!
//! - [`Nullable`] / [`NonNullable`]: accept or reject `null` around an inner node
//! - [`Range`]: bound the (possibly adapted) output of an inner node
//! - [`AnyOf`]: first branch that accepts wins
//! - [`AllOf`]: every branch must accept the original value
//! - [`ChainOf`]: feed each node's output into the next
//! - [`Not`]: accept what the inner node rejects

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value;

use crate::error::{Error, SchemaError};

use super::traits::{must_be, Validator, ValidatorRef};

/// Accepts `null` in addition to whatever the inner validator accepts.
///
/// `null` becomes the default, if one is set. Inside an [`Object`], a missing
/// field whose validator is a `Nullable` with a default is filled in with it
/// when adapting.
///
/// [`Object`]: super::Object
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use shapecheck::Validator;
/// use shapecheck::validators::{Nullable, Type};
/// use serde_json::json;
///
/// let port = Nullable::with_default(Arc::new(Type::integer()), json!(8080));
///
/// assert_eq!(port.adapt(&json!(null)).unwrap(), json!(8080));
/// assert_eq!(port.adapt(&json!(5)).unwrap(), json!(5));
/// assert!(!port.is_valid(&json!("5")));
/// assert_eq!(port.humanized_name(), "integer or null");
/// ```
#[derive(Clone)]
pub struct Nullable {
    inner: ValidatorRef,
    default: Option<Value>,
}

impl Nullable {
    /// Wraps `inner`; `null` is returned as is.
    pub fn new(inner: ValidatorRef) -> Self {
        Self {
            inner: unwrap_nullability(inner),
            default: None,
        }
    }

    /// Wraps `inner`; `null` is replaced by `default`.
    pub fn with_default(inner: ValidatorRef, default: Value) -> Self {
        Self {
            default: Some(default),
            ..Self::new(inner)
        }
    }
}

impl Validator for Nullable {
    fn validate<'a>(&self, value: &'a Value, adapt: bool) -> Result<Cow<'a, Value>, Error> {
        if !value.is_null() {
            return self.inner.validate(value, adapt);
        }
        Ok(match &self.default {
            Some(default) => Cow::Owned(default.clone()),
            None => Cow::Borrowed(value),
        })
    }

    fn humanized_name(&self) -> String {
        format!("{} or null", self.inner.humanized_name())
    }

    fn default_value(&self) -> Option<Value> {
        self.default.clone()
    }

    fn nullability_inner(&self) -> Option<ValidatorRef> {
        Some(self.inner.clone())
    }
}

/// Rejects `null`, then defers to the inner validator if there is one.
#[derive(Clone, Default)]
pub struct NonNullable {
    inner: Option<ValidatorRef>,
}

impl NonNullable {
    /// Accepts anything but `null`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts what `inner` accepts, except `null`.
    pub fn of(inner: ValidatorRef) -> Self {
        Self {
            inner: Some(unwrap_nullability(inner)),
        }
    }
}

impl Validator for NonNullable {
    fn validate<'a>(&self, value: &'a Value, adapt: bool) -> Result<Cow<'a, Value>, Error> {
        if value.is_null() {
            return Err(must_be(&self.humanized_name(), value));
        }
        match &self.inner {
            Some(inner) => inner.validate(value, adapt),
            None => Ok(Cow::Borrowed(value)),
        }
    }

    fn humanized_name(&self) -> String {
        match &self.inner {
            Some(inner) => inner.humanized_name(),
            None => "non null".to_string(),
        }
    }

    fn nullability_inner(&self) -> Option<ValidatorRef> {
        self.inner.clone()
    }
}

/// `Nullable(Nullable(x))` and friends collapse to a single wrapper around `x`.
fn unwrap_nullability(inner: ValidatorRef) -> ValidatorRef {
    inner.nullability_inner().unwrap_or(inner)
}

/// Bounds the output of an inner validator.
///
/// Bounds are numbers (compared numerically) or strings (compared
/// lexicographically). A value that cannot be compared with a bound is
/// rejected.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use shapecheck::{JsonType, Validator};
/// use shapecheck::validators::{AdaptTo, Range};
/// use serde_json::json;
///
/// let percent = Range::new(Arc::new(AdaptTo::new(JsonType::Integer)), Some(json!(0)), Some(json!(100))).unwrap();
///
/// assert_eq!(percent.adapt(&json!("42")).unwrap(), json!(42));
///
/// let err = percent.validate(&json!("142"), true).unwrap_err();
/// assert_eq!(err.first().unwrap().reason, "must not be larger than 100");
/// ```
#[derive(Clone)]
pub struct Range {
    inner: ValidatorRef,
    min: Option<Value>,
    max: Option<Value>,
}

impl Range {
    /// Creates a range; fails if a bound is not a number or string, or if the
    /// bounds are incomparable or inverted.
    pub fn new(
        inner: ValidatorRef,
        min: Option<Value>,
        max: Option<Value>,
    ) -> Result<Self, SchemaError> {
        for bound in min.iter().chain(max.iter()) {
            if !(bound.is_number() || bound.is_string()) {
                return Err(SchemaError::InvalidArgument(format!(
                    "range bound must be a number or string, got {}",
                    bound
                )));
            }
        }
        if let (Some(lo), Some(hi)) = (&min, &max) {
            match compare(lo, hi) {
                Some(Ordering::Greater) => {
                    return Err(SchemaError::InvalidArgument(format!(
                        "range minimum {} is larger than maximum {}",
                        lo, hi
                    )))
                }
                None => {
                    return Err(SchemaError::InvalidArgument(format!(
                        "range bounds {} and {} are not comparable",
                        lo, hi
                    )))
                }
                _ => {}
            }
        }
        Ok(Self { inner, min, max })
    }
}

impl Validator for Range {
    fn validate<'a>(&self, value: &'a Value, adapt: bool) -> Result<Cow<'a, Value>, Error> {
        let checked = self.inner.validate(value, adapt)?;

        if let Some(min) = &self.min {
            match compare(&checked, min) {
                None => return Err(not_comparable(&checked, min)),
                Some(Ordering::Less) => {
                    return Err(Error::invalid(
                        format!("must not be less than {}", min),
                        &checked,
                    ))
                }
                _ => {}
            }
        }
        if let Some(max) = &self.max {
            match compare(&checked, max) {
                None => return Err(not_comparable(&checked, max)),
                Some(Ordering::Greater) => {
                    return Err(Error::invalid(
                        format!("must not be larger than {}", max),
                        &checked,
                    ))
                }
                _ => {}
            }
        }
        Ok(checked)
    }

    fn humanized_name(&self) -> String {
        self.inner.humanized_name()
    }
}

fn not_comparable(value: &Value, bound: &Value) -> Error {
    Error::invalid(format!("must be comparable to {}", bound), value)
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Accepts values accepted by at least one branch; the first accepting
/// branch produces the output.
///
/// When every branch rejects, the reason joins the branch reasons with `or`.
///
/// ```rust
/// use shapecheck::{parse, Schema, Validator};
/// use shapecheck::validators::AnyOf;
/// use serde_json::json;
///
/// let id = AnyOf::new(vec![parse("integer").unwrap(), parse("string").unwrap()]);
///
/// assert!(id.is_valid(&json!(5)));
/// assert!(id.is_valid(&json!("x")));
///
/// let err = id.validate(&json!(5.5), false).unwrap_err();
/// assert_eq!(err.first().unwrap().reason, "must be integer or must be string");
/// ```
#[derive(Clone)]
pub struct AnyOf {
    branches: Vec<ValidatorRef>,
}

impl AnyOf {
    /// Creates the combinator from its branches, tried in order.
    pub fn new(branches: Vec<ValidatorRef>) -> Self {
        Self { branches }
    }
}

impl Validator for AnyOf {
    fn validate<'a>(&self, value: &'a Value, adapt: bool) -> Result<Cow<'a, Value>, Error> {
        let mut reasons = Vec::with_capacity(self.branches.len());
        for branch in &self.branches {
            match branch.validate(value, adapt) {
                Ok(accepted) => return Ok(accepted),
                Err(Error::Invalid(errors)) => reasons.push(errors.first().reason.clone()),
                Err(fatal) => return Err(fatal),
            }
        }
        Err(Error::invalid(reasons.join(" or "), value))
    }

    fn humanized_name(&self) -> String {
        let names: Vec<_> = self.branches.iter().map(|b| b.humanized_name()).collect();
        names.join(" or ")
    }
}

/// Accepts values accepted by every branch.
///
/// Each branch sees the original value; the output is the last branch's.
#[derive(Clone)]
pub struct AllOf {
    branches: Vec<ValidatorRef>,
}

impl AllOf {
    /// Creates the combinator from its branches, checked in order.
    pub fn new(branches: Vec<ValidatorRef>) -> Self {
        Self { branches }
    }
}

impl Validator for AllOf {
    fn validate<'a>(&self, value: &'a Value, adapt: bool) -> Result<Cow<'a, Value>, Error> {
        let mut last = Cow::Borrowed(value);
        for branch in &self.branches {
            last = branch.validate(value, adapt)?;
        }
        Ok(last)
    }

    fn humanized_name(&self) -> String {
        let names: Vec<_> = self.branches.iter().map(|b| b.humanized_name()).collect();
        names.join(" and ")
    }
}

/// Passes a value through a pipeline; each stage gets the previous output.
///
/// ```rust
/// use std::sync::Arc;
/// use shapecheck::{JsonType, Validator, ValidatorRef};
/// use shapecheck::validators::{AdaptTo, ChainOf, Condition};
/// use serde_json::json;
///
/// let positive_int = ChainOf::new(vec![
///     Arc::new(AdaptTo::new(JsonType::Integer)) as ValidatorRef,
///     Arc::new(Condition::new("positive", |v| v.as_i64().is_some_and(|n| n > 0))),
/// ]);
///
/// assert_eq!(positive_int.adapt(&json!("7")).unwrap(), json!(7));
/// assert!(!positive_int.is_valid(&json!("-7")));
/// ```
#[derive(Clone)]
pub struct ChainOf {
    stages: Vec<ValidatorRef>,
}

impl ChainOf {
    /// Creates the pipeline from its stages, applied in order.
    pub fn new(stages: Vec<ValidatorRef>) -> Self {
        Self { stages }
    }
}

impl Validator for ChainOf {
    fn validate<'a>(&self, value: &'a Value, adapt: bool) -> Result<Cow<'a, Value>, Error> {
        let mut current = Cow::Borrowed(value);
        for stage in &self.stages {
            current = match current {
                Cow::Borrowed(v) => stage.validate(v, adapt)?,
                Cow::Owned(v) => Cow::Owned(stage.validate(&v, adapt)?.into_owned()),
            };
        }
        Ok(current)
    }

    fn humanized_name(&self) -> String {
        self.stages
            .last()
            .map(|s| s.humanized_name())
            .unwrap_or_else(|| "anything".to_string())
    }
}

/// Accepts exactly the values the inner validator rejects.
///
/// The value is returned unchanged. Fatal failures of the inner validator
/// are not turned into acceptance.
#[derive(Clone)]
pub struct Not {
    inner: ValidatorRef,
}

impl Not {
    /// Negates `inner`.
    pub fn new(inner: ValidatorRef) -> Self {
        Self { inner }
    }
}

impl Validator for Not {
    fn validate<'a>(&self, value: &'a Value, _adapt: bool) -> Result<Cow<'a, Value>, Error> {
        match self.inner.validate(value, false) {
            Ok(_) => Err(Error::invalid(
                format!("should not be {}", self.inner.humanized_name()),
                value,
            )),
            Err(Error::Invalid(_)) => Ok(Cow::Borrowed(value)),
            Err(fatal) => Err(fatal),
        }
    }

    fn humanized_name(&self) -> String {
        format!("not {}", self.inner.humanized_name())
    }
}
