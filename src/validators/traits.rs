//! The validator node protocol.
//!
//! This module provides the [`Validator`] trait implemented by every node of
//! a compiled tree. Containers hold their children as [`ValidatorRef`]s and
//! never depend on concrete node types.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use stillwater::prelude::*;

use crate::error::{Error, ValidationErrors};

/// A shared, type-erased validator node.
pub type ValidatorRef = Arc<dyn Validator>;

/// A node that checks values and optionally adapts them.
///
/// The `Send + Sync` bounds allow compiled trees to be shared across threads;
/// nodes hold no mutable state after construction.
///
/// # Example
///
/// ```rust
/// use shapecheck::{parse, Validator};
/// use serde_json::json;
///
/// let validator = parse("?integer").unwrap();
///
/// assert!(validator.is_valid(&json!(5)));
/// assert!(validator.is_valid(&json!(null)));
/// assert!(!validator.is_valid(&json!("5")));
/// ```
pub trait Validator: Send + Sync {
    /// Checks `value` and returns it, adapted when `adapt` is true.
    ///
    /// Nodes return `Cow::Borrowed(value)` when the value comes back
    /// unchanged. `adapt` is a hint: a node with cheap adaptation may always
    /// adapt, a node with expensive adaptation skips it when `adapt` is false.
    fn validate<'a>(&self, value: &'a Value, adapt: bool) -> Result<Cow<'a, Value>, Error>;

    /// Human-friendly name used in `must be ...` reasons.
    fn humanized_name(&self) -> String;

    /// Validates and adapts `value`, returning an owned result.
    fn adapt(&self, value: &Value) -> Result<Value, Error> {
        self.validate(value, true).map(Cow::into_owned)
    }

    /// Reports whether `value` is valid without adapting it.
    ///
    /// Never returns an error. An untrapped adaptor failure counts as invalid
    /// and is logged at `warn`.
    fn is_valid(&self, value: &Value) -> bool {
        match self.validate(value, false) {
            Ok(_) => true,
            Err(Error::Invalid(_)) => false,
            Err(Error::Adaptor(failure)) => {
                tracing::warn!(
                    validator = %self.humanized_name(),
                    kind = %failure.kind,
                    "untrapped adaptor failure treated as invalid: {}",
                    failure.message
                );
                false
            }
        }
    }

    /// The value an object field takes when it is missing from the input.
    fn default_value(&self) -> Option<Value> {
        None
    }

    /// For `Nullable`/`NonNullable` wrappers, the wrapped validator.
    ///
    /// Lets wrappers collapse instead of nesting (`Nullable("+integer")`).
    fn nullability_inner(&self) -> Option<ValidatorRef> {
        None
    }
}

impl fmt::Debug for dyn Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<validator {}>", self.humanized_name())
    }
}

/// Collects child failures inside a container.
///
/// Without `full_errors` the first rejection stops the container. With it,
/// rejections are combined and reported together by [`Failures::finish`].
/// Fatal failures always stop immediately.
pub(crate) struct Failures {
    full_errors: bool,
    errors: Option<ValidationErrors>,
}

impl Failures {
    pub(crate) fn new(full_errors: bool) -> Self {
        Self {
            full_errors,
            errors: None,
        }
    }

    /// Records `error`, returning it back when the container must stop now.
    pub(crate) fn record(&mut self, error: Error) -> Result<(), Error> {
        match error {
            Error::Invalid(errors) if self.full_errors => {
                self.errors = Some(match self.errors.take() {
                    Some(acc) => acc.combine(errors),
                    None => errors,
                });
                Ok(())
            }
            other => Err(other),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_clean(&self) -> bool {
        self.errors.is_none()
    }

    pub(crate) fn finish(self) -> Result<(), Error> {
        match self.errors {
            Some(errors) => Err(Error::Invalid(errors)),
            None => Ok(()),
        }
    }
}

/// The standard `must be <name>` rejection.
pub(crate) fn must_be(name: &str, value: &Value) -> Error {
    Error::invalid(format!("must be {}", name), value)
}

/// Joins names as `a, b or c`.
pub(crate) fn join_or(names: &[String]) -> String {
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

/// Renders a list of names as `["a", "b"]`.
pub(crate) fn quoted_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<_> = names
        .into_iter()
        .map(|n| Value::String(n.to_string()).to_string())
        .collect();
    format!("[{}]", quoted.join(", "))
}
