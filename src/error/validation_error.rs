//! Validation error types.
//!
//! This module provides [`ValidationError`] for a single rejected value and
//! [`ValidationErrors`] for one or more of them.

use std::fmt::{self, Display};

use serde_json::Value;
use stillwater::prelude::*;

use crate::path::{JsonPath, PathSegment};

/// A single validation failure.
///
/// `ValidationError` captures:
/// - **reason**: human-readable description of the failure (`must be integer`)
/// - **value**: the offending value, when one applies
/// - **path**: where the value sits relative to the validated root
///
/// The path starts empty and grows outward: each container the error passes
/// through prepends its own segment.
///
/// # Example
///
/// ```rust
/// use shapecheck::ValidationError;
/// use serde_json::json;
///
/// let error = ValidationError::new("must be integer", json!("x"))
///     .at_index(1)
///     .at_field("b")
///     .at_field("a");
///
/// assert_eq!(error.path.to_string(), "a.b[1]");
/// assert_eq!(error.to_string(), r#"Invalid value "x": must be integer (at a.b[1])"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Human-readable reason for the rejection.
    pub reason: String,
    /// The value that was rejected.
    pub value: Option<Value>,
    /// The path from the validated root to the rejected value.
    pub path: JsonPath,
}

impl ValidationError {
    /// Creates an error for `value` with an empty path.
    pub fn new(reason: impl Into<String>, value: Value) -> Self {
        Self {
            reason: reason.into(),
            value: Some(value),
            path: JsonPath::root(),
        }
    }

    /// Creates an error that is not tied to a specific value.
    pub fn without_value(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            value: None,
            path: JsonPath::root(),
        }
    }

    /// Prepends a path segment.
    pub fn at(mut self, segment: PathSegment) -> Self {
        self.path = self.path.prepend(segment);
        self
    }

    /// Prepends a field segment.
    pub fn at_field(self, name: impl Into<String>) -> Self {
        self.at(PathSegment::Field(name.into()))
    }

    /// Prepends an index segment.
    pub fn at_index(self, index: usize) -> Self {
        self.at(PathSegment::Index(index))
    }

    /// Prepends a mapping key segment.
    pub fn at_key(self, key: impl Into<String>) -> Self {
        self.at(PathSegment::Key(key.into()))
    }

    /// Renders the error using `repr` to format the offending value.
    ///
    /// `Display` uses compact JSON; pass another formatter to change how
    /// values appear (e.g. pretty-printed or truncated).
    pub fn render_with<F>(&self, repr: F) -> String
    where
        F: Fn(&Value) -> String,
    {
        let mut out = match &self.value {
            Some(value) => format!("Invalid value {}: {}", repr(value), self.reason),
            None => self.reason.clone(),
        };
        if !self.path.is_root() {
            out.push_str(&format!(" (at {})", self.path));
        }
        out
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with(|v| v.to_string()))
    }
}

impl std::error::Error for ValidationError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};

/// A non-empty collection of validation errors.
///
/// Validators stop at the first failure unless the `full_errors` parsing
/// option is set, so this usually holds exactly one error. Under
/// `full_errors` containers keep going and combine every failure.
///
/// ```rust
/// use shapecheck::{ValidationError, ValidationErrors};
/// use stillwater::prelude::*;
///
/// let a = ValidationErrors::single(ValidationError::without_value("first").at_field("a"));
/// let b = ValidationErrors::single(ValidationError::without_value("second").at_field("b"));
///
/// let combined = a.combine(b);
/// assert_eq!(combined.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(NonEmptyVec<ValidationError>);

impl ValidationErrors {
    /// Creates a collection containing a single error.
    pub fn single(error: ValidationError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a collection from a `Vec`, or `None` if it is empty.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the first error.
    pub fn first(&self) -> &ValidationError {
        self.0.head()
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Returns all errors located at `path`.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Converts this collection into a `Vec`.
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0.into_vec()
    }

    /// Prepends `segment` to the path of every contained error.
    pub fn at(self, segment: PathSegment) -> Self {
        let head = Self::single(self.first().clone().at(segment.clone()));
        self.into_iter()
            .skip(1)
            .fold(head, |acc, e| acc.combine(Self::single(e.at(segment.clone()))))
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

impl Semigroup for ValidationErrors {
    fn combine(self, other: Self) -> Self {
        ValidationErrors(self.0.combine(other.0))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len() == 1 {
            return write!(f, "{}", self.first());
        }
        for (i, error) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "- {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationErrors>();
    assert_sync::<ValidationErrors>();
};
