//! Error types.
//!
//! Three kinds of failure are kept apart:
//! - [`ValidationErrors`]: the input value does not conform (bad data)
//! - [`AdaptError`]: a conversion inside an adaptor failed in a way the node
//!   was not told to trap (broken adaptor code, fatal)
//! - [`SchemaError`]: the schema itself is malformed (compile time only)

mod schema_error;
mod validation_error;

use std::fmt;

use serde_json::Value;

pub use schema_error::SchemaError;
pub use validation_error::{ValidationError, ValidationErrors};

use crate::path::PathSegment;

/// The error returned by [`crate::Validator::validate`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The value was rejected.
    #[error(transparent)]
    Invalid(ValidationErrors),

    /// An adaptor or predicate failed with a kind it does not trap.
    #[error("untrapped adaptor failure: {0}")]
    Adaptor(AdaptError),
}

impl Error {
    /// Shorthand for a single rejection of `value`.
    pub fn invalid(reason: impl Into<String>, value: &Value) -> Self {
        Error::Invalid(ValidationErrors::single(ValidationError::new(
            reason,
            value.clone(),
        )))
    }

    /// Prepends `segment` to every validation error; fatal failures pass through.
    pub fn at(self, segment: PathSegment) -> Self {
        match self {
            Error::Invalid(errors) => Error::Invalid(errors.at(segment)),
            fatal @ Error::Adaptor(_) => fatal,
        }
    }

    /// Prepends a field segment.
    pub fn at_field(self, name: &str) -> Self {
        self.at(PathSegment::field(name))
    }

    /// Prepends an index segment.
    pub fn at_index(self, index: usize) -> Self {
        self.at(PathSegment::Index(index))
    }

    /// Prepends a mapping key segment.
    pub fn at_key(self, key: &str) -> Self {
        self.at(PathSegment::key(key))
    }

    /// Returns the validation errors, if this is a rejection.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Error::Invalid(errors) => Some(errors),
            Error::Adaptor(_) => None,
        }
    }

    /// Returns the first validation error, if this is a rejection.
    pub fn first(&self) -> Option<&ValidationError> {
        self.validation_errors().map(ValidationErrors::first)
    }

    /// True for untrapped adaptor failures.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Adaptor(_))
    }
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        Error::Invalid(ValidationErrors::single(error))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Invalid(errors)
    }
}

/// Category of a conversion failure.
///
/// Adaptor nodes declare which categories they trap; a trapped failure
/// becomes a [`ValidationError`], any other one surfaces as [`Error::Adaptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The value has a type the conversion cannot handle at all.
    Type,
    /// The value has the right type but unusable contents (e.g. `"12b"`).
    Value,
    /// The converted value does not fit the target representation.
    Overflow,
    /// A caller-defined category.
    Custom(&'static str),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Type => f.write_str("type"),
            FailureKind::Value => f.write_str("value"),
            FailureKind::Overflow => f.write_str("overflow"),
            FailureKind::Custom(name) => f.write_str(name),
        }
    }
}

/// A failure raised by an adaptor function or a predicate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct AdaptError {
    /// The failure category, matched against a node's [`Traps`].
    pub kind: FailureKind,
    /// Human-readable message; becomes the validation reason when trapped.
    pub message: String,
}

impl AdaptError {
    /// Creates a failure of the given kind.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a [`FailureKind::Type`] failure.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Type, message)
    }

    /// Creates a [`FailureKind::Value`] failure.
    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Value, message)
    }
}

/// The set of failure kinds a node converts into validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Traps {
    /// Every failure is trapped.
    #[default]
    All,
    /// No failure is trapped; all of them are fatal.
    Nothing,
    /// Only the listed kinds are trapped.
    Only(Vec<FailureKind>),
}

impl Traps {
    /// Traps exactly the given kinds.
    pub fn only(kinds: impl IntoIterator<Item = FailureKind>) -> Self {
        Traps::Only(kinds.into_iter().collect())
    }

    /// True if `kind` is trapped.
    pub fn contains(&self, kind: FailureKind) -> bool {
        match self {
            Traps::All => true,
            Traps::Nothing => false,
            Traps::Only(kinds) => kinds.contains(&kind),
        }
    }

    /// Applies the trap set: trapped failures become a rejection of `value`,
    /// everything else becomes fatal.
    pub(crate) fn classify(&self, failure: AdaptError, value: &Value) -> Error {
        if self.contains(failure.kind) {
            Error::invalid(failure.message, value)
        } else {
            Error::Adaptor(failure)
        }
    }
}
