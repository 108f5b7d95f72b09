//! Configuration errors raised while compiling a schema.

/// A schema could not be turned into a validator.
///
/// These are programmer errors in the schema itself, never caused by the
/// data being validated. They are only produced by [`crate::parse`],
/// [`crate::register`] and validator constructors.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// No resolution rule or factory recognized the shorthand.
    #[error("{0} cannot be parsed as a validator")]
    Unrecognized(String),

    /// A pattern shorthand or `Pattern` constructor got an invalid regex.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A validator constructor got arguments it cannot work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
