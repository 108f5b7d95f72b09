//! Function-boundary validation.
//!
//! [`Accepts`] compiles a `{parameter: schema}` map once and checks (or
//! adapts) named arguments before a call goes through. Failures are located
//! at the parameter name.

use serde_json::Value;

use crate::error::{Error, SchemaError};
use crate::registry::Registry;
use crate::schema::Schema;
use crate::validators::ValidatorRef;

/// Validated named arguments.
///
/// The parameter map follows the usual map shorthand: `+name` is required,
/// `?name` is optional, unmarked names follow the parsing scope.
///
/// # Example
///
/// ```rust
/// use shapecheck::Accepts;
/// use serde_json::json;
///
/// let create_user = Accepts::new(json!({
///     "+name": "string",
///     "+tags": ["string"],
///     "admin": "boolean"
/// }))
/// .unwrap();
///
/// let greeting = create_user
///     .call(&json!({"name": "Ada", "tags": []}), |args| {
///         format!("hello {}", args["name"].as_str().unwrap_or_default())
///     })
///     .unwrap();
/// assert_eq!(greeting, "hello Ada");
///
/// let err = create_user
///     .check(&json!({"name": "Ada", "tags": [1]}))
///     .unwrap_err();
/// assert_eq!(err.first().unwrap().path.to_string(), "tags[0]");
/// ```
#[derive(Clone)]
pub struct Accepts {
    params: ValidatorRef,
}

impl Accepts {
    /// Compiles the parameter shorthand against the global registry.
    pub fn new(params: impl Into<Schema>) -> Result<Self, SchemaError> {
        Self::with_registry(params, Registry::global())
    }

    /// Compiles the parameter shorthand against `registry`.
    pub fn with_registry(
        params: impl Into<Schema>,
        registry: &Registry,
    ) -> Result<Self, SchemaError> {
        Ok(Self {
            params: registry.parse(params)?,
        })
    }

    /// Checks `args` without adapting them.
    pub fn check(&self, args: &Value) -> Result<(), Error> {
        self.params.validate(args, false).map(|_| ())
    }

    /// Validates and adapts `args`.
    pub fn adapt(&self, args: &Value) -> Result<Value, Error> {
        self.params.adapt(args)
    }

    /// Adapts `args` and, if they are valid, calls `f` with the result.
    pub fn call<R>(&self, args: &Value, f: impl FnOnce(Value) -> R) -> Result<R, Error> {
        let adapted = self.adapt(args)?;
        Ok(f(adapted))
    }

    /// Returns the compiled parameter validator.
    pub fn validator(&self) -> &ValidatorRef {
        &self.params
    }
}
