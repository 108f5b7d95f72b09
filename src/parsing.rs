//! Scoped parsing configuration.
//!
//! Compiling a map shorthand into an `Object` consults a few settings: the
//! default polarity of unmarked fields, the policy for fields nobody declared,
//! whether failing optional fields are dropped, and whether containers report
//! every failure. Those settings live on a stack of [`ParsingConfig`]s. The
//! bottom entry is the all-permissive default and is never popped; entering a
//! scope pushes a copy of the current top with [`ParsingOptions`] applied.
//!
//! The stack is process-wide: a scope entered on one thread is seen by schemas
//! compiled on any thread while it lasts. Scopes are meant for setup code.
//! Callers that enter scopes from several threads at once must serialize those
//! changes themselves; interleaved scopes may observe each other.
//!
//! ```rust
//! use shapecheck::{parse, parsing, ParsingOptions, Validator};
//! use serde_json::json;
//!
//! let strict = parsing(ParsingOptions::new().required_properties(true), || {
//!     parse(json!({"name": "string"}))
//! })
//! .unwrap();
//!
//! assert!(!strict.is_valid(&json!({})));
//!
//! // outside the scope the default polarity is back to optional
//! let lax = parse(json!({"name": "string"})).unwrap();
//! assert!(lax.is_valid(&json!({})));
//! ```

use std::fmt;

use parking_lot::RwLock;

use crate::validators::ValidatorRef;

/// What an `Object` does with fields it does not declare.
#[derive(Clone, Default)]
pub enum AdditionalProperties {
    /// Pass them through unchanged.
    #[default]
    Allow,
    /// Reject the object, listing every undeclared field.
    Deny,
    /// Drop them from the adapted output; accept them when only validating.
    RemoveOnAdapt,
    /// Validate (and adapt) them against a validator, like declared fields.
    ValidateAgainst(ValidatorRef),
}

impl fmt::Debug for AdditionalProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdditionalProperties::Allow => f.write_str("Allow"),
            AdditionalProperties::Deny => f.write_str("Deny"),
            AdditionalProperties::RemoveOnAdapt => f.write_str("RemoveOnAdapt"),
            AdditionalProperties::ValidateAgainst(v) => {
                write!(f, "ValidateAgainst({})", v.humanized_name())
            }
        }
    }
}

impl From<bool> for AdditionalProperties {
    /// `true` allows undeclared fields, `false` denies them.
    fn from(allow: bool) -> Self {
        if allow {
            AdditionalProperties::Allow
        } else {
            AdditionalProperties::Deny
        }
    }
}

impl From<ValidatorRef> for AdditionalProperties {
    fn from(validator: ValidatorRef) -> Self {
        AdditionalProperties::ValidateAgainst(validator)
    }
}

/// The settings in effect while compiling.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfig {
    /// Whether unmarked map keys are required (`true`) or optional (`false`).
    pub required_properties: bool,
    /// Policy for fields an `Object` does not declare.
    pub additional_properties: AdditionalProperties,
    /// Drop failing optional fields from the output instead of rejecting.
    pub ignore_optional_property_errors: bool,
    /// Make containers report every failure instead of the first.
    pub full_errors: bool,
}

/// Overrides applied on top of the current [`ParsingConfig`].
///
/// Unset options inherit from the enclosing scope.
#[derive(Debug, Clone, Default)]
pub struct ParsingOptions {
    required_properties: Option<bool>,
    additional_properties: Option<AdditionalProperties>,
    ignore_optional_property_errors: Option<bool>,
    full_errors: Option<bool>,
}

impl ParsingOptions {
    /// Creates an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default polarity of unmarked map keys.
    pub fn required_properties(mut self, required: bool) -> Self {
        self.required_properties = Some(required);
        self
    }

    /// Sets the policy for undeclared fields.
    ///
    /// Accepts an [`AdditionalProperties`], a `bool` (`false` denies) or a
    /// [`ValidatorRef`].
    pub fn additional_properties(mut self, policy: impl Into<AdditionalProperties>) -> Self {
        self.additional_properties = Some(policy.into());
        self
    }

    /// Sets whether failing optional fields are dropped.
    pub fn ignore_optional_property_errors(mut self, ignore: bool) -> Self {
        self.ignore_optional_property_errors = Some(ignore);
        self
    }

    /// Sets whether containers report every failure.
    pub fn full_errors(mut self, full: bool) -> Self {
        self.full_errors = Some(full);
        self
    }

    /// Returns `base` with these overrides applied.
    pub fn apply(&self, base: &ParsingConfig) -> ParsingConfig {
        ParsingConfig {
            required_properties: self
                .required_properties
                .unwrap_or(base.required_properties),
            additional_properties: self
                .additional_properties
                .clone()
                .unwrap_or_else(|| base.additional_properties.clone()),
            ignore_optional_property_errors: self
                .ignore_optional_property_errors
                .unwrap_or(base.ignore_optional_property_errors),
            full_errors: self.full_errors.unwrap_or(base.full_errors),
        }
    }
}

/// A stack of configurations; the implicit bottom entry is the default.
struct ScopeStack {
    entries: RwLock<Vec<ParsingConfig>>,
}

impl ScopeStack {
    const fn new() -> Self {
        Self {
            entries: parking_lot::const_rwlock(Vec::new()),
        }
    }

    fn current(&self) -> ParsingConfig {
        self.entries.read().last().cloned().unwrap_or_default()
    }

    fn enter(&'static self, options: ParsingOptions) -> ParsingScope {
        let mut entries = self.entries.write();
        let config = options.apply(&entries.last().cloned().unwrap_or_default());
        tracing::debug!(?config, "entering parsing scope");
        entries.push(config);
        ParsingScope {
            stack: self,
            depth: entries.len(),
        }
    }
}

static STACK: ScopeStack = ScopeStack::new();

/// Returns the configuration currently in effect.
pub fn current() -> ParsingConfig {
    STACK.current()
}

/// An entered parsing scope; leaving it restores the previous configuration.
///
/// The previous configuration is restored when the guard drops, including
/// during unwinding.
///
/// ```rust
/// use shapecheck::{parse, ParsingOptions, ParsingScope, Validator};
/// use serde_json::json;
///
/// let validator = {
///     let _scope = ParsingScope::enter(ParsingOptions::new().additional_properties(false));
///     parse(json!({"name": "string"})).unwrap()
/// };
///
/// assert!(!validator.is_valid(&json!({"name": "x", "extra": 1})));
/// ```
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct ParsingScope {
    stack: &'static ScopeStack,
    depth: usize,
}

impl ParsingScope {
    /// Pushes the current configuration with `options` applied.
    pub fn enter(options: ParsingOptions) -> Self {
        STACK.enter(options)
    }
}

impl Drop for ParsingScope {
    fn drop(&mut self) {
        // also discards scopes nested inside this one that were leaked
        self.stack.entries.write().truncate(self.depth - 1);
        tracing::debug!(depth = self.depth, "left parsing scope");
    }
}

/// Runs `f` with `options` applied to the current configuration.
pub fn parsing<R>(options: ParsingOptions, f: impl FnOnce() -> R) -> R {
    let _scope = ParsingScope::enter(options);
    f()
}
