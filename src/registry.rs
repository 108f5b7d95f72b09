//! Schema compiler and registry.
//!
//! This module provides the [`Registry`] type that turns [`Schema`] shorthand
//! into validator trees. A registry holds two tables:
//! - named validators, returned as shared instances when a shorthand name
//!   matches exactly
//! - factories, consulted (most recently registered first) for shorthand no
//!   built-in rule understands
//!
//! The free functions [`parse`], [`register`] and [`register_factory`] work on
//! the process-wide [`Registry::global`].

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::error::SchemaError;
use crate::parsing::{self, ParsingOptions};
use crate::schema::Schema;
use crate::validators::{
    Condition, HeterogeneousSequence, HomogeneousSequence, Mapping, NonNullable, Nullable, Object,
    Pattern, StringValidator, Temporal, Type, ValidatorRef,
};

/// A function that may build a validator from shorthand no built-in rule
/// understands.
///
/// Returns `None` to pass, `Some(Ok(_))` to claim the shorthand, or
/// `Some(Err(_))` to claim it and fail compilation. The registry is passed in
/// so factories can compile nested shorthand against the same tables.
pub type Factory =
    Arc<dyn Fn(&Schema, &Registry) -> Option<Result<ValidatorRef, SchemaError>> + Send + Sync>;

/// Type alias for the named validator storage.
type NameMap = Arc<RwLock<HashMap<String, ValidatorRef>>>;

/// Type alias for the factory list, most recently registered first.
type FactoryList = Arc<RwLock<Vec<Factory>>>;

/// A thread-safe table of named validators and factories.
///
/// # Resolution order
///
/// [`Registry::parse`] resolves shorthand in a fixed order:
/// 1. an already-built validator is returned as is
/// 2. a name registered in this registry returns the shared instance
/// 3. a regex becomes a `Pattern`
/// 4. a [`JsonType`](crate::JsonType) becomes a `Type`
/// 5. a one-element sequence becomes a `HomogeneousSequence` of that element
/// 6. any other sequence becomes a `HeterogeneousSequence`
/// 7. a map becomes an `Object`: `+key` is required, `?key` is optional, and
///    unmarked keys follow the parsing scope's default
/// 8. factories are tried, most recently registered first
/// 9. otherwise compilation fails with [`SchemaError::Unrecognized`]
///
/// [`Registry::new`] comes with the names `boolean`, `integer`, `number`,
/// `string`, `null`, `array` and `object`, and with factories for `"?name"`
/// (nullable), `"+name"` (non-nullable) and named predicates.
///
/// # Thread Safety
///
/// Both tables sit behind `RwLock`s. No lock is held while a factory runs, so
/// factories may call back into the registry.
///
/// # Example
///
/// ```rust
/// use shapecheck::{Registry, Validator};
/// use serde_json::json;
///
/// let registry = Registry::new();
/// registry.register("name", json!({"+first": "string", "last": "?string"})).unwrap();
///
/// let people = registry.parse(json!(["name"])).unwrap();
/// assert!(people.is_valid(&json!([{"first": "Ada", "last": null}])));
///
/// let err = people.validate(&json!([{"first": 1}]), false).unwrap_err();
/// assert_eq!(err.first().unwrap().path.to_string(), "[0].first");
/// ```
pub struct Registry {
    names: NameMap,
    factories: FactoryList,
}

impl Registry {
    /// Creates a registry with the built-in names and factories.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.install_builtins();
        registry
    }

    /// Creates a registry with no names and no factories.
    ///
    /// Only the structural rules (validators, regexes, types, sequences and
    /// maps) apply until something is registered.
    pub fn empty() -> Self {
        Self {
            names: Arc::new(RwLock::new(HashMap::new())),
            factories: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Returns the process-wide registry used by the free functions.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    fn install_builtins(&self) {
        let builtins: [(&str, ValidatorRef); 10] = [
            ("boolean", Arc::new(Type::boolean())),
            ("integer", Arc::new(Type::integer())),
            ("number", Arc::new(Type::number())),
            ("string", Arc::new(StringValidator::new())),
            ("null", Arc::new(Type::null())),
            ("array", Arc::new(HomogeneousSequence::any())),
            ("object", Arc::new(Mapping::new())),
            ("date", Arc::new(Temporal::date())),
            ("datetime", Arc::new(Temporal::datetime())),
            ("time", Arc::new(Temporal::time())),
        ];
        self.names.write().extend(
            builtins
                .into_iter()
                .map(|(name, validator)| (name.to_string(), validator)),
        );

        self.register_factory(predicate_factory);
        self.register_factory(non_nullable_factory);
        self.register_factory(nullable_factory);
    }

    /// Compiles shorthand into a validator.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if any part of the shorthand is not
    /// recognized or a factory rejects it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shapecheck::{Registry, Schema, SchemaError};
    /// use serde_json::json;
    ///
    /// let registry = Registry::new();
    /// assert!(registry.parse(json!({"ids": ["integer"]})).is_ok());
    ///
    /// let err = registry.parse("nonsense").unwrap_err();
    /// assert!(matches!(err, SchemaError::Unrecognized(_)));
    /// ```
    pub fn parse(&self, schema: impl Into<Schema>) -> Result<ValidatorRef, SchemaError> {
        self.resolve(schema.into()).inspect_err(|e| {
            tracing::debug!(error = %e, "schema compilation failed");
        })
    }

    fn resolve(&self, schema: Schema) -> Result<ValidatorRef, SchemaError> {
        if let Schema::Name(name) = &schema {
            if let Some(validator) = self.get(name) {
                return Ok(validator);
            }
        }

        match schema {
            Schema::Validator(validator) => Ok(validator),
            Schema::Pattern(regex) => Ok(Arc::new(Pattern::from_regex(regex))),
            Schema::Type(json_type) => Ok(Arc::new(Type::new([json_type]))),
            Schema::Seq(items) => match <[Schema; 1]>::try_from(items) {
                Ok([item]) => Ok(Arc::new(HomogeneousSequence::of(self.resolve(item)?))),
                Err(items) => {
                    let items = items
                        .into_iter()
                        .map(|item| self.resolve(item))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Arc::new(HeterogeneousSequence::new(items)))
                }
            },
            Schema::Map(fields) => self.resolve_object(fields),
            other => self.resolve_with_factories(other),
        }
    }

    fn resolve_object(&self, fields: Vec<(String, Schema)>) -> Result<ValidatorRef, SchemaError> {
        let config = parsing::current();
        let fields = fields
            .into_iter()
            .map(|(key, schema)| {
                let (name, required) = if let Some(name) = key.strip_prefix('+') {
                    (name, true)
                } else if let Some(name) = key.strip_prefix('?') {
                    (name, false)
                } else {
                    (key.as_str(), config.required_properties)
                };
                Ok((name.to_string(), self.resolve(schema)?, required))
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;
        Ok(Arc::new(Object::with_config(fields, &config)))
    }

    fn resolve_with_factories(&self, schema: Schema) -> Result<ValidatorRef, SchemaError> {
        // cloned so that factories can register or parse without deadlocking
        let factories = self.factories.read().clone();
        factories
            .iter()
            .find_map(|factory| factory(&schema, self))
            .unwrap_or_else(|| Err(SchemaError::Unrecognized(format!("{:?}", schema))))
    }

    /// Compiles `schema` and binds it to `name`, replacing any previous binding.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if `schema` cannot be compiled; the previous
    /// binding, if any, is kept.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shapecheck::{Registry, Validator};
    /// use serde_json::json;
    ///
    /// let registry = Registry::new();
    /// registry.register("id", "integer").unwrap();
    /// registry.register("id", "string").unwrap();
    ///
    /// assert!(registry.parse("id").unwrap().is_valid(&json!("abc")));
    /// ```
    pub fn register(&self, name: impl Into<String>, schema: impl Into<Schema>) -> Result<(), SchemaError> {
        let name = name.into();
        let validator = self.parse(schema)?;
        let replaced = self.names.write().insert(name.clone(), validator).is_some();
        tracing::debug!(%name, replaced, "registered validator");
        Ok(())
    }

    /// Adds a factory, tried before every previously registered one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use shapecheck::{Registry, Schema, Validator, ValidatorRef};
    /// use shapecheck::validators::Enum;
    /// use serde_json::json;
    ///
    /// let registry = Registry::new();
    /// // `"a|b|c"` means one of the listed strings
    /// registry.register_factory(|schema: &Schema, _: &Registry| match schema {
    ///     Schema::Name(name) if name.contains('|') => {
    ///         let choices = name.split('|').map(|s| json!(s));
    ///         Some(Ok(Arc::new(Enum::new(choices)) as ValidatorRef))
    ///     }
    ///     _ => None,
    /// });
    ///
    /// let color = registry.parse("red|green|blue").unwrap();
    /// assert!(color.is_valid(&json!("green")));
    /// assert!(!color.is_valid(&json!("pink")));
    /// ```
    pub fn register_factory<F>(&self, factory: F)
    where
        F: Fn(&Schema, &Registry) -> Option<Result<ValidatorRef, SchemaError>> + Send + Sync + 'static,
    {
        let mut factories = self.factories.write();
        factories.insert(0, Arc::new(factory));
        tracing::debug!(count = factories.len(), "registered validator factory");
    }

    /// Retrieves a named validator.
    pub fn get(&self, name: &str) -> Option<ValidatorRef> {
        self.names.read().get(name).cloned()
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.names.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Registry {
    /// Clones share the same tables.
    fn clone(&self) -> Self {
        Self {
            names: Arc::clone(&self.names),
            factories: Arc::clone(&self.factories),
        }
    }
}

fn nullable_factory(schema: &Schema, registry: &Registry) -> Option<Result<ValidatorRef, SchemaError>> {
    let Schema::Name(name) = schema else {
        return None;
    };
    let inner = name.strip_prefix('?')?;
    Some(
        registry
            .parse(inner)
            .map(|v| Arc::new(Nullable::new(v)) as ValidatorRef),
    )
}

fn non_nullable_factory(
    schema: &Schema,
    registry: &Registry,
) -> Option<Result<ValidatorRef, SchemaError>> {
    let Schema::Name(name) = schema else {
        return None;
    };
    let inner = name.strip_prefix('+')?;
    Some(
        registry
            .parse(inner)
            .map(|v| Arc::new(NonNullable::of(v)) as ValidatorRef),
    )
}

fn predicate_factory(schema: &Schema, _: &Registry) -> Option<Result<ValidatorRef, SchemaError>> {
    match schema {
        Schema::Predicate(name, predicate) => Some(Ok(Arc::new(Condition::from_fn(
            name.clone(),
            Arc::clone(predicate),
        )))),
        _ => None,
    }
}

/// Compiles shorthand against the global registry.
///
/// # Example
///
/// ```rust
/// use shapecheck::{parse, Validator};
/// use serde_json::json;
///
/// let validator = parse(json!({"a": {"b": ["integer"]}})).unwrap();
///
/// let err = validator.validate(&json!({"a": {"b": [1, "x"]}}), false).unwrap_err();
/// assert_eq!(err.first().unwrap().path.to_string(), "a.b[1]");
/// ```
pub fn parse(schema: impl Into<Schema>) -> Result<ValidatorRef, SchemaError> {
    Registry::global().parse(schema)
}

/// Compiles shorthand against the global registry inside a parsing scope.
pub fn parse_with(
    schema: impl Into<Schema>,
    options: ParsingOptions,
) -> Result<ValidatorRef, SchemaError> {
    parsing::parsing(options, || parse(schema))
}

/// Binds a name in the global registry.
pub fn register(name: impl Into<String>, schema: impl Into<Schema>) -> Result<(), SchemaError> {
    Registry::global().register(name, schema)
}

/// Adds a factory to the global registry.
pub fn register_factory<F>(factory: F)
where
    F: Fn(&Schema, &Registry) -> Option<Result<ValidatorRef, SchemaError>> + Send + Sync + 'static,
{
    Registry::global().register_factory(factory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::Validator;
    use crate::JsonType;
    use regex::Regex;
    use serde_json::json;

    #[test]
    fn test_builtin_names() {
        let registry = Registry::new();
        assert_eq!(
            registry.names(),
            vec![
                "array", "boolean", "date", "datetime", "integer", "null", "number", "object",
                "string", "time"
            ]
        );
        assert!(registry.parse("integer").unwrap().is_valid(&json!(1)));
        assert!(registry.parse("object").unwrap().is_valid(&json!({})));
        assert!(registry.parse("array").unwrap().is_valid(&json!([1, "a"])));
    }

    #[test]
    fn test_names_are_shared_instances() {
        let registry = Registry::new();
        let a = registry.parse("integer").unwrap();
        let b = registry.parse("integer").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_validator_returned_as_is() {
        let registry = Registry::new();
        let v: ValidatorRef = Arc::new(Type::integer());
        let parsed = registry.parse(Arc::clone(&v)).unwrap();
        assert!(Arc::ptr_eq(&v, &parsed));
    }

    #[test]
    fn test_empty_registry_has_only_structural_rules() {
        let registry = Registry::empty();
        assert!(registry.parse("integer").is_err());
        assert!(registry.parse(JsonType::Integer).is_ok());
        assert!(registry.parse(Regex::new("a+").unwrap()).is_ok());
    }

    #[test]
    fn test_pattern_and_type_shorthand() {
        let registry = Registry::new();
        let pattern = registry.parse(Regex::new(r"\d+$").unwrap()).unwrap();
        assert!(pattern.is_valid(&json!("123")));
        assert!(!pattern.is_valid(&json!("12a")));

        let float = registry.parse(JsonType::Float).unwrap();
        assert!(float.is_valid(&json!(1.5)));
        assert!(!float.is_valid(&json!(1)));
    }

    #[test]
    fn test_sequence_shorthand() {
        let registry = Registry::new();
        let list = registry.parse(json!(["integer"])).unwrap();
        assert!(list.is_valid(&json!([1, 2, 3])));
        assert!(list.is_valid(&json!([])));

        let tuple = registry.parse(json!(["integer", "string"])).unwrap();
        assert!(tuple.is_valid(&json!([1, "a"])));
        assert!(!tuple.is_valid(&json!([1])));

        let empty = registry.parse(json!([])).unwrap();
        assert!(empty.is_valid(&json!([])));
        assert!(!empty.is_valid(&json!([1])));
    }

    #[test]
    fn test_map_markers() {
        let registry = Registry::new();
        let v = registry.parse(json!({"+a": "integer", "?b": "integer", "c": "integer"})).unwrap();
        assert!(v.is_valid(&json!({"a": 1})));
        assert!(!v.is_valid(&json!({"b": 1, "c": 1})));
    }

    #[test]
    fn test_nullable_and_non_nullable_shorthand() {
        let registry = Registry::new();
        let nullable = registry.parse("?integer").unwrap();
        assert!(nullable.is_valid(&json!(null)));
        assert!(nullable.is_valid(&json!(5)));
        assert!(!nullable.is_valid(&json!("5")));

        let non_nullable = registry.parse("+integer").unwrap();
        assert!(!non_nullable.is_valid(&json!(null)));
        assert!(non_nullable.is_valid(&json!(5)));

        assert!(matches!(registry.parse("?bogus"), Err(SchemaError::Unrecognized(_))));
    }

    #[test]
    fn test_predicate_shorthand() {
        let registry = Registry::new();
        let even = registry
            .parse(Schema::predicate("even", |v| v.as_i64().is_some_and(|n| n % 2 == 0)))
            .unwrap();
        assert!(even.is_valid(&json!(4)));
        let err = even.validate(&json!(3), false).unwrap_err();
        assert_eq!(err.first().unwrap().reason, "must satisfy predicate even");
    }

    #[test]
    fn test_unrecognized_shorthand() {
        let registry = Registry::new();
        let err = registry.parse(json!(3)).unwrap_err();
        assert_eq!(err.to_string(), "3 cannot be parsed as a validator");
        assert!(registry.parse(Schema::custom(42u8)).is_err());
    }

    #[test]
    fn test_nested_failure_fails_whole_parse() {
        let registry = Registry::new();
        assert!(registry.parse(json!({"a": ["nope"]})).is_err());
    }

    #[test]
    fn test_register_replaces() {
        let registry = Registry::new();
        registry.register("id", "integer").unwrap();
        registry.register("id", "string").unwrap();
        let id = registry.parse("id").unwrap();
        assert!(id.is_valid(&json!("x")));
        assert!(!id.is_valid(&json!(1)));
    }

    #[test]
    fn test_failed_register_keeps_previous() {
        let registry = Registry::new();
        registry.register("id", "integer").unwrap();
        assert!(registry.register("id", "bogus").is_err());
        assert!(registry.parse("id").unwrap().is_valid(&json!(1)));
    }

    #[test]
    fn test_clones_share_tables() {
        let registry = Registry::new();
        let clone = registry.clone();
        clone.register("shared", "boolean").unwrap();
        assert!(registry.get("shared").is_some());
    }

    #[test]
    fn test_factory_may_reenter_registry() {
        let registry = Registry::new();
        registry.register_factory(|schema: &Schema, registry: &Registry| match schema {
            Schema::Name(name) if name.starts_with("list-of-") => {
                Some(registry.parse(Schema::seq([Schema::from(&name["list-of-".len()..])])))
            }
            _ => None,
        });
        let v = registry.parse("list-of-integer").unwrap();
        assert!(v.is_valid(&json!([1, 2])));
        assert!(!v.is_valid(&json!(["a"])));
    }
}
