//! Object validation.
//!
//! This module provides [`Object`] for validating JSON objects with named
//! required and optional fields, plus a policy for everything else.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{Error, SchemaError};
use crate::parsing::{self, AdditionalProperties, ParsingConfig};
use crate::registry::Registry;
use crate::schema::Schema;

use super::traits::{must_be, quoted_list, Failures, Validator, ValidatorRef};

/// A declared field.
#[derive(Clone)]
struct Field {
    validator: ValidatorRef,
    required: bool,
}

/// A validator for JSON objects with named fields.
///
/// Validation runs in a fixed order:
/// 1. the value must be an object
/// 2. every missing required field is listed in one error, before any field
///    value is looked at
/// 3. under [`AdditionalProperties::Deny`] every undeclared field is listed in
///    one error
/// 4. declared fields are validated in declaration order, failures located at
///    the field name; failing optional fields are dropped instead when
///    `ignore_optional_errors` is set
/// 5. undeclared fields are handled by the additional-properties policy
/// 6. when adapting, missing fields whose validator has a default get it
///
/// Without `full_errors` the first failing step or field stops validation.
///
/// # Example
///
/// ```rust
/// use shapecheck::Validator;
/// use shapecheck::validators::Object;
/// use serde_json::json;
///
/// let user = Object::builder()
///     .required("name", "string")
///     .optional("age", "integer")
///     .build()
///     .unwrap();
///
/// assert!(user.is_valid(&json!({"name": "Alice", "age": 30})));
///
/// let err = user.validate(&json!({"age": 30}), false).unwrap_err();
/// assert_eq!(err.first().unwrap().reason, r#"missing required properties: ["name"]"#);
///
/// let err = user.validate(&json!({"name": "Alice", "age": "old"}), false).unwrap_err();
/// assert_eq!(err.first().unwrap().path.to_string(), "age");
/// ```
#[derive(Clone)]
pub struct Object {
    fields: IndexMap<String, Field>,
    additional: AdditionalProperties,
    ignore_optional_errors: bool,
    full_errors: bool,
}

impl Object {
    /// Creates an object validator with no declared fields.
    ///
    /// Settings come from the current parsing scope.
    pub fn new() -> Self {
        Self::with_config(Vec::new(), &parsing::current())
    }

    /// Starts building an object validator from field schemas.
    pub fn builder() -> ObjectBuilder {
        ObjectBuilder::default()
    }

    /// Creates an object from compiled fields `(name, validator, required)`.
    pub(crate) fn with_config(
        fields: Vec<(String, ValidatorRef, bool)>,
        config: &ParsingConfig,
    ) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, validator, required)| (name, Field { validator, required }))
                .collect(),
            additional: config.additional_properties.clone(),
            ignore_optional_errors: config.ignore_optional_property_errors,
            full_errors: config.full_errors,
        }
    }

    /// Returns the declared field names, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// True if `name` is declared and required.
    pub fn is_required(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|f| f.required)
    }

    fn missing_required<'v>(&'v self, present: &Map<String, Value>) -> Vec<&'v str> {
        self.fields
            .iter()
            .filter(|(name, field)| field.required && !present.contains_key(name.as_str()))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    fn undeclared<'v>(&self, present: &'v Map<String, Value>) -> Vec<&'v str> {
        present
            .keys()
            .filter(|name| !self.fields.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for Object {
    fn validate<'a>(&self, value: &'a Value, adapt: bool) -> Result<Cow<'a, Value>, Error> {
        let present = value
            .as_object()
            .ok_or_else(|| must_be(&self.humanized_name(), value))?;

        let mut failures = Failures::new(self.full_errors);

        let missing = self.missing_required(present);
        if !missing.is_empty() {
            failures.record(Error::invalid(
                format!("missing required properties: {}", quoted_list(missing)),
                value,
            ))?;
        }

        if matches!(self.additional, AdditionalProperties::Deny) {
            let undeclared = self.undeclared(present);
            if !undeclared.is_empty() {
                failures.record(Error::invalid(
                    format!("additional properties not allowed: {}", quoted_list(undeclared)),
                    value,
                ))?;
            }
        }

        let mut out = Output::new(adapt);

        for (name, field) in &self.fields {
            match present.get(name) {
                Some(field_value) => match field.validator.validate(field_value, adapt) {
                    Ok(checked) => out.keep(name, checked),
                    Err(e) if !field.required && self.ignore_optional_errors && !e.is_fatal() => {
                        tracing::debug!(field = %name, "dropping invalid optional property");
                        out.skip();
                    }
                    Err(e) => failures.record(e.at_field(name))?,
                },
                None if adapt => {
                    if let Some(default) = field.validator.default_value() {
                        out.keep(name, Cow::Owned(default));
                    }
                }
                None => {}
            }
        }

        for (name, field_value) in present {
            if self.fields.contains_key(name) {
                continue;
            }
            match &self.additional {
                AdditionalProperties::Allow | AdditionalProperties::Deny => {
                    out.keep(name, Cow::Borrowed(field_value))
                }
                AdditionalProperties::RemoveOnAdapt => out.skip(),
                AdditionalProperties::ValidateAgainst(validator) => {
                    match validator.validate(field_value, adapt) {
                        Ok(checked) => out.keep(name, checked),
                        Err(e) => failures.record(e.at_field(name))?,
                    }
                }
            }
        }

        failures.finish()?;
        Ok(out.finish(value))
    }

    fn humanized_name(&self) -> String {
        "object".to_string()
    }
}

/// The adapted fields of an object, collected only when adapting. Fields are
/// held as borrowed where possible and copied only if something changed.
struct Output<'n, 'a> {
    fields: Option<Vec<(&'n str, Cow<'a, Value>)>>,
    changed: bool,
}

impl<'n, 'a> Output<'n, 'a> {
    fn new(adapt: bool) -> Self {
        Self {
            fields: adapt.then(Vec::new),
            changed: false,
        }
    }

    fn keep(&mut self, name: &'n str, value: Cow<'a, Value>) {
        if let Some(fields) = self.fields.as_mut() {
            self.changed |= matches!(value, Cow::Owned(_));
            fields.push((name, value));
        }
    }

    fn skip(&mut self) {
        self.changed = true;
    }

    fn finish(self, original: &'a Value) -> Cow<'a, Value> {
        match self.fields {
            Some(fields) if self.changed => Cow::Owned(Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value.into_owned()))
                    .collect(),
            )),
            _ => Cow::Borrowed(original),
        }
    }
}

/// Builder for [`Object`].
///
/// Field schemas are compiled by [`ObjectBuilder::build`] (against the global
/// registry) or [`ObjectBuilder::build_with`]. Settings that are not given
/// explicitly are taken from the parsing scope active at build time.
#[derive(Default)]
pub struct ObjectBuilder {
    fields: Vec<(String, Schema, bool)>,
    additional: Option<AdditionalProperties>,
    ignore_optional_errors: Option<bool>,
    full_errors: Option<bool>,
}

impl ObjectBuilder {
    /// Declares a required field.
    pub fn required(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.fields.push((name.into(), schema.into(), true));
        self
    }

    /// Declares an optional field.
    pub fn optional(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.fields.push((name.into(), schema.into(), false));
        self
    }

    /// Sets the policy for undeclared fields.
    pub fn additional(mut self, policy: impl Into<AdditionalProperties>) -> Self {
        self.additional = Some(policy.into());
        self
    }

    /// Sets whether failing optional fields are dropped instead of rejected.
    pub fn ignore_optional_errors(mut self, ignore: bool) -> Self {
        self.ignore_optional_errors = Some(ignore);
        self
    }

    /// Sets whether every failure is reported.
    pub fn full_errors(mut self, full: bool) -> Self {
        self.full_errors = Some(full);
        self
    }

    /// Compiles the field schemas against the global registry.
    pub fn build(self) -> Result<Object, SchemaError> {
        self.build_with(Registry::global())
    }

    /// Compiles the field schemas against `registry`.
    pub fn build_with(self, registry: &Registry) -> Result<Object, SchemaError> {
        let scope = parsing::current();
        let config = ParsingConfig {
            additional_properties: self.additional.unwrap_or(scope.additional_properties),
            ignore_optional_property_errors: self
                .ignore_optional_errors
                .unwrap_or(scope.ignore_optional_property_errors),
            full_errors: self.full_errors.unwrap_or(scope.full_errors),
            required_properties: scope.required_properties,
        };

        let fields = self
            .fields
            .into_iter()
            .map(|(name, schema, required)| Ok((name, registry.parse(schema)?, required)))
            .collect::<Result<Vec<_>, SchemaError>>()?;

        Ok(Object::with_config(fields, &config))
    }
}
