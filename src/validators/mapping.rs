//! Key/value mapping validator.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::error::Error;
use crate::parsing;

use super::traits::{must_be, Failures, Validator, ValidatorRef};

/// Accepts objects whose keys and values independently validate.
///
/// Keys are checked as JSON strings. A failing value is reported at its key;
/// a failing key is reported at the same place, with the key itself as the
/// offending value. When a key validator adapts a key into something other
/// than a string, the adapted entry is stored under the key's JSON text.
/// Two keys that adapt to the same key are rejected at the later one.
///
/// Nothing is copied unless adapting changes a key or a value.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use shapecheck::Validator;
/// use shapecheck::validators::{Mapping, Pattern, Type};
/// use serde_json::json;
///
/// let counts = Mapping::new()
///     .keys(Arc::new(Pattern::new("[a-z]+$").unwrap()))
///     .values(Arc::new(Type::integer()));
///
/// assert!(counts.is_valid(&json!({"apples": 3, "pears": 0})));
///
/// let err = counts.validate(&json!({"apples": "3"}), false).unwrap_err();
/// assert_eq!(err.first().unwrap().path.to_string(), "['apples']");
/// ```
#[derive(Clone)]
pub struct Mapping {
    key: Option<ValidatorRef>,
    value: Option<ValidatorRef>,
    full_errors: bool,
}

impl Default for Mapping {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapping {
    /// Creates a validator accepting any object.
    pub fn new() -> Self {
        Self {
            key: None,
            value: None,
            full_errors: parsing::current().full_errors,
        }
    }

    /// Validates every key against `key`.
    pub fn keys(mut self, key: ValidatorRef) -> Self {
        self.key = Some(key);
        self
    }

    /// Validates every value against `value`.
    pub fn values(mut self, value: ValidatorRef) -> Self {
        self.value = Some(value);
        self
    }

    /// Overrides whether every failing entry is reported.
    pub fn full_errors(mut self, full_errors: bool) -> Self {
        self.full_errors = full_errors;
        self
    }
}

impl Validator for Mapping {
    fn validate<'a>(&self, value: &'a Value, adapt: bool) -> Result<Cow<'a, Value>, Error> {
        let entries = value
            .as_object()
            .ok_or_else(|| must_be(&self.humanized_name(), value))?;

        if self.key.is_none() && self.value.is_none() {
            return Ok(Cow::Borrowed(value));
        }

        let mut failures = Failures::new(self.full_errors);
        let mut adapted = Vec::new();
        let mut changed = false;

        for (k, v) in entries {
            let new_value = match &self.value {
                Some(validator) => match validator.validate(v, adapt) {
                    Ok(new_value) => new_value,
                    Err(e) => {
                        failures.record(e.at_key(k))?;
                        continue;
                    }
                },
                None => Cow::Borrowed(v),
            };

            let new_key = match &self.key {
                Some(validator) => match validator.validate(&Value::String(k.clone()), adapt) {
                    Ok(Cow::Owned(key)) => Some(key_text(key)).filter(|key| key != k),
                    Ok(Cow::Borrowed(_)) => None,
                    Err(e) => {
                        failures.record(e.at_key(k))?;
                        continue;
                    }
                },
                None => None,
            };

            if adapt {
                changed |= new_key.is_some() || matches!(new_value, Cow::Owned(_));
                adapted.push((k, new_key, new_value));
            }
        }

        if !changed {
            failures.finish()?;
            return Ok(Cow::Borrowed(value));
        }

        let mut out = Map::new();
        for (k, new_key, new_value) in adapted {
            let key = new_key.unwrap_or_else(|| k.clone());
            if out.contains_key(&key) {
                let reason = format!("adapted key {:?} is not unique", key);
                failures.record(Error::invalid(reason, &Value::String(k.clone())).at_key(k))?;
                continue;
            }
            out.insert(key, new_value.into_owned());
        }

        failures.finish()?;
        Ok(Cow::Owned(Value::Object(out)))
    }

    fn humanized_name(&self) -> String {
        "object".to_string()
    }
}

fn key_text(key: Value) -> String {
    match key {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
