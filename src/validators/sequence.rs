//! Sequence validators.
//!
//! [`HomogeneousSequence`] checks arrays of any length against one item
//! validator; [`HeterogeneousSequence`] checks fixed-arity arrays element by
//! element.

use std::borrow::Cow;

use serde_json::Value;

use crate::error::Error;
use crate::parsing;

use super::traits::{must_be, Failures, Validator, ValidatorRef};

/// Accepts arrays whose elements all validate against one item validator.
///
/// Element `i` failures are reported at index `i`. Adapting produces a new
/// array of the adapted elements in the original order.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use shapecheck::Validator;
/// use shapecheck::validators::{HomogeneousSequence, Type};
/// use serde_json::json;
///
/// let ints = HomogeneousSequence::of(Arc::new(Type::integer())).min_len(1);
///
/// assert!(ints.is_valid(&json!([1, 2, 3])));
/// assert!(!ints.is_valid(&json!([])));
///
/// let err = ints.validate(&json!([1, "x"]), false).unwrap_err();
/// assert_eq!(err.first().unwrap().path.to_string(), "[1]");
/// ```
#[derive(Clone)]
pub struct HomogeneousSequence {
    item: Option<ValidatorRef>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    full_errors: bool,
}

impl HomogeneousSequence {
    /// Creates a validator accepting any array.
    pub fn any() -> Self {
        Self {
            item: None,
            min_length: None,
            max_length: None,
            full_errors: parsing::current().full_errors,
        }
    }

    /// Creates a validator for arrays of `item`.
    pub fn of(item: ValidatorRef) -> Self {
        Self {
            item: Some(item),
            ..Self::any()
        }
    }

    /// Requires at least `min` elements.
    pub fn min_len(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Allows at most `max` elements.
    pub fn max_len(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Overrides whether every failing element is reported.
    pub fn full_errors(mut self, full_errors: bool) -> Self {
        self.full_errors = full_errors;
        self
    }
}

impl Validator for HomogeneousSequence {
    fn validate<'a>(&self, value: &'a Value, adapt: bool) -> Result<Cow<'a, Value>, Error> {
        let items = value
            .as_array()
            .ok_or_else(|| must_be(&self.humanized_name(), value))?;

        if let Some(min) = self.min_length {
            if items.len() < min {
                return Err(Error::invalid(
                    format!("must contain at least {} elements", min),
                    value,
                ));
            }
        }
        if let Some(max) = self.max_length {
            if items.len() > max {
                return Err(Error::invalid(
                    format!("must contain at most {} elements", max),
                    value,
                ));
            }
        }

        match &self.item {
            None => Ok(Cow::Borrowed(value)),
            Some(item) => validate_items(
                value,
                items,
                std::iter::repeat(item),
                adapt,
                self.full_errors,
            ),
        }
    }

    fn humanized_name(&self) -> String {
        "array".to_string()
    }
}

/// Accepts arrays of exactly one element per item validator.
///
/// # Example
///
/// ```rust
/// use shapecheck::{parse, Schema, Validator};
/// use serde_json::json;
///
/// let pair = parse(Schema::seq([Schema::from("string"), Schema::from("integer")])).unwrap();
///
/// assert!(pair.is_valid(&json!(["age", 3])));
///
/// let err = pair.validate(&json!(["age"]), false).unwrap_err();
/// assert_eq!(err.first().unwrap().reason, "2 items expected, 1 found");
/// ```
#[derive(Clone)]
pub struct HeterogeneousSequence {
    items: Vec<ValidatorRef>,
    full_errors: bool,
}

impl HeterogeneousSequence {
    /// Creates a validator checking element `i` against `items[i]`.
    pub fn new(items: Vec<ValidatorRef>) -> Self {
        Self {
            items,
            full_errors: parsing::current().full_errors,
        }
    }

    /// Overrides whether every failing element is reported.
    pub fn full_errors(mut self, full_errors: bool) -> Self {
        self.full_errors = full_errors;
        self
    }
}

impl Validator for HeterogeneousSequence {
    fn validate<'a>(&self, value: &'a Value, adapt: bool) -> Result<Cow<'a, Value>, Error> {
        let items = value
            .as_array()
            .ok_or_else(|| must_be(&self.humanized_name(), value))?;

        if items.len() != self.items.len() {
            return Err(Error::invalid(
                format!("{} items expected, {} found", self.items.len(), items.len()),
                value,
            ));
        }

        validate_items(value, items, self.items.iter(), adapt, self.full_errors)
    }

    fn humanized_name(&self) -> String {
        "array".to_string()
    }
}

/// Validates `items` pairwise against `validators`.
///
/// The output array is only allocated once an element actually changes.
fn validate_items<'a, 'v>(
    value: &'a Value,
    items: &'a [Value],
    validators: impl Iterator<Item = &'v ValidatorRef>,
    adapt: bool,
    full_errors: bool,
) -> Result<Cow<'a, Value>, Error> {
    let mut failures = Failures::new(full_errors);
    let mut adapted: Option<Vec<Value>> = None;

    for (index, (item, validator)) in items.iter().zip(validators).enumerate() {
        match validator.validate(item, adapt) {
            Ok(Cow::Owned(changed)) if adapt => {
                adapted
                    .get_or_insert_with(|| items[..index].to_vec())
                    .push(changed);
            }
            Ok(_) => {
                if let Some(out) = adapted.as_mut() {
                    out.push(item.clone());
                }
            }
            Err(e) => failures.record(e.at_index(index))?,
        }
    }

    failures.finish()?;
    Ok(match adapted {
        Some(out) => Cow::Owned(Value::Array(out)),
        None => Cow::Borrowed(value),
    })
}
