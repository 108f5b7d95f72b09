//! Parallel validation of many values against one compiled validator.
//!
//! Compiled trees are `Send + Sync`, so a batch is split across rayon's
//! thread pool. Results keep input order. Rejections from every value are
//! accumulated, each located at the value's index; an untrapped adaptor
//! failure aborts the batch.

use std::borrow::Cow;

use rayon::prelude::*;
use serde_json::Value;
use stillwater::prelude::*;
use stillwater::Validation;

use crate::error::{AdaptError, Error, ValidationErrors};
use crate::validators::Validator;

/// The outcome of a batch: every value accepted, or every rejection.
pub type BatchResult<T> = Validation<T, ValidationErrors>;

/// Validates `values` without adapting them.
///
/// # Errors
///
/// Returns the first (by index) untrapped adaptor failure.
///
/// # Example
///
/// ```rust
/// use shapecheck::{batch, parse};
/// use serde_json::json;
///
/// let validator = parse("integer").unwrap();
/// let values = vec![json!(1), json!("2"), json!(3), json!(null)];
///
/// let result = batch::validate_batch(validator.as_ref(), &values).unwrap();
/// let errors = result.into_result().unwrap_err();
///
/// let paths: Vec<_> = errors.iter().map(|e| e.path.to_string()).collect();
/// assert_eq!(paths, vec!["[1]", "[3]"]);
/// ```
pub fn validate_batch<V>(validator: &V, values: &[Value]) -> Result<BatchResult<()>, AdaptError>
where
    V: Validator + ?Sized,
{
    let outcomes: Vec<_> = values
        .par_iter()
        .map(|value| validator.validate(value, false).map(|_| ()))
        .collect();
    Ok(gather(outcomes)?.map(|_| ()))
}

/// Validates and adapts `values`.
///
/// # Errors
///
/// Returns the first (by index) untrapped adaptor failure.
pub fn adapt_batch<V>(validator: &V, values: &[Value]) -> Result<BatchResult<Vec<Value>>, AdaptError>
where
    V: Validator + ?Sized,
{
    let outcomes: Vec<_> = values
        .par_iter()
        .map(|value| validator.validate(value, true).map(Cow::into_owned))
        .collect();
    gather(outcomes)
}

/// Reports, per value, whether it is valid.
pub fn is_valid_batch<V>(validator: &V, values: &[Value]) -> Vec<bool>
where
    V: Validator + ?Sized,
{
    values.par_iter().map(|value| validator.is_valid(value)).collect()
}

fn gather<T>(outcomes: Vec<Result<T, Error>>) -> Result<BatchResult<Vec<T>>, AdaptError> {
    let mut accepted = Vec::with_capacity(outcomes.len());
    let mut rejected: Option<ValidationErrors> = None;

    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome.map_err(|e| e.at_index(index)) {
            Ok(value) => accepted.push(value),
            Err(Error::Invalid(errors)) => {
                rejected = Some(match rejected {
                    Some(acc) => acc.combine(errors),
                    None => errors,
                });
            }
            Err(Error::Adaptor(failure)) => {
                tracing::warn!(index, kind = %failure.kind, "batch aborted by adaptor failure");
                return Err(failure);
            }
        }
    }

    Ok(match rejected {
        Some(errors) => Validation::Failure(errors),
        None => Validation::Success(accepted),
    })
}
