//! Built-in value coercion used by `AdaptTo`.
//!
//! | target    | accepted sources                                        |
//! |-----------|---------------------------------------------------------|
//! | `integer` | numbers (floats truncate), booleans, numeric strings    |
//! | `float`   | numbers, booleans, numeric strings                      |
//! | `number`  | numbers, booleans, numeric strings (integers stay so)   |
//! | `string`  | anything (non-strings become their JSON text)           |
//! | `boolean` | anything, by truthiness                                 |
//! | `array`   | strings (one element per char), objects (their keys)    |
//! | `object`  | arrays of `[key, value]` pairs                          |
//! | `null`    | nothing                                                 |
//!
//! A source of the wrong kind fails with [`FailureKind::Type`]; a source of
//! the right kind with unusable contents fails with [`FailureKind::Value`];
//! a float too large for an integer fails with [`FailureKind::Overflow`].
//!
//! [`FailureKind::Type`]: crate::FailureKind::Type
//! [`FailureKind::Value`]: crate::FailureKind::Value
//! [`FailureKind::Overflow`]: crate::FailureKind::Overflow

use serde_json::{Map, Number, Value};

use crate::error::{AdaptError, FailureKind};
use crate::schema::JsonType;

/// Converts `value` to `target`.
pub fn coerce(target: JsonType, value: &Value) -> Result<Value, AdaptError> {
    match target {
        JsonType::Integer => to_integer(value),
        JsonType::Float => to_float(value),
        JsonType::Number => to_number(value),
        JsonType::String => Ok(Value::String(to_text(value))),
        JsonType::Boolean => Ok(Value::Bool(truthy(value))),
        JsonType::Array => to_array(value),
        JsonType::Object => to_object(value),
        JsonType::Null if value.is_null() => Ok(Value::Null),
        JsonType::Null => Err(cannot_convert(value, target)),
    }
}

fn cannot_convert(value: &Value, target: JsonType) -> AdaptError {
    AdaptError::type_error(format!(
        "cannot convert {} to {}",
        JsonType::of(value),
        target
    ))
}

fn to_integer(value: &Value) -> Result<Value, AdaptError> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::Number(n) => {
            let f = n.as_f64().unwrap_or_default().trunc();
            if f < i64::MIN as f64 || f >= i64::MAX as f64 {
                return Err(AdaptError::new(
                    FailureKind::Overflow,
                    format!("{} does not fit in an integer", n),
                ));
            }
            Ok(Value::from(f as i64))
        }
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Value::from)
                .or_else(|_| s.parse::<u64>().map(Value::from))
                .map_err(|_| {
                    AdaptError::value_error(format!("invalid literal for integer: {:?}", s))
                })
        }
        other => Err(cannot_convert(other, JsonType::Integer)),
    }
}

fn to_float(value: &Value) -> Result<Value, AdaptError> {
    let f = match value {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => parse_float(s)?,
        other => return Err(cannot_convert(other, JsonType::Float)),
    };
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| AdaptError::value_error(format!("{} is not a finite number", f)))
}

fn to_number(value: &Value) -> Result<Value, AdaptError> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(Value::from(i)),
            Err(_) => to_float(value),
        },
        other => Err(cannot_convert(other, JsonType::Number)),
    }
}

fn parse_float(s: &str) -> Result<f64, AdaptError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .ok_or_else(|| AdaptError::value_error(format!("invalid literal for float: {:?}", s)))
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON truthiness: `null`, `false`, zero and empty containers are false.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn to_array(value: &Value) -> Result<Value, AdaptError> {
    match value {
        Value::Array(_) => Ok(value.clone()),
        Value::String(s) => Ok(Value::Array(
            s.chars().map(|c| Value::String(c.to_string())).collect(),
        )),
        Value::Object(fields) => Ok(Value::Array(
            fields.keys().cloned().map(Value::String).collect(),
        )),
        other => Err(cannot_convert(other, JsonType::Array)),
    }
}

fn to_object(value: &Value) -> Result<Value, AdaptError> {
    match value {
        Value::Object(_) => Ok(value.clone()),
        Value::Array(pairs) => {
            let mut out = Map::new();
            for pair in pairs {
                match pair.as_array().map(Vec::as_slice) {
                    Some([k, v]) => {
                        out.insert(to_text(k), v.clone());
                    }
                    _ => {
                        return Err(AdaptError::value_error(format!(
                            "expected a [key, value] pair, found {}",
                            pair
                        )))
                    }
                }
            }
            Ok(Value::Object(out))
        }
        other => Err(cannot_convert(other, JsonType::Object)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_integer() {
        assert_eq!(coerce(JsonType::Integer, &json!(3)).unwrap(), json!(3));
        assert_eq!(coerce(JsonType::Integer, &json!(3.9)).unwrap(), json!(3));
        assert_eq!(coerce(JsonType::Integer, &json!(-3.9)).unwrap(), json!(-3));
        assert_eq!(coerce(JsonType::Integer, &json!(true)).unwrap(), json!(1));
        assert_eq!(coerce(JsonType::Integer, &json!(" 12 ")).unwrap(), json!(12));
    }

    #[test]
    fn test_to_integer_failures_are_classified() {
        let bad_literal = coerce(JsonType::Integer, &json!("12b")).unwrap_err();
        assert_eq!(bad_literal.kind, FailureKind::Value);

        let wrong_type = coerce(JsonType::Integer, &json!([1])).unwrap_err();
        assert_eq!(wrong_type.kind, FailureKind::Type);
        assert_eq!(wrong_type.message, "cannot convert array to integer");

        let too_big = coerce(JsonType::Integer, &json!(1e300)).unwrap_err();
        assert_eq!(too_big.kind, FailureKind::Overflow);
    }

    #[test]
    fn test_to_float_and_number() {
        assert_eq!(coerce(JsonType::Float, &json!("2.5")).unwrap(), json!(2.5));
        assert_eq!(coerce(JsonType::Float, &json!(2)).unwrap(), json!(2.0));
        assert_eq!(coerce(JsonType::Number, &json!("2")).unwrap(), json!(2));
        assert_eq!(coerce(JsonType::Number, &json!("2.5")).unwrap(), json!(2.5));
        assert_eq!(
            coerce(JsonType::Float, &json!("nan")).unwrap_err().kind,
            FailureKind::Value
        );
        assert_eq!(
            coerce(JsonType::Number, &json!(null)).unwrap_err().kind,
            FailureKind::Type
        );
    }

    #[test]
    fn test_to_string() {
        assert_eq!(coerce(JsonType::String, &json!("x")).unwrap(), json!("x"));
        assert_eq!(coerce(JsonType::String, &json!(3)).unwrap(), json!("3"));
        assert_eq!(coerce(JsonType::String, &json!([1, 2])).unwrap(), json!("[1,2]"));
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert_eq!(coerce(JsonType::Boolean, &falsy).unwrap(), json!(false));
        }
        for truthy in [json!(true), json!(-1), json!("0"), json!([0]), json!({"a": null})] {
            assert_eq!(coerce(JsonType::Boolean, &truthy).unwrap(), json!(true));
        }
    }

    #[test]
    fn test_to_array_and_object() {
        assert_eq!(coerce(JsonType::Array, &json!("ab")).unwrap(), json!(["a", "b"]));
        assert_eq!(coerce(JsonType::Array, &json!({"k": 1})).unwrap(), json!(["k"]));
        assert_eq!(
            coerce(JsonType::Object, &json!([["a", 1], [2, true]])).unwrap(),
            json!({"a": 1, "2": true})
        );
        assert_eq!(
            coerce(JsonType::Object, &json!([["a"]])).unwrap_err().kind,
            FailureKind::Value
        );
        assert_eq!(
            coerce(JsonType::Array, &json!(5)).unwrap_err().kind,
            FailureKind::Type
        );
    }

    #[test]
    fn test_to_null() {
        assert_eq!(coerce(JsonType::Null, &json!(null)).unwrap(), json!(null));
        assert_eq!(coerce(JsonType::Null, &json!(0)).unwrap_err().kind, FailureKind::Type);
    }
}
