//! Integration tests for adapting validators and failure trapping.

use shapecheck::validators::{AdaptBy, AdaptTo, Condition};
use shapecheck::{
    parse, AdaptError, Error, FailureKind, JsonType, Schema, Traps, Validator,
};
use serde_json::{json, Value};

fn order_schema(traps: Traps) -> Schema {
    Schema::map([
        ("+id", Schema::from(AdaptTo::new(JsonType::Integer).traps(traps))),
        ("+tags", Schema::seq([Schema::from(AdaptTo::new(JsonType::String))])),
        ("?paid", Schema::from(AdaptTo::new(JsonType::Boolean))),
    ])
}

#[test]
fn test_adapt_returns_converted_tree() {
    let order = parse(order_schema(Traps::All)).unwrap();

    let adapted = order
        .adapt(&json!({"id": "17", "tags": ["a", 2, null], "paid": 1}))
        .unwrap();
    assert_eq!(
        adapted,
        json!({"id": 17, "tags": ["a", "2", "null"], "paid": true})
    );
}

#[test]
fn test_adapt_leaves_input_untouched() {
    let order = parse(order_schema(Traps::All)).unwrap();
    let input = json!({"id": "17", "tags": []});
    let snapshot = input.clone();

    order.adapt(&input).unwrap();
    assert_eq!(input, snapshot);
}

#[test]
fn test_trapped_conversion_failure_has_path() {
    let order = parse(order_schema(Traps::All)).unwrap();

    let err = order.validate(&json!({"id": "x17", "tags": []}), true).unwrap_err();
    let error = err.first().unwrap();
    assert_eq!(error.path.to_string(), "id");
    assert_eq!(error.reason, r#"invalid literal for integer: "x17""#);
    assert_eq!(error.value, Some(json!("x17")));
}

#[test]
fn test_untrapped_kind_escapes_the_tree() {
    let order = parse(order_schema(Traps::only([FailureKind::Value]))).unwrap();

    // a value failure is still trapped
    let err = order.validate(&json!({"id": "x", "tags": []}), true).unwrap_err();
    assert!(!err.is_fatal());

    // a type failure is not
    let err = order.validate(&json!({"id": [1], "tags": []}), true).unwrap_err();
    match err {
        Error::Adaptor(failure) => {
            assert_eq!(failure.kind, FailureKind::Type);
            assert_eq!(failure.message, "cannot convert array to integer");
        }
        other => panic!("expected an adaptor failure, got {}", other),
    }
}

#[test]
fn test_overflow_can_be_trapped_separately() {
    let to_int = AdaptTo::new(JsonType::Integer).traps(Traps::only([FailureKind::Overflow]));

    let err = to_int.validate(&json!(1e300), true).unwrap_err();
    assert!(!err.is_fatal());
    assert!(to_int.validate(&json!("nope"), true).unwrap_err().is_fatal());
}

#[test]
fn test_custom_failure_kinds() {
    let lookup = AdaptBy::new(|v: &Value| match v.as_str() {
        Some("eur") => Ok(json!(978)),
        Some("usd") => Ok(json!(840)),
        Some(_) => Err(AdaptError::new(FailureKind::Custom("unknown-currency"), "unknown currency")),
        None => Err(AdaptError::type_error("currency codes are strings")),
    })
    .named("currency code")
    .traps(Traps::only([FailureKind::Custom("unknown-currency")]));

    assert_eq!(lookup.adapt(&json!("eur")).unwrap(), json!(978));
    assert!(!lookup.is_valid(&json!("gbp")));
    assert!(lookup.validate(&json!(1), true).unwrap_err().is_fatal());
    assert_eq!(lookup.humanized_name(), "currency code");
}

#[test]
fn test_is_valid_swallows_fatal_failures() {
    let never = AdaptBy::new(|_: &Value| Err(AdaptError::value_error("down"))).traps(Traps::Nothing);
    assert!(!never.is_valid(&json!(1)));
}

#[test]
fn test_exact_number_kinds() {
    let loose = AdaptTo::new(JsonType::Number);
    assert_eq!(loose.adapt(&json!(3)).unwrap(), json!(3));
    assert_eq!(loose.adapt(&json!("3.5")).unwrap(), json!(3.5));

    let float = AdaptTo::new(JsonType::Float).exact(true);
    assert_eq!(float.adapt(&json!(3)).unwrap(), json!(3.0));
    assert_eq!(float.adapt(&json!(3.5)).unwrap(), json!(3.5));
}

#[test]
fn test_pair_list_to_object() {
    let headers = AdaptTo::new(JsonType::Object);
    assert_eq!(
        headers.adapt(&json!([["a", 1], ["b", 2]])).unwrap(),
        json!({"a": 1, "b": 2})
    );

    let err = headers.validate(&json!([["a"]]), true).unwrap_err();
    assert_eq!(err.first().unwrap().reason, r#"expected a [key, value] pair, found ["a"]"#);
}

#[test]
fn test_fallible_predicate_traps() {
    let short = Condition::fallible("short", |v| {
        v.as_str()
            .map(|s| s.len() < 5)
            .ok_or_else(|| AdaptError::type_error("not text"))
    })
    .traps(Traps::only([FailureKind::Value]));

    assert!(short.is_valid(&json!("abc")));
    assert!(!short.is_valid(&json!("abcdef")));
    assert!(short.validate(&json!(1), false).unwrap_err().is_fatal());
}
