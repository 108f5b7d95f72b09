//! Integration tests for combinator validators.

use std::sync::Arc;

use shapecheck::validators::{
    AdaptBy, AdaptTo, AllOf, AnyOf, ChainOf, Condition, Enum, NonNullable, Not, Nullable, Range,
    StringValidator, Type,
};
use shapecheck::{parse, AdaptError, Error, FailureKind, JsonType, SchemaError, Traps, Validator, ValidatorRef};
use serde_json::{json, Value};

fn node<V: Validator + 'static>(validator: V) -> ValidatorRef {
    Arc::new(validator)
}

// ====== AnyOf ======

#[test]
fn test_any_of_integer_or_string() {
    let id = AnyOf::new(vec![node(Type::integer()), node(StringValidator::new())]);

    assert!(id.is_valid(&json!(5)));
    assert!(id.is_valid(&json!("x")));

    let err = id.validate(&json!(5.5), false).unwrap_err();
    assert_eq!(err.first().unwrap().reason, "must be integer or must be string");
    assert_eq!(id.humanized_name(), "integer or string");
}

#[test]
fn test_any_of_first_accepting_branch_adapts() {
    let value = AnyOf::new(vec![
        node(AdaptTo::new(JsonType::Integer)),
        node(AdaptBy::new(|_: &Value| Ok(json!("fallback")))),
    ]);

    assert_eq!(value.adapt(&json!("12")).unwrap(), json!(12));
    assert_eq!(value.adapt(&json!("twelve")).unwrap(), json!("fallback"));
}

#[test]
fn test_any_of_propagates_fatal_failure() {
    let fatal = AdaptBy::new(|_: &Value| Err(AdaptError::new(FailureKind::Custom("boom"), "boom")))
        .traps(Traps::Nothing);
    let value = AnyOf::new(vec![node(fatal), node(Type::integer())]);

    assert!(matches!(value.validate(&json!(1), true), Err(Error::Adaptor(_))));
}

// ====== AllOf ======

#[test]
fn test_all_of_requires_every_branch() {
    let short_code = AllOf::new(vec![
        node(StringValidator::new().max_len(3)),
        parse(shapecheck::Schema::pattern("[a-z]+$").unwrap()).unwrap(),
    ]);

    assert!(short_code.is_valid(&json!("abc")));
    assert!(!short_code.is_valid(&json!("abcd")));
    assert!(!short_code.is_valid(&json!("AB")));

    let err = short_code.validate(&json!("abcd"), false).unwrap_err();
    assert_eq!(err.first().unwrap().reason, "must be at most 3 characters long");
}

#[test]
fn test_all_of_returns_last_branch_output() {
    let both = AllOf::new(vec![
        node(AdaptTo::new(JsonType::String)),
        node(AdaptTo::new(JsonType::Integer)),
    ]);
    // each branch sees the original value
    assert_eq!(both.adapt(&json!("7")).unwrap(), json!(7));
}

// ====== ChainOf ======

#[test]
fn test_chain_of_feeds_each_stage() {
    let chain = ChainOf::new(vec![
        node(AdaptTo::new(JsonType::Integer)),
        node(AdaptBy::new(|v: &Value| Ok(json!(v.as_i64().unwrap_or_default() * 10)))),
        node(Range::new(node(Type::integer()), None, Some(json!(100))).unwrap()),
    ]);

    assert_eq!(chain.adapt(&json!("5")).unwrap(), json!(50));

    let err = chain.validate(&json!("11"), true).unwrap_err();
    let error = err.first().unwrap();
    assert_eq!(error.reason, "must not be larger than 100");
    assert_eq!(error.value, Some(json!(110)));
}

#[test]
fn test_empty_chain_accepts_anything() {
    let chain = ChainOf::new(vec![]);
    assert!(chain.is_valid(&json!({"any": "thing"})));
    assert_eq!(chain.humanized_name(), "anything");
}

// ====== Not ======

#[test]
fn test_not() {
    let not_null = Not::new(node(Type::null()));

    assert!(not_null.is_valid(&json!(0)));
    let err = not_null.validate(&json!(null), false).unwrap_err();
    assert_eq!(err.first().unwrap().reason, "should not be null");
    assert_eq!(not_null.humanized_name(), "not null");
}

#[test]
fn test_not_never_adapts() {
    let not_array = Not::new(node(Type::new([JsonType::Array])));
    assert_eq!(not_array.adapt(&json!("5")).unwrap(), json!("5"));
}

// ====== Nullable / NonNullable ======

#[test]
fn test_nullable_wraps_inner() {
    let maybe_int = Nullable::new(node(Type::integer()));
    assert!(maybe_int.is_valid(&json!(null)));
    assert!(maybe_int.is_valid(&json!(3)));
    assert!(!maybe_int.is_valid(&json!("3")));
}

#[test]
fn test_nullable_default_replaces_null() {
    let maybe_int = Nullable::with_default(node(Type::integer()), json!(0));
    assert_eq!(maybe_int.adapt(&json!(null)).unwrap(), json!(0));
    assert_eq!(maybe_int.adapt(&json!(5)).unwrap(), json!(5));
    assert_eq!(maybe_int.default_value(), Some(json!(0)));
}

#[test]
fn test_nested_nullable_does_not_stack() {
    let once = node(Nullable::new(node(Type::integer())));
    let twice = Nullable::new(once);
    assert_eq!(twice.humanized_name(), "integer or null");
}

#[test]
fn test_non_nullable() {
    let anything = NonNullable::new();
    assert!(anything.is_valid(&json!([])));
    let err = anything.validate(&json!(null), false).unwrap_err();
    assert_eq!(err.first().unwrap().reason, "must be non null");

    let name = NonNullable::of(node(StringValidator::new()));
    assert!(!name.is_valid(&json!(null)));
    assert!(!name.is_valid(&json!(1)));
    assert!(name.is_valid(&json!("n")));
}

// ====== Range ======

#[test]
fn test_range_bounds_are_inclusive() {
    let percent = Range::new(node(Type::number()), Some(json!(0)), Some(json!(100))).unwrap();

    assert!(percent.is_valid(&json!(0)));
    assert!(percent.is_valid(&json!(100)));
    assert!(percent.is_valid(&json!(99.5)));

    let err = percent.validate(&json!(-1), false).unwrap_err();
    assert_eq!(err.first().unwrap().reason, "must not be less than 0");
    let err = percent.validate(&json!(100.5), false).unwrap_err();
    assert_eq!(err.first().unwrap().reason, "must not be larger than 100");
}

#[test]
fn test_range_inner_runs_first() {
    let percent = Range::new(node(Type::number()), Some(json!(0)), None).unwrap();
    let err = percent.validate(&json!("5"), false).unwrap_err();
    assert_eq!(err.first().unwrap().reason, "must be number");
}

#[test]
fn test_range_compares_adapted_value() {
    let small = Range::new(node(AdaptTo::new(JsonType::Integer)), None, Some(json!(9))).unwrap();
    assert_eq!(small.adapt(&json!("8")).unwrap(), json!(8));
    assert!(small.adapt(&json!("10")).is_err());
}

#[test]
fn test_range_on_strings() {
    let early = Range::new(node(StringValidator::new()), Some(json!("a")), Some(json!("m"))).unwrap();
    assert!(early.is_valid(&json!("hello")));
    assert!(!early.is_valid(&json!("world")));
}

#[test]
fn test_range_rejects_incomparable_value() {
    let anything_small = Range::new(node(NonNullable::new()), None, Some(json!(10))).unwrap();
    let err = anything_small.validate(&json!("abc"), false).unwrap_err();
    assert_eq!(err.first().unwrap().reason, "must be comparable to 10");
}

#[test]
fn test_range_construction_errors() {
    let int = node(Type::integer());
    assert!(matches!(
        Range::new(int.clone(), Some(json!(10)), Some(json!(1))),
        Err(SchemaError::InvalidArgument(_))
    ));
    assert!(matches!(
        Range::new(int.clone(), Some(json!(1)), Some(json!("z"))),
        Err(SchemaError::InvalidArgument(_))
    ));
    assert!(matches!(
        Range::new(int, Some(json!([1])), None),
        Err(SchemaError::InvalidArgument(_))
    ));
}

// ====== Enum / Condition ======

#[test]
fn test_enum_membership() {
    let level = Enum::new([json!("low"), json!("high"), json!(3)]);

    assert!(level.is_valid(&json!("low")));
    assert!(level.is_valid(&json!(3.0)));
    assert!(!level.is_valid(&json!("medium")));
    assert_eq!(level.humanized_name(), r#"one of ["low", "high", 3]"#);

    let err = level.validate(&json!("medium"), false).unwrap_err();
    assert_eq!(err.first().unwrap().reason, r#"must be one of ["low", "high", 3]"#);
}

#[test]
fn test_condition_name_in_reason() {
    let positive = Condition::new("positive", |v| v.as_f64().is_some_and(|n| n > 0.0));
    let err = positive.validate(&json!(-2), false).unwrap_err();
    assert_eq!(err.first().unwrap().reason, "must satisfy predicate positive");
}
