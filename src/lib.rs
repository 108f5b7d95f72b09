//! # Shapecheck
//!
//! Compile a compact shorthand schema once, then use the resulting validator
//! tree to check (and optionally adapt) any number of in-memory values.
//!
//! ## Overview
//!
//! A schema is written as shorthand ([`Schema`]): names like `"integer"` or
//! `"?string"`, one-element lists for "array of", fixed-length lists for
//! tuples, maps of field names (with `+`/`?` markers) for objects, regexes
//! and types. [`parse`] resolves the shorthand into a tree of [`Validator`]
//! nodes. Validation walks that tree and reports every rejection with the
//! exact path to the offending value.
//!
//! ## Core Types
//!
//! - [`Validator`]: the node protocol (`validate`, `adapt`, `is_valid`)
//! - [`Schema`]: shorthand accepted by [`parse`]
//! - [`Registry`]: named validators and factories that extend the shorthand
//! - [`ParsingOptions`]: scoped settings consulted while compiling objects
//! - [`ValidationError`] / [`ValidationErrors`]: rejections with their paths
//! - [`SchemaError`]: malformed shorthand, reported at compile time only
//!
//! ## Example
//!
//! ```rust
//! use shapecheck::{parse, Validator};
//! use serde_json::json;
//!
//! let order = parse(json!({
//!     "+id": "integer",
//!     "+lines": [{"+sku": "string", "+qty": "integer"}],
//!     "note": "?string"
//! }))
//! .unwrap();
//!
//! assert!(order.is_valid(&json!({"id": 7, "lines": [{"sku": "A1", "qty": 2}]})));
//!
//! let err = order
//!     .validate(&json!({"id": 7, "lines": [{"sku": "A1", "qty": "2"}]}), false)
//!     .unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     r#"Invalid value "2": must be integer (at lines[0].qty)"#
//! );
//! ```

pub mod accepts;
pub mod batch;
pub mod convert;
pub mod error;
pub mod parsing;
pub mod path;
pub mod registry;
pub mod schema;
pub mod validators;

pub use accepts::Accepts;
pub use error::{AdaptError, Error, FailureKind, SchemaError, Traps, ValidationError, ValidationErrors};
pub use parsing::{parsing, AdditionalProperties, ParsingConfig, ParsingOptions, ParsingScope};
pub use path::{JsonPath, PathSegment};
pub use registry::{parse, parse_with, register, register_factory, Factory, Registry};
pub use schema::{JsonType, PredicateFn, Schema};
pub use validators::{Validator, ValidatorRef};
