//! Validator nodes.
//!
//! Every node implements [`Validator`]. Containers and combinators hold their
//! children as [`ValidatorRef`]s, so any node (built-in or user-defined) can
//! appear anywhere in a tree.
//!
//! Nodes are usually produced by [`crate::parse`] from shorthand, but each can
//! also be constructed directly and passed back into shorthand as a
//! [`Schema`] value.

mod adapt;
mod combinators;
mod mapping;
mod object;
mod primitive;
mod sequence;
mod temporal;
mod traits;

use std::sync::Arc;

pub use adapt::{AdaptBy, AdaptFn, AdaptTo};
pub use combinators::{AllOf, AnyOf, ChainOf, NonNullable, Not, Nullable, Range};
pub use mapping::Mapping;
pub use object::{Object, ObjectBuilder};
pub use primitive::{Condition, Enum, Pattern, StringValidator, Type};
pub use sequence::{HeterogeneousSequence, HomogeneousSequence};
pub use temporal::{Temporal, TemporalKind};
pub use traits::{Validator, ValidatorRef};

use crate::schema::Schema;

macro_rules! impl_into_schema {
    ($($node:ty),* $(,)?) => {
        $(
            impl From<$node> for Schema {
                fn from(node: $node) -> Self {
                    Schema::Validator(Arc::new(node))
                }
            }
        )*
    };
}

impl_into_schema!(
    AdaptBy,
    AdaptTo,
    AllOf,
    AnyOf,
    ChainOf,
    Condition,
    Enum,
    HeterogeneousSequence,
    HomogeneousSequence,
    Mapping,
    NonNullable,
    Not,
    Nullable,
    Object,
    Pattern,
    Range,
    StringValidator,
    Temporal,
    Type,
);
