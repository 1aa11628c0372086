//! Type expressions and generic resolution

mod resolver;
mod ty;

pub use resolver::{substitute, Bindings, TypeResolver};
pub use ty::{Type, TypeVar, Wildcard};
