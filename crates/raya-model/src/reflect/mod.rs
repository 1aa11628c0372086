//! Class metadata
//!
//! The engine never inspects Rust types. Classes are declared once through
//! [`ClassBuilder`] and published to the process-wide [`ClassTable`]; property
//! discovery then queries those declarations for visibility, annotations and
//! static types.

mod builder;
mod class;
mod id;
mod member;
mod table;

pub use builder::{ClassBuilder, DEFAULT_MODULE};
pub use class::{ClassDecl, ClassKind, TypeParam};
pub use id::{ClassId, Primitive};
pub(crate) use member::merge_annotations;
pub use member::{
    Annotation, ComponentDecl, Constructor, FieldDecl, Initializer, MethodBody, MethodDecl,
    Modifiers,
};
pub use table::{ClassTable, CORE_MODULE};
