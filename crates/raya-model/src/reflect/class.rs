//! Class declarations
//!
//! A [`ClassDecl`] is the complete, immutable metadata record of one class:
//! its generic signature, its supertype edges, and its declared members.

use std::fmt;
use std::sync::Arc;

use crate::types::Type;

use super::member::{Annotation, ComponentDecl, Constructor, FieldDecl, MethodDecl, Modifiers};
use super::ClassId;

/// Kind of a declared class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Ordinary class
    Class,
    /// Interface (no fields, no superclass)
    Interface,
    /// Immutable record with components
    Record,
    /// Enumeration with named constants
    Enum,
    /// Primitive value class
    Primitive,
    /// Leaf value class without properties (strings, boxed numerics)
    Atomic,
}

/// Type parameter of a generic class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    /// Parameter name
    pub name: Arc<str>,
    /// Upper bounds in declaration order (empty means `Object`)
    pub bounds: Vec<Type>,
}

impl TypeParam {
    /// Unbounded parameter
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
        }
    }

    /// Bounded parameter
    pub fn bounded(name: impl Into<Arc<str>>, bound: Type) -> Self {
        Self {
            name: name.into(),
            bounds: vec![bound],
        }
    }
}

/// Reflection metadata for a single class
#[derive(Clone)]
pub struct ClassDecl {
    /// Class id
    pub id: ClassId,
    /// Simple name
    pub name: Arc<str>,
    /// Owning module, used by the access policy
    pub module: Arc<str>,
    /// Class kind
    pub kind: ClassKind,
    /// Class modifiers
    pub modifiers: Modifiers,
    /// Type parameters in order
    pub type_params: Vec<TypeParam>,
    /// Generic superclass edge
    pub superclass: Option<Type>,
    /// Generic interface edges in declaration order
    pub interfaces: Vec<Type>,
    /// Declared fields
    pub fields: Vec<FieldDecl>,
    /// Declared methods
    pub methods: Vec<MethodDecl>,
    /// Record components in canonical order
    pub components: Vec<ComponentDecl>,
    /// Enum constant names
    pub constants: Vec<Arc<str>>,
    /// Canonical constructor for records
    pub constructor: Option<Constructor>,
    /// Class-level annotations
    pub annotations: Vec<Annotation>,
    /// Total instance slots including inherited fields
    pub slot_count: usize,
}

impl ClassDecl {
    /// Whether this is an interface
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Whether this is a record
    pub fn is_record(&self) -> bool {
        self.kind == ClassKind::Record
    }

    /// Whether values of this class are leaves without properties
    pub fn is_atomic(&self) -> bool {
        matches!(
            self.kind,
            ClassKind::Primitive | ClassKind::Atomic | ClassKind::Enum
        )
    }

    /// Whether this class declares type parameters
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Supertype edges: superclass first, then interfaces in declaration order
    pub fn supertypes(&self) -> impl Iterator<Item = &Type> {
        self.superclass.iter().chain(self.interfaces.iter())
    }

    /// Position of a type parameter by name
    pub fn type_param_index(&self, name: &str) -> Option<usize> {
        self.type_params.iter().position(|p| &*p.name == name)
    }

    /// The class as seen from inside its own declaration (`Box<T>` for `class Box<T>`)
    pub fn self_type(&self) -> Type {
        if self.type_params.is_empty() {
            Type::Class(self.id)
        } else {
            Type::Parameterized {
                raw: self.id,
                args: self
                    .type_params
                    .iter()
                    .map(|p| Type::var(self.id, p.name.clone()))
                    .collect(),
            }
        }
    }

    /// Declared field by name
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| &*f.name == name)
    }

    /// Declared methods with the given name
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDecl> + 'a {
        self.methods.iter().filter(move |m| &*m.name == name)
    }

    /// Record component by name
    pub fn component(&self, name: &str) -> Option<&ComponentDecl> {
        self.components.iter().find(|c| &*c.name == name)
    }

    /// Whether the enum declares the constant
    pub fn has_constant(&self, name: &str) -> bool {
        self.constants.iter().any(|c| &**c == name)
    }
}

impl fmt::Debug for ClassDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDecl")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("module", &self.module)
            .field("kind", &self.kind)
            .field("type_params", &self.type_params)
            .field("superclass", &self.superclass)
            .field("interfaces", &self.interfaces)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .field("components", &self.components)
            .field("slot_count", &self.slot_count)
            .finish()
    }
}
