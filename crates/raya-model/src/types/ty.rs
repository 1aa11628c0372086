//! Generic type expressions
//!
//! A [`Type`] is what a member declaration says about its value: a raw class,
//! a parameterized class, a type variable, a wildcard, or an array. Types are
//! plain data so they can key the model cache directly.

use std::fmt;
use std::sync::Arc;

use crate::reflect::{ClassId, ClassTable};

/// A type variable, identified by the declaring class and its name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVar {
    /// Class that declares the variable
    pub owner: ClassId,
    /// Variable name (e.g., "T", "K", "V")
    pub name: Arc<str>,
}

impl TypeVar {
    /// Create a type variable reference
    pub fn new(owner: ClassId, name: impl Into<Arc<str>>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }
}

/// Wildcard type argument (`?`, `? extends X`, `? super X`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Wildcard {
    /// Upper bound (`? extends X`)
    pub upper: Option<Box<Type>>,
    /// Lower bound (`? super X`)
    pub lower: Option<Box<Type>>,
}

/// Type expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    /// Raw class
    Class(ClassId),
    /// Class with type arguments (e.g., `List<Person>`)
    Parameterized {
        /// Raw class
        raw: ClassId,
        /// Type arguments in declaration order
        args: Vec<Type>,
    },
    /// Type variable
    Variable(TypeVar),
    /// Wildcard argument
    Wildcard(Wildcard),
    /// Array of a component type
    Array(Box<Type>),
}

impl Type {
    /// Raw class type
    pub fn class(id: ClassId) -> Self {
        Type::Class(id)
    }

    /// Parameterized type
    pub fn parameterized(raw: ClassId, args: Vec<Type>) -> Self {
        Type::Parameterized { raw, args }
    }

    /// Type variable declared by `owner`
    pub fn var(owner: ClassId, name: impl Into<Arc<str>>) -> Self {
        Type::Variable(TypeVar::new(owner, name))
    }

    /// Unbounded wildcard `?`
    pub fn wildcard() -> Self {
        Type::Wildcard(Wildcard {
            upper: None,
            lower: None,
        })
    }

    /// Upper-bounded wildcard `? extends bound`
    pub fn extends(bound: Type) -> Self {
        Type::Wildcard(Wildcard {
            upper: Some(Box::new(bound)),
            lower: None,
        })
    }

    /// Lower-bounded wildcard `? super bound`
    pub fn super_of(bound: Type) -> Self {
        Type::Wildcard(Wildcard {
            upper: None,
            lower: Some(Box::new(bound)),
        })
    }

    /// Array type
    pub fn array(component: Type) -> Self {
        Type::Array(Box::new(component))
    }

    /// `List<element>`
    pub fn list_of(element: Type) -> Self {
        Type::parameterized(ClassId::LIST, vec![element])
    }

    /// `Map<key, value>`
    pub fn map_of(key: Type, value: Type) -> Self {
        Type::parameterized(ClassId::MAP, vec![key, value])
    }

    /// `Variable<content>`
    pub fn variable_of(content: Type) -> Self {
        Type::parameterized(ClassId::VARIABLE, vec![content])
    }

    /// The raw class of this type, if it has one
    ///
    /// Variables, wildcards and arrays have no raw class without resolution.
    pub fn raw_class(&self) -> Option<ClassId> {
        match self {
            Type::Class(id) => Some(*id),
            Type::Parameterized { raw, .. } => Some(*raw),
            _ => None,
        }
    }

    /// Type arguments of a parameterized type
    pub fn args(&self) -> &[Type] {
        match self {
            Type::Parameterized { args, .. } => args,
            _ => &[],
        }
    }

    /// Whether this is a primitive class (no null representation)
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Class(id) if id.is_primitive())
    }

    /// Whether the expression still mentions a type variable or wildcard
    pub fn is_open(&self) -> bool {
        match self {
            Type::Class(_) => false,
            Type::Parameterized { args, .. } => args.iter().any(Type::is_open),
            Type::Variable(_) | Type::Wildcard(_) => true,
            Type::Array(component) => component.is_open(),
        }
    }
}

impl From<ClassId> for Type {
    fn from(id: ClassId) -> Self {
        Type::Class(id)
    }
}

fn class_name(id: ClassId) -> Arc<str> {
    ClassTable::global()
        .get(id)
        .map(|decl| decl.name.clone())
        .unwrap_or_else(|| Arc::from(format!("#{}", id.index())))
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Class(id) => write!(f, "{}", class_name(*id)),
            Type::Parameterized { raw, args } => {
                write!(f, "{}<", class_name(*raw))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            Type::Variable(var) => write!(f, "{}", var.name),
            Type::Wildcard(Wildcard { upper, lower }) => match (upper, lower) {
                (Some(upper), _) => write!(f, "? extends {}", upper),
                (None, Some(lower)) => write!(f, "? super {}", lower),
                (None, None) => write!(f, "?"),
            },
            Type::Array(component) => write!(f, "{}[]", component),
        }
    }
}
