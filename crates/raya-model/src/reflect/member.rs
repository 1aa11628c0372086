//! Member declarations: fields, methods, record components
//!
//! Each declaration is created by the user with a small builder
//! (`FieldDecl::new("name", ty).managed()`), then stamped with its declaring
//! class and storage slot when the owning [`ClassBuilder`](super::ClassBuilder)
//! registers the class.

use std::fmt;
use std::sync::Arc;

use crate::error::ModelResult;
use crate::types::Type;
use crate::value::Value;

use super::ClassId;

/// Member modifier flags (bitflags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u16);

impl Modifiers {
    /// Package-private (no flags)
    pub const NONE: Self = Self(0x000);
    /// Public visibility
    pub const PUBLIC: Self = Self(0x001);
    /// Private visibility
    pub const PRIVATE: Self = Self(0x002);
    /// Protected visibility
    pub const PROTECTED: Self = Self(0x004);
    /// Static member
    pub const STATIC: Self = Self(0x008);
    /// Final (immutable reference)
    pub const FINAL: Self = Self(0x010);
    /// Excluded from persistence
    pub const TRANSIENT: Self = Self(0x080);
    /// Native member
    pub const NATIVE: Self = Self(0x100);
    /// Abstract member
    pub const ABSTRACT: Self = Self(0x400);
    /// Compiler-generated member
    pub const SYNTHETIC: Self = Self(0x1000);
    /// Bridge method
    pub const BRIDGE: Self = Self(0x0040);

    /// Create from raw bits
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u16 {
        self.0
    }

    /// Check if all flags of `other` are set
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any flag of `other` is set
    pub const fn intersects(&self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Union of flags
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Public member
    pub const fn is_public(&self) -> bool {
        self.contains(Self::PUBLIC)
    }

    /// Private member
    pub const fn is_private(&self) -> bool {
        self.contains(Self::PRIVATE)
    }

    /// Static member
    pub const fn is_static(&self) -> bool {
        self.contains(Self::STATIC)
    }

    /// Final member
    pub const fn is_final(&self) -> bool {
        self.contains(Self::FINAL)
    }

    /// Transient member
    pub const fn is_transient(&self) -> bool {
        self.contains(Self::TRANSIENT)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Annotation attached to a class or member
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// Marks a member as a property regardless of visibility, optionally renaming it
    Managed {
        /// Property name override
        name: Option<Arc<str>>,
    },
    /// Excludes the property from persistence
    Transient,
    /// Any other marker
    Marker {
        /// Annotation type name
        name: Arc<str>,
        /// Optional single value
        value: Option<Arc<str>>,
        /// Whether several instances may appear on one member
        repeatable: bool,
    },
}

impl Annotation {
    /// `@Managed` without a rename
    pub fn managed() -> Self {
        Annotation::Managed { name: None }
    }

    /// `@Managed(name = ...)`
    pub fn managed_as(name: impl Into<Arc<str>>) -> Self {
        Annotation::Managed {
            name: Some(name.into()),
        }
    }

    /// A custom marker annotation
    pub fn marker(name: impl Into<Arc<str>>) -> Self {
        Annotation::Marker {
            name: name.into(),
            value: None,
            repeatable: false,
        }
    }

    /// A custom annotation carrying a value
    pub fn marker_with(name: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
        Annotation::Marker {
            name: name.into(),
            value: Some(value.into()),
            repeatable: false,
        }
    }

    /// A repeatable custom annotation carrying a value
    pub fn repeatable(name: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
        Annotation::Marker {
            name: name.into(),
            value: Some(value.into()),
            repeatable: true,
        }
    }

    /// Annotation type name
    pub fn type_name(&self) -> &str {
        match self {
            Annotation::Managed { .. } => "Managed",
            Annotation::Transient => "Transient",
            Annotation::Marker { name, .. } => name,
        }
    }

    /// Whether several instances of this annotation may be attached
    pub fn is_repeatable(&self) -> bool {
        matches!(self, Annotation::Marker { repeatable: true, .. })
    }
}

/// Merge `incoming` annotations into `into`, skipping duplicates of non-repeatable types
pub(crate) fn merge_annotations(into: &mut Vec<Annotation>, incoming: &[Annotation]) {
    for annotation in incoming {
        if annotation.is_repeatable()
            || !into.iter().any(|a| a.type_name() == annotation.type_name())
        {
            into.push(annotation.clone());
        }
    }
}

/// Field initializer, run when an instance is allocated
pub type Initializer = Arc<dyn Fn() -> Value + Send + Sync>;

/// Bound method body: `(receiver, arguments) -> result`
pub type MethodBody = Arc<dyn Fn(&Value, &[Value]) -> ModelResult<Value> + Send + Sync>;

/// Canonical constructor: component values in declaration order -> instance
pub type Constructor = Arc<dyn Fn(Vec<Value>) -> ModelResult<Value> + Send + Sync>;

/// Field declaration
#[derive(Clone)]
pub struct FieldDecl {
    /// Field name
    pub name: Arc<str>,
    /// Declared type
    pub ty: Type,
    /// Modifier flags
    pub modifiers: Modifiers,
    /// Annotations
    pub annotations: Vec<Annotation>,
    /// Declaring class (stamped at registration)
    pub declaring: ClassId,
    /// Instance slot (stamped at registration; `None` for static fields)
    pub slot: Option<usize>,
    /// Initial value factory
    pub initializer: Option<Initializer>,
}

impl FieldDecl {
    /// Package-private field
    pub fn new(name: impl Into<Arc<str>>, ty: impl Into<Type>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            modifiers: Modifiers::NONE,
            annotations: Vec::new(),
            declaring: ClassId::OBJECT,
            slot: None,
            initializer: None,
        }
    }

    /// Public field
    pub fn public(name: impl Into<Arc<str>>, ty: impl Into<Type>) -> Self {
        Self::new(name, ty).modifiers(Modifiers::PUBLIC)
    }

    /// Replace the modifier flags
    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Add an annotation
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Add `@Managed`
    pub fn managed(self) -> Self {
        self.annotate(Annotation::managed())
    }

    /// Set the initial value factory
    pub fn init(mut self, init: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.initializer = Some(Arc::new(init));
        self
    }

    /// Whether the field carries an annotation of the given type
    pub fn has_annotation(&self, type_name: &str) -> bool {
        self.annotations.iter().any(|a| a.type_name() == type_name)
    }
}

impl fmt::Debug for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("modifiers", &self.modifiers)
            .field("annotations", &self.annotations)
            .field("slot", &self.slot)
            .finish()
    }
}

/// Method declaration
#[derive(Clone)]
pub struct MethodDecl {
    /// Method name
    pub name: Arc<str>,
    /// Parameter types
    pub params: Vec<Type>,
    /// Return type (`None` for void)
    pub returns: Option<Type>,
    /// Modifier flags
    pub modifiers: Modifiers,
    /// Annotations
    pub annotations: Vec<Annotation>,
    /// Declaring class (stamped at registration)
    pub declaring: ClassId,
    /// Bound body (`None` for abstract methods)
    pub body: Option<MethodBody>,
}

impl MethodDecl {
    /// Public method with a body
    pub fn new(
        name: impl Into<Arc<str>>,
        params: Vec<Type>,
        returns: Option<Type>,
        body: impl Fn(&Value, &[Value]) -> ModelResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
            modifiers: Modifiers::PUBLIC,
            annotations: Vec::new(),
            declaring: ClassId::OBJECT,
            body: Some(Arc::new(body)),
        }
    }

    /// Public abstract method
    pub fn abstract_method(
        name: impl Into<Arc<str>>,
        params: Vec<Type>,
        returns: Option<Type>,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
            modifiers: Modifiers::PUBLIC | Modifiers::ABSTRACT,
            annotations: Vec::new(),
            declaring: ClassId::OBJECT,
            body: None,
        }
    }

    /// Zero-argument method returning `ty`
    pub fn getter(
        name: impl Into<Arc<str>>,
        ty: impl Into<Type>,
        body: impl Fn(&Value) -> ModelResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, Vec::new(), Some(ty.into()), move |this, _| body(this))
    }

    /// One-argument void method taking `ty`
    pub fn setter(
        name: impl Into<Arc<str>>,
        ty: impl Into<Type>,
        body: impl Fn(&Value, Value) -> ModelResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, vec![ty.into()], None, move |this, args| {
            body(this, args.first().cloned().unwrap_or_default())?;
            Ok(Value::Null)
        })
    }

    /// Replace the modifier flags
    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Add an annotation
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Whether the method is excluded from property discovery outright
    pub fn is_hidden(&self) -> bool {
        self.modifiers
            .intersects(Modifiers::STATIC | Modifiers::NATIVE | Modifiers::BRIDGE | Modifiers::SYNTHETIC)
    }

    /// Invoke the bound body
    pub fn invoke(&self, receiver: &Value, args: &[Value]) -> ModelResult<Value> {
        match &self.body {
            Some(body) => body(receiver, args),
            None => Err(crate::ModelError::reflection(format!(
                "method `{}` is abstract",
                self.name
            ))),
        }
    }
}

impl fmt::Debug for MethodDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDecl")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("modifiers", &self.modifiers)
            .field("annotations", &self.annotations)
            .field("declaring", &self.declaring)
            .finish()
    }
}

/// Record component declaration
#[derive(Debug, Clone)]
pub struct ComponentDecl {
    /// Component name
    pub name: Arc<str>,
    /// Declared type
    pub ty: Type,
    /// Annotations
    pub annotations: Vec<Annotation>,
    /// Instance slot (stamped at registration)
    pub slot: usize,
}

impl ComponentDecl {
    /// Create a component
    pub fn new(name: impl Into<Arc<str>>, ty: impl Into<Type>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            annotations: Vec::new(),
            slot: 0,
        }
    }

    /// Add an annotation
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_flags() {
        let m = Modifiers::PUBLIC | Modifiers::FINAL;
        assert!(m.is_public());
        assert!(m.is_final());
        assert!(!m.is_private());
        assert!(m.intersects(Modifiers::FINAL | Modifiers::STATIC));
        assert!(!m.intersects(Modifiers::STATIC | Modifiers::NATIVE));
        assert_eq!(Modifiers::NONE.bits(), 0);
    }

    #[test]
    fn test_merge_annotations_dedupes_non_repeatable() {
        let mut base = vec![Annotation::Transient, Annotation::repeatable("Tag", "a")];
        merge_annotations(
            &mut base,
            &[
                Annotation::Transient,
                Annotation::repeatable("Tag", "b"),
                Annotation::marker("Indexed"),
            ],
        );

        assert_eq!(base.len(), 4);
        assert_eq!(base.iter().filter(|a| a.type_name() == "Transient").count(), 1);
        assert_eq!(base.iter().filter(|a| a.type_name() == "Tag").count(), 2);
    }

    #[test]
    fn test_hidden_methods() {
        let m = MethodDecl::getter("getName", ClassId::STRING, |_| Ok(Value::Null));
        assert!(!m.is_hidden());
        assert!(m.clone().modifiers(Modifiers::STATIC).is_hidden());
        assert!(m.modifiers(Modifiers::PUBLIC | Modifiers::BRIDGE).is_hidden());
    }

    #[test]
    fn test_abstract_invoke_fails() {
        let m = MethodDecl::abstract_method("getName", Vec::new(), Some(ClassId::STRING.into()));
        assert!(m.invoke(&Value::Null, &[]).is_err());
    }
}
