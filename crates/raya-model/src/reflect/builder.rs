//! Fluent class declaration
//!
//! ```ignore
//! let person = ClassBuilder::new("Person")
//!     .module("app")
//!     .field(FieldDecl::public("name", ClassId::STRING))
//!     .field(FieldDecl::new("age", ClassId::INT).managed())
//!     .register()?;
//!
//! let boxed = ClassBuilder::new("Box");
//! let t = boxed.var("T");
//! let boxed = boxed
//!     .type_param("T")
//!     .field(FieldDecl::public("content", t))
//!     .register()?;
//! ```

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::error::{ModelError, ModelResult};
use crate::types::Type;
use crate::value::Value;

use super::class::{ClassDecl, ClassKind, TypeParam};
use super::member::{Annotation, ComponentDecl, FieldDecl, MethodDecl, Modifiers};
use super::table::ClassTable;
use super::ClassId;

/// Module assigned to classes that do not name one
pub const DEFAULT_MODULE: &str = "main";

/// Builder for registering a class with the global [`ClassTable`]
///
/// The class id is reserved as soon as the builder is created, so member
/// types may refer to the class itself (`Node { next: Node }`) or to its type
/// variables through [`ClassBuilder::var`].
pub struct ClassBuilder {
    decl: ClassDecl,
    superclass_set: bool,
}

impl ClassBuilder {
    /// Start declaring an ordinary class
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::with_kind(name, ClassKind::Class)
    }

    /// Start declaring an interface
    pub fn interface(name: impl Into<Arc<str>>) -> Self {
        Self::with_kind(name, ClassKind::Interface)
    }

    /// Start declaring a record
    pub fn record(name: impl Into<Arc<str>>) -> Self {
        Self::with_kind(name, ClassKind::Record)
    }

    /// Start declaring an enumeration
    pub fn enumeration(name: impl Into<Arc<str>>) -> Self {
        Self::with_kind(name, ClassKind::Enum)
    }

    /// Start declaring a leaf value class without properties
    pub fn atomic(name: impl Into<Arc<str>>) -> Self {
        Self::with_kind(name, ClassKind::Atomic)
    }

    fn with_kind(name: impl Into<Arc<str>>, kind: ClassKind) -> Self {
        let id = ClassTable::global().reserve();
        Self {
            decl: ClassDecl {
                id,
                name: name.into(),
                module: Arc::from(DEFAULT_MODULE),
                kind,
                modifiers: Modifiers::PUBLIC,
                type_params: Vec::new(),
                superclass: None,
                interfaces: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                components: Vec::new(),
                constants: Vec::new(),
                constructor: None,
                annotations: Vec::new(),
                slot_count: 0,
            },
            superclass_set: false,
        }
    }

    /// The reserved class id
    pub fn id(&self) -> ClassId {
        self.decl.id
    }

    /// Type variable of this class
    pub fn var(&self, name: impl Into<Arc<str>>) -> Type {
        Type::var(self.decl.id, name)
    }

    /// The class as seen from inside its own declaration
    pub fn self_type(&self) -> Type {
        self.decl.self_type()
    }

    /// Owning module
    pub fn module(mut self, module: impl Into<Arc<str>>) -> Self {
        self.decl.module = module.into();
        self
    }

    /// Class modifiers
    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.decl.modifiers = modifiers;
        self
    }

    /// Declare an unbounded type parameter
    pub fn type_param(mut self, name: impl Into<Arc<str>>) -> Self {
        self.decl.type_params.push(TypeParam::new(name));
        self
    }

    /// Declare a type parameter with an upper bound
    pub fn type_param_bounded(mut self, name: impl Into<Arc<str>>, bound: Type) -> Self {
        self.decl.type_params.push(TypeParam::bounded(name, bound));
        self
    }

    /// Set the superclass edge
    pub fn extends(mut self, superclass: impl Into<Type>) -> Self {
        self.decl.superclass = Some(superclass.into());
        self.superclass_set = true;
        self
    }

    /// Add an interface edge
    pub fn implements(mut self, interface: impl Into<Type>) -> Self {
        self.decl.interfaces.push(interface.into());
        self
    }

    /// Declare a field
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.decl.fields.push(field);
        self
    }

    /// Declare a method
    pub fn method(mut self, method: MethodDecl) -> Self {
        self.decl.methods.push(method);
        self
    }

    /// Declare a record component
    pub fn component(mut self, component: ComponentDecl) -> Self {
        self.decl.components.push(component);
        self
    }

    /// Declare an enum constant
    pub fn constant(mut self, name: impl Into<Arc<str>>) -> Self {
        self.decl.constants.push(name.into());
        self
    }

    /// Canonical record constructor
    ///
    /// Records without one are rebuilt by copying component slots.
    pub fn constructor(
        mut self,
        constructor: impl Fn(Vec<Value>) -> ModelResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.decl.constructor = Some(Arc::new(constructor));
        self
    }

    /// Add a class-level annotation
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.decl.annotations.push(annotation);
        self
    }

    /// Validate, lay out and publish the class
    pub fn register(self) -> ModelResult<ClassId> {
        let table = ClassTable::global();
        let decl = self.finish(table)?;
        table.publish(decl)
    }

    fn invalid(&self, message: impl Into<String>) -> ModelError {
        ModelError::InvalidDeclaration {
            class: self.decl.name.to_string(),
            message: message.into(),
        }
    }

    fn finish(mut self, table: &ClassTable) -> ModelResult<ClassDecl> {
        let id = self.decl.id;

        if self.decl.is_interface() {
            if self.superclass_set {
                return Err(self.invalid("interfaces cannot extend a class"));
            }
            if let Some(field) = self.decl.fields.iter().find(|f| !f.modifiers.is_static()) {
                return Err(self.invalid(format!("interface field `{}` must be static", field.name)));
            }
        } else if !self.superclass_set {
            self.decl.superclass = Some(Type::Class(ClassId::OBJECT));
        }

        // Supertype edges must point at published classes of the right kind
        if let Some(superclass) = &self.decl.superclass {
            let raw = superclass
                .raw_class()
                .ok_or_else(|| self.invalid(format!("superclass `{}` is not a class", superclass)))?;
            if raw == id {
                return Err(self.invalid("class cannot extend itself"));
            }
            let parent = table.lookup(raw)?;
            if parent.is_interface() {
                return Err(self.invalid(format!("cannot extend interface `{}`", parent.name)));
            }
            if parent.modifiers.is_final() {
                return Err(self.invalid(format!("cannot extend final class `{}`", parent.name)));
            }
            if superclass.args().len() > parent.type_params.len() {
                return Err(self.invalid(format!("too many type arguments for `{}`", parent.name)));
            }
            self.decl.slot_count = parent.slot_count;
        }
        for interface in &self.decl.interfaces {
            let raw = interface
                .raw_class()
                .ok_or_else(|| self.invalid(format!("`{}` is not an interface", interface)))?;
            if raw == id {
                return Err(self.invalid("class cannot implement itself"));
            }
            let decl = table.lookup(raw)?;
            if !decl.is_interface() {
                return Err(self.invalid(format!("`{}` is not an interface", decl.name)));
            }
        }

        let mut names = FxHashSet::default();
        for field in &self.decl.fields {
            if !names.insert(field.name.clone()) {
                return Err(self.invalid(format!("duplicate field `{}`", field.name)));
            }
        }
        names.clear();
        for component in &self.decl.components {
            if !names.insert(component.name.clone()) {
                return Err(self.invalid(format!("duplicate component `{}`", component.name)));
            }
        }
        if !self.decl.components.is_empty() && !self.decl.is_record() {
            return Err(self.invalid("only records declare components"));
        }

        // Slot layout: inherited slots, then components, then own instance fields
        let mut next_slot = self.decl.slot_count;
        for component in &mut self.decl.components {
            component.slot = next_slot;
            next_slot += 1;
        }
        for field in &mut self.decl.fields {
            field.declaring = id;
            field.slot = if field.modifiers.is_static() {
                None
            } else {
                next_slot += 1;
                Some(next_slot - 1)
            };
        }
        for method in &mut self.decl.methods {
            method.declaring = id;
            if method.body.is_none() {
                method.modifiers = method.modifiers | Modifiers::ABSTRACT;
            }
        }
        self.decl.slot_count = next_slot;

        Ok(self.decl)
    }
}
