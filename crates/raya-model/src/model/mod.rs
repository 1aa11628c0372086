//! Property models
//!
//! A [`Model`] describes how values of one type are taken apart: which named
//! properties an object has, or how a container addresses its elements. All
//! reads and writes go through the model so the access policy applies
//! uniformly.
//!
//! ```ignore
//! let model = Model::of(person)?;
//! let name = model.property("name").unwrap();
//! model.set(&value, Some(&name), Value::str("Ada"))?;
//! assert_eq!(model.get(&value, Some(&name))?, Value::str("Ada"));
//! ```

mod accessor;
mod builder;
mod container;
mod ordering;
mod property;
mod registry;

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{ModelError, ModelResult};
use crate::policy::{self, Operation};
use crate::reflect::{ClassDecl, ClassId};
use crate::types::{Type, TypeResolver};
use crate::value::{Signal, Value};

pub use property::{AccessorKind, Property};
pub use registry::ModelRegistry;

use property::Access;

/// Shape of a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelKind {
    /// Leaf value without properties
    Atomic,
    /// Object with named properties
    Object {
        /// Immutable record; writes produce a new instance
        record: bool,
    },
    /// List addressed by decimal index
    List {
        /// Element type
        element: Type,
    },
    /// Map addressed by the textual form of its keys
    Map {
        /// Key type
        key: Type,
        /// Value type
        value: Type,
        /// Whether keys can be decoded from property names
        keyed: bool,
    },
    /// Fixed-length array addressed by decimal index
    Array {
        /// Component type
        component: Type,
    },
}

/// Property model of one finalized type
pub struct Model {
    ty: Type,
    decl: Option<Arc<ClassDecl>>,
    kind: ModelKind,
    properties: Vec<Arc<Property>>,
    by_name: FxHashMap<Arc<str>, usize>,
}

impl Model {
    fn new(
        ty: Type,
        decl: Option<Arc<ClassDecl>>,
        kind: ModelKind,
        mut properties: Vec<Property>,
    ) -> Self {
        properties.sort();
        let properties: Vec<Arc<Property>> = properties.into_iter().map(Arc::new).collect();
        let by_name = properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        Self {
            ty,
            decl,
            kind,
            properties,
            by_name,
        }
    }

    /// Model of a class
    pub fn of(class: ClassId) -> ModelResult<Arc<Model>> {
        Self::of_type(&Type::Class(class))
    }

    /// Model of a type; open parts are finalized to their erasure first
    pub fn of_type(ty: &Type) -> ModelResult<Arc<Model>> {
        let ty = TypeResolver::global().finalize(ty);
        ModelRegistry::global().get_or_build(&ty)
    }

    /// Model of a value's runtime type
    pub fn of_value(value: &Value) -> ModelResult<Arc<Model>> {
        match value.runtime_type() {
            Some(ty) => Self::of_type(&ty),
            None => Err(ModelError::null_target("value")),
        }
    }

    /// Modeled type
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Raw class, absent for arrays
    pub fn class(&self) -> Option<ClassId> {
        self.decl.as_ref().map(|decl| decl.id)
    }

    /// Model shape
    pub fn kind(&self) -> &ModelKind {
        &self.kind
    }

    /// Whether values of this model are leaves
    pub fn is_atomic(&self) -> bool {
        self.kind == ModelKind::Atomic
    }

    /// Parse the textual form of an atomic value
    ///
    /// Strings, primitives, their boxes and enum constants are decodable.
    /// Returns `None` for other models and for text that does not parse.
    pub fn decode(&self, text: &str) -> Option<Value> {
        if !self.is_atomic() {
            return None;
        }
        container::decode_key(text, &self.ty)
    }

    /// Textual form of an atomic value, the inverse of [`Model::decode`]
    pub fn encode(&self, value: &Value) -> Option<String> {
        if !self.is_atomic() {
            return None;
        }
        let value = accessor::coerce(value.clone(), &self.ty, "").ok()?;
        container::encode_key(&value)
    }

    /// Whether this models a record
    pub fn is_record(&self) -> bool {
        self.kind == ModelKind::Object { record: true }
    }

    /// Whether properties are synthesized per element
    pub fn is_container(&self) -> bool {
        matches!(
            self.kind,
            ModelKind::List { .. } | ModelKind::Array { .. } | ModelKind::Map { keyed: true, .. }
        )
    }

    /// Declared properties in display order; empty for containers
    pub fn properties(&self) -> &[Arc<Property>] {
        &self.properties
    }

    /// Property by name
    ///
    /// Containers synthesize an element property when the name addresses an
    /// element: a decimal index, or a decodable map key.
    pub fn property(&self, name: &str) -> Option<Arc<Property>> {
        match &self.kind {
            ModelKind::Atomic => None,
            ModelKind::Object { .. } => self
                .by_name
                .get(name)
                .map(|&index| self.properties[index].clone()),
            ModelKind::List { element } => name
                .parse::<usize>()
                .ok()
                .map(|index| Arc::new(container::index_property(index, element))),
            ModelKind::Array { component } => name
                .parse::<usize>()
                .ok()
                .map(|index| Arc::new(container::index_property(index, component))),
            ModelKind::Map {
                key,
                value,
                keyed: true,
            } => container::decode_key(name, key)
                .map(|k| Arc::new(container::key_property(name, k, value))),
            ModelKind::Map { keyed: false, .. } => None,
        }
    }

    /// Model of list elements or array components
    pub fn element_model(&self) -> ModelResult<Option<Arc<Model>>> {
        match &self.kind {
            ModelKind::List { element } => Self::of_type(element).map(Some),
            ModelKind::Array { component } => Self::of_type(component).map(Some),
            _ => Ok(None),
        }
    }

    /// Model of map keys
    pub fn key_model(&self) -> ModelResult<Option<Arc<Model>>> {
        match &self.kind {
            ModelKind::Map { key, .. } => Self::of_type(key).map(Some),
            _ => Ok(None),
        }
    }

    /// Model of map values
    pub fn value_model(&self) -> ModelResult<Option<Arc<Model>>> {
        match &self.kind {
            ModelKind::Map { value, .. } => Self::of_type(value).map(Some),
            _ => Ok(None),
        }
    }

    /// Element properties of a container value, in element order
    pub fn element_properties(&self, this: &Value) -> Vec<Arc<Property>> {
        let indexed = |len: usize, ty: &Type| -> Vec<Arc<Property>> {
            (0..len)
                .map(|i| Arc::new(container::index_property(i, ty)))
                .collect()
        };
        match (&self.kind, this) {
            (ModelKind::List { element }, Value::List(list)) => indexed(list.len(), element),
            (ModelKind::Array { component }, Value::Array(array)) => indexed(array.len(), component),
            (ModelKind::Map { value, keyed: true, .. }, Value::Map(map)) => map
                .keys()
                .into_iter()
                .filter_map(|key| {
                    let name = container::encode_key(&key)?;
                    Some(Arc::new(container::key_property(&name, key, value)))
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Reject receivers whose runtime class is not this model's class or a subclass
    fn check_receiver(&self, this: &Value, property: &Property) -> ModelResult<()> {
        let (Some(decl), Some(class)) = (&self.decl, this.class()) else {
            return Ok(());
        };
        if TypeResolver::global().is_subclass(class, decl.id) {
            return Ok(());
        }
        Err(ModelError::TypeMismatch {
            property: property.name.to_string(),
            expected: self.ty.to_string(),
            actual: this.type_name(),
        })
    }

    fn check(&self, operation: Operation, member: &str, public: bool) -> ModelResult<()> {
        match &self.decl {
            Some(decl) => policy::check(operation, decl, member, public),
            None => Ok(()),
        }
    }

    /// Read a property
    ///
    /// A null instance, a missing property or a write-only property reads as
    /// `Null`.
    pub fn get(&self, this: &Value, property: Option<&Property>) -> ModelResult<Value> {
        let Some(property) = property else {
            return Ok(Value::Null);
        };
        if this.is_null() {
            return Ok(Value::Null);
        }
        self.check_receiver(this, property)?;
        match &property.access {
            Access::Bound { getter: None, .. } => Ok(Value::Null),
            Access::Bound {
                getter: Some(getter),
                ..
            } => {
                self.check(getter.operation, &property.name, getter.public)?;
                (getter.call)(this)
            }
            access => {
                self.check(Operation::Read, &property.name, true)?;
                container::get_element(this, access)
            }
        }
    }

    /// Write a property, returning the carrier of the new state
    ///
    /// Mutable objects and containers return `this`; records return the
    /// rebuilt instance.
    pub fn set(&self, this: &Value, property: Option<&Property>, value: Value) -> ModelResult<Value> {
        let property = property.ok_or_else(|| ModelError::null_target("property"))?;
        if this.is_null() {
            return Err(ModelError::null_target(format!(
                "instance for `{}`",
                property.name
            )));
        }
        self.check_receiver(this, property)?;
        match &property.access {
            Access::Bound { setter: None, .. } => Err(ModelError::ReadOnly {
                name: property.name.to_string(),
            }),
            Access::Bound {
                setter: Some(setter),
                ..
            } => {
                let value = accessor::coerce(value, &property.ty, &property.name)?;
                self.check(setter.operation, &property.name, setter.public)?;
                (setter.call)(this, value)
            }
            _ => {
                self.check(Operation::Write, &property.name, true)?;
                container::set_element(this, property, value)
            }
        }
    }

    /// Subscribe to changes of a property
    ///
    /// Only holder properties can change observably; everything else yields
    /// an absent signal.
    pub fn observe(&self, this: &Value, property: Option<&Property>) -> ModelResult<Signal> {
        let (Some(property), false) = (property, this.is_null()) else {
            return Ok(Signal::never());
        };
        self.check_receiver(this, property)?;
        match &property.access {
            Access::Bound {
                observer: Some(observer),
                ..
            } => {
                self.check(observer.operation, &property.name, observer.public)?;
                (observer.call)(this)
            }
            _ => Ok(Signal::never()),
        }
    }

    /// Visit every readable property (or every element) with its current value
    pub fn walk<F>(&self, this: &Value, mut visit: F) -> ModelResult<()>
    where
        F: FnMut(&Model, &Property, Value),
    {
        if this.is_null() {
            return Ok(());
        }
        if self.is_container() {
            for property in self.element_properties(this) {
                let value = self.get(this, Some(&*property))?;
                visit(self, &*property, value);
            }
            return Ok(());
        }
        for property in &self.properties {
            if property.is_readable() {
                let value = self.get(this, Some(&**property))?;
                visit(self, &**property, value);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("ty", &self.ty)
            .field("kind", &self.kind)
            .field("properties", &self.properties)
            .finish()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)
    }
}
