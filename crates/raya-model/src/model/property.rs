//! Property descriptors

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::ModelResult;
use crate::policy::Operation;
use crate::reflect::{Annotation, ClassId};
use crate::types::Type;
use crate::value::{Signal, Value};

use super::Model;

/// How a property reaches its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    /// Plain field
    Field,
    /// Field holding a [`Variable`](crate::value::Variable); access goes through the holder
    Holder,
    /// `getX`/`isX` and `setX` methods (either may be missing)
    MethodPair,
    /// Record component; writes rebuild the record
    RecordComponent,
    /// List index, array index or map key
    Element,
}

pub(crate) type GetFn = dyn Fn(&Value) -> ModelResult<Value> + Send + Sync;
pub(crate) type SetFn = dyn Fn(&Value, Value) -> ModelResult<Value> + Send + Sync;
pub(crate) type ObserveFn = dyn Fn(&Value) -> ModelResult<Signal> + Send + Sync;

/// A bound accessor closure plus what the access policy needs to know about it
pub(crate) struct Accessor<F: ?Sized> {
    pub(crate) operation: Operation,
    pub(crate) public: bool,
    pub(crate) call: Arc<F>,
}

impl<F: ?Sized> Clone for Accessor<F> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation,
            public: self.public,
            call: self.call.clone(),
        }
    }
}

/// Access path of a property
#[derive(Clone)]
pub(crate) enum Access {
    /// Member accessors created when the model was built
    Bound {
        getter: Option<Accessor<GetFn>>,
        setter: Option<Accessor<SetFn>>,
        observer: Option<Accessor<ObserveFn>>,
    },
    /// Position in a list or array
    Index(usize),
    /// Key in a map
    Key(Value),
}

/// One named, typed facet of a model
///
/// Properties are immutable once their model is published. The value model
/// is resolved on first use, so self-referencing classes never recurse while
/// being built.
pub struct Property {
    pub(crate) name: Arc<str>,
    pub(crate) ty: Type,
    pub(crate) kind: AccessorKind,
    pub(crate) transitory: bool,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) declaring: ClassId,
    pub(crate) access: Access,
    model: OnceCell<Arc<Model>>,
}

impl Property {
    pub(crate) fn new(
        name: Arc<str>,
        ty: Type,
        kind: AccessorKind,
        declaring: ClassId,
        access: Access,
    ) -> Self {
        Self {
            name,
            ty,
            kind,
            transitory: false,
            annotations: Vec::new(),
            declaring,
            access,
            model: OnceCell::new(),
        }
    }

    pub(crate) fn with_annotations(mut self, annotations: Vec<Annotation>, transitory: bool) -> Self {
        self.transitory = transitory || annotations.iter().any(|a| *a == Annotation::Transient);
        self.annotations = annotations;
        self
    }

    /// Property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value type, specialized to the model's type arguments
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Model of the value type
    pub fn model(&self) -> ModelResult<Arc<Model>> {
        self.model.get_or_try_init(|| Model::of_type(&self.ty)).cloned()
    }

    /// Accessor kind
    pub fn kind(&self) -> AccessorKind {
        self.kind
    }

    /// Excluded from persistence
    pub fn is_transitory(&self) -> bool {
        self.transitory
    }

    /// Class declaring the underlying member
    pub fn declaring(&self) -> ClassId {
        self.declaring
    }

    /// All annotations, merged along the override chain
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// First annotation of the given type
    pub fn annotation(&self, type_name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.type_name() == type_name)
    }

    /// Whether an annotation of the given type is present
    pub fn has_annotation(&self, type_name: &str) -> bool {
        self.annotation(type_name).is_some()
    }

    /// Whether the property can be read
    pub fn is_readable(&self) -> bool {
        match &self.access {
            Access::Bound { getter, .. } => getter.is_some(),
            Access::Index(_) | Access::Key(_) => true,
        }
    }

    /// Whether the property can be written
    pub fn is_writable(&self) -> bool {
        match &self.access {
            Access::Bound { setter, .. } => setter.is_some(),
            Access::Index(_) | Access::Key(_) => true,
        }
    }

    /// Whether changes can be observed
    pub fn is_observable(&self) -> bool {
        matches!(&self.access, Access::Bound { observer: Some(_), .. })
    }

    /// Element index, for list and array properties
    pub fn index(&self) -> Option<usize> {
        match &self.access {
            Access::Index(index) => Some(*index),
            _ => None,
        }
    }

    /// Element key, for map properties
    pub fn key(&self) -> Option<&Value> {
        match &self.access {
            Access::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("kind", &self.kind)
            .field("transitory", &self.transitory)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}
