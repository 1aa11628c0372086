//! Bound accessors
//!
//! Each property owns closures created once at build time: a slot read or
//! write for fields and components, a method call for accessor pairs, and a
//! delegation to the holder for `Variable` fields. Visibility is bypassed
//! here; the access policy is checked by the caller.

use std::sync::Arc;

use crate::error::{ModelError, ModelResult};
use crate::policy::Operation;
use crate::reflect::{ClassId, ComponentDecl, Constructor, MethodDecl};
use crate::types::{Type, TypeResolver};
use crate::value::{Instance, Signal, Value, Variable};

use super::property::{Accessor, GetFn, ObserveFn, SetFn};

pub(crate) fn instance_of<'v>(this: &'v Value, property: &str) -> ModelResult<&'v Arc<Instance>> {
    this.as_instance().ok_or_else(|| {
        ModelError::reflection(format!(
            "cannot access `{}` on {}",
            property,
            this.type_name()
        ))
    })
}

fn read_slot(this: &Value, slot: usize, property: &str) -> ModelResult<Value> {
    instance_of(this, property)?
        .slot(slot)
        .ok_or_else(|| ModelError::reflection(format!("`{}` has no slot {}", property, slot)))
}

fn holder_in(this: &Value, slot: usize, property: &str) -> ModelResult<Option<Variable>> {
    match read_slot(this, slot, property)? {
        Value::Holder(holder) => Ok(Some(holder)),
        Value::Null => Ok(None),
        other => Err(ModelError::reflection(format!(
            "`{}` holds {} instead of a Variable",
            property,
            other.type_name()
        ))),
    }
}

pub(crate) fn field_getter(name: Arc<str>, slot: usize, public: bool) -> Accessor<GetFn> {
    Accessor {
        operation: Operation::Read,
        public,
        call: Arc::new(move |this: &Value| read_slot(this, slot, &name)),
    }
}

pub(crate) fn field_setter(name: Arc<str>, slot: usize, public: bool) -> Accessor<SetFn> {
    Accessor {
        operation: Operation::Write,
        public,
        call: Arc::new(move |this: &Value, value: Value| {
            instance_of(this, &name)?.set_slot(slot, value)?;
            Ok(this.clone())
        }),
    }
}

pub(crate) fn holder_getter(name: Arc<str>, slot: usize, public: bool) -> Accessor<GetFn> {
    Accessor {
        operation: Operation::Read,
        public,
        call: Arc::new(move |this: &Value| {
            Ok(holder_in(this, slot, &name)?
                .map(|holder| holder.get())
                .unwrap_or_default())
        }),
    }
}

pub(crate) fn holder_setter(name: Arc<str>, slot: usize, public: bool) -> Accessor<SetFn> {
    Accessor {
        operation: Operation::Write,
        public,
        call: Arc::new(move |this: &Value, value: Value| {
            let holder = holder_in(this, slot, &name)?
                .ok_or_else(|| ModelError::null_target(format!("holder of `{}`", name)))?;
            holder.set(value);
            Ok(this.clone())
        }),
    }
}

pub(crate) fn holder_observer(name: Arc<str>, slot: usize, public: bool) -> Accessor<ObserveFn> {
    Accessor {
        operation: Operation::Read,
        public,
        call: Arc::new(move |this: &Value| {
            Ok(holder_in(this, slot, &name)?
                .map(|holder| holder.observe())
                .unwrap_or_else(Signal::never))
        }),
    }
}

pub(crate) fn method_getter(method: MethodDecl) -> Accessor<GetFn> {
    let public = method.modifiers.is_public();
    Accessor {
        operation: Operation::Invoke,
        public,
        call: Arc::new(move |this: &Value| method.invoke(this, &[])),
    }
}

pub(crate) fn method_setter(method: MethodDecl) -> Accessor<SetFn> {
    let public = method.modifiers.is_public();
    Accessor {
        operation: Operation::Invoke,
        public,
        call: Arc::new(move |this: &Value, value: Value| {
            method.invoke(this, &[value])?;
            Ok(this.clone())
        }),
    }
}

pub(crate) fn component_getter(component: &ComponentDecl) -> Accessor<GetFn> {
    let name = component.name.clone();
    let slot = component.slot;
    Accessor {
        operation: Operation::Read,
        public: true,
        call: Arc::new(move |this: &Value| read_slot(this, slot, &name)),
    }
}

/// Copy-on-set: rebuild the record with one component replaced
pub(crate) fn component_setter(
    class: ClassId,
    components: Arc<[ComponentDecl]>,
    index: usize,
    constructor: Option<Constructor>,
) -> Accessor<SetFn> {
    Accessor {
        operation: Operation::Write,
        public: true,
        call: Arc::new(move |this: &Value, value: Value| {
            let name = &components[index].name;
            let record = instance_of(this, name)?;
            match &constructor {
                Some(constructor) => {
                    let mut args = Vec::with_capacity(components.len());
                    for (i, component) in components.iter().enumerate() {
                        args.push(if i == index {
                            value.clone()
                        } else {
                            read_slot(this, component.slot, &component.name)?
                        });
                    }
                    constructor(args)
                }
                None => {
                    let mut slots = record.slots();
                    let slot = components[index].slot;
                    match slots.get_mut(slot) {
                        Some(target) => *target = value,
                        None => {
                            return Err(ModelError::reflection(format!(
                                "record has no slot {} for `{}`",
                                slot, name
                            )))
                        }
                    }
                    Ok(Value::Object(Instance::with_slots(class, slots)))
                }
            }
        }),
    }
}

/// Convert `value` for storage in a property of type `ty`
///
/// Null is accepted everywhere except primitives; primitives widen; every
/// other value must be assignable to the erasure of `ty`.
pub(crate) fn coerce(value: Value, ty: &Type, property: &str) -> ModelResult<Value> {
    let mismatch = |value: &Value| ModelError::TypeMismatch {
        property: property.to_string(),
        expected: ty.to_string(),
        actual: value.type_name(),
    };

    if value.is_null() {
        return if ty.is_primitive() {
            Err(mismatch(&value))
        } else {
            Ok(value)
        };
    }

    let resolver = TypeResolver::global();
    match resolver.erase(ty) {
        Type::Class(ClassId::OBJECT) => Ok(value),
        Type::Class(id) => {
            if let Some(primitive) = id.primitive() {
                return value.widen(primitive).ok_or_else(|| mismatch(&value));
            }
            match value.runtime_type() {
                Some(actual) if resolver.is_assignable(&actual, &Type::Class(id)) => Ok(value),
                _ => Err(mismatch(&value)),
            }
        }
        erased @ Type::Array(_) => match value.runtime_type() {
            Some(actual) if resolver.is_assignable(&actual, &erased) => Ok(value),
            _ => Err(mismatch(&value)),
        },
        _ => Ok(value),
    }
}
