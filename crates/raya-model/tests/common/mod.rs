//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Once};

use raya_model::{
    ClassId, FieldDecl, MethodDecl, Model, ModelError, ModelResult, Modifiers, Property, Type,
    Value,
};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Route engine logs to the test output (`RUST_LOG=raya_model=debug`)
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Read an instance slot
pub fn read(this: &Value, slot: usize) -> ModelResult<Value> {
    this.as_instance()
        .and_then(|instance| instance.slot(slot))
        .ok_or_else(|| ModelError::Reflection {
            message: format!("no slot {}", slot),
        })
}

/// Write an instance slot
pub fn write(this: &Value, slot: usize, value: Value) -> ModelResult<()> {
    match this.as_instance() {
        Some(instance) => instance.set_slot(slot, value),
        None => Err(ModelError::Reflection {
            message: format!("no slot {}", slot),
        }),
    }
}

/// Private backing field
pub fn backing(name: &str, ty: impl Into<Type>) -> FieldDecl {
    FieldDecl::new(name, ty).modifiers(Modifiers::PRIVATE)
}

/// `getX()` reading a slot
pub fn slot_getter(name: &str, ty: impl Into<Type>, slot: usize) -> MethodDecl {
    MethodDecl::getter(name, ty, move |this| read(this, slot))
}

/// `setX(v)` writing a slot
pub fn slot_setter(name: &str, ty: impl Into<Type>, slot: usize) -> MethodDecl {
    MethodDecl::setter(name, ty, move |this, value| write(this, slot, value))
}

/// Property names in model order
pub fn names(model: &Model) -> Vec<String> {
    model
        .properties()
        .iter()
        .map(|p| p.name().to_string())
        .collect()
}

/// Property by name, panicking when missing
pub fn property(model: &Model, name: &str) -> Arc<Property> {
    model
        .property(name)
        .unwrap_or_else(|| panic!("{} has no property `{}`", model, name))
}

/// Boxed string type
pub fn string() -> Type {
    Type::class(ClassId::STRING)
}
