//! Record component tests

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{names, property};
use raya_model::{
    AccessorKind, Annotation, ClassBuilder, ClassId, ComponentDecl, Instance, Model, ModelError,
    Type, Value,
};

#[test]
fn test_record_components_are_properties() {
    common::init_tracing();
    let point = ClassBuilder::record("RecordPoint")
        .component(ComponentDecl::new("x", ClassId::INT))
        .component(ComponentDecl::new("y", ClassId::INT))
        .component(ComponentDecl::new("label", ClassId::STRING).annotate(Annotation::marker("Label")))
        .register()
        .unwrap();
    let model = Model::of(point).unwrap();

    assert!(model.is_record());
    assert_eq!(names(&model), vec!["x", "y", "label"]);
    let x = property(&model, "x");
    assert_eq!(x.kind(), AccessorKind::RecordComponent);
    assert!(x.is_readable() && x.is_writable());
    assert!(property(&model, "label").has_annotation("Label"));
}

#[test]
fn test_record_set_returns_new_instance() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let builder = ClassBuilder::record("RecordPair");
    let id = builder.id();
    let counter = constructed.clone();
    let pair = builder
        .component(ComponentDecl::new("left", ClassId::STRING))
        .component(ComponentDecl::new("right", ClassId::STRING))
        .constructor(move |args| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::object(Instance::with_slots(id, args)))
        })
        .register()
        .unwrap();

    let model = Model::of(pair).unwrap();
    let left = property(&model, "left");
    let right = property(&model, "right");

    let original = Value::object(Instance::with_slots(
        pair,
        vec![Value::str("a"), Value::str("b")],
    ));
    let updated = model.set(&original, Some(&left), Value::str("z")).unwrap();

    assert_ne!(updated, original);
    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert_eq!(model.get(&updated, Some(&left)).unwrap(), Value::str("z"));
    assert_eq!(model.get(&updated, Some(&right)).unwrap(), Value::str("b"));
    // The original record is untouched
    assert_eq!(model.get(&original, Some(&left)).unwrap(), Value::str("a"));

    assert!(matches!(
        model.set(&original, Some(&right), Value::Int(1)),
        Err(ModelError::TypeMismatch { .. })
    ));
}

#[test]
fn test_record_without_constructor_copies_slots() {
    let pair = ClassBuilder::record("RecordCopied")
        .component(ComponentDecl::new("count", ClassId::INT))
        .component(ComponentDecl::new("name", ClassId::STRING))
        .register()
        .unwrap();
    let model = Model::of(pair).unwrap();
    let count = property(&model, "count");

    let original = Value::object(Instance::new(pair).unwrap());
    assert_eq!(model.get(&original, Some(&count)).unwrap(), Value::Int(0));

    let updated = model.set(&original, Some(&count), Value::Int(3)).unwrap();
    assert_eq!(updated.as_instance().unwrap().class(), pair);
    assert_eq!(model.get(&updated, Some(&count)).unwrap(), Value::Int(3));
    assert_eq!(model.get(&original, Some(&count)).unwrap(), Value::Int(0));
}

#[test]
fn test_generic_record_components() {
    let entry = ClassBuilder::record("RecordEntry");
    let v = entry.var("V");
    let entry = entry
        .type_param("V")
        .component(ComponentDecl::new("key", ClassId::STRING))
        .component(ComponentDecl::new("value", v))
        .register()
        .unwrap();

    let ty = Type::parameterized(entry, vec![ClassId::BOXED_DOUBLE.into()]);
    let model = Model::of_type(&ty).unwrap();
    assert_eq!(property(&model, "value").ty(), &Type::class(ClassId::BOXED_DOUBLE));

    let raw = Model::of(entry).unwrap();
    assert_eq!(property(&raw, "value").ty(), &Type::class(ClassId::OBJECT));
    assert!(!Arc::ptr_eq(&model, &raw));
}
