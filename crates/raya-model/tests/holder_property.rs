//! Holder (`Variable`) property tests

mod common;

use std::time::Duration;

use common::property;
use raya_model::{
    AccessorKind, ClassBuilder, ClassId, FieldDecl, Instance, Model, ModelError, Modifiers, Type,
    Value,
};

const FINAL: Modifiers = Modifiers::from_bits(Modifiers::PUBLIC.bits() | Modifiers::FINAL.bits());

fn document() -> ClassId {
    ClassBuilder::new("HolderDocument")
        .field(
            FieldDecl::public("title", Type::variable_of(ClassId::STRING.into()))
                .modifiers(FINAL)
                .init(|| Value::holder(Value::str("untitled"))),
        )
        .field(FieldDecl::public("pending", Type::variable_of(ClassId::BOXED_INT.into())).modifiers(FINAL))
        .field(
            FieldDecl::public("anything", ClassId::VARIABLE)
                .modifiers(FINAL)
                .init(|| Value::holder(Value::Null)),
        )
        .field(FieldDecl::public("version", ClassId::INT).modifiers(FINAL))
        .register()
        .unwrap()
}

#[test]
fn test_holder_properties_expose_content_type() {
    common::init_tracing();
    let model = Model::of(document()).unwrap();

    let title = property(&model, "title");
    assert_eq!(title.kind(), AccessorKind::Holder);
    assert_eq!(title.ty(), &Type::class(ClassId::STRING));
    assert!(title.is_readable() && title.is_writable() && title.is_observable());

    // Raw holder: content is Object
    assert_eq!(property(&model, "anything").ty(), &Type::class(ClassId::OBJECT));

    // Final plain fields are never properties
    assert!(model.property("version").is_none());
}

#[test]
fn test_holder_get_set_delegate() {
    let class = document();
    let model = Model::of(class).unwrap();
    let instance = Instance::new(class).unwrap();
    let value = Value::object(instance.clone());
    let title = property(&model, "title");

    assert_eq!(model.get(&value, Some(&title)).unwrap(), Value::str("untitled"));
    let carrier = model.set(&value, Some(&title), Value::str("Draft")).unwrap();
    assert_eq!(carrier, value);
    assert_eq!(model.get(&value, Some(&title)).unwrap(), Value::str("Draft"));

    // The holder itself is unchanged; only its content moved
    let holder = instance.slot(0).unwrap();
    assert_eq!(holder.as_holder().unwrap().get(), Value::str("Draft"));

    assert!(matches!(
        model.set(&value, Some(&title), Value::Int(3)),
        Err(ModelError::TypeMismatch { .. })
    ));
}

#[test]
fn test_holder_observe() {
    let class = document();
    let model = Model::of(class).unwrap();
    let value = Value::object(Instance::new(class).unwrap());
    let title = property(&model, "title");

    let signal = model.observe(&value, Some(&title)).unwrap();
    assert!(!signal.is_absent());

    model.set(&value, Some(&title), Value::str("one")).unwrap();
    model.set(&value, Some(&title), Value::str("two")).unwrap();
    assert_eq!(signal.next_timeout(Duration::from_secs(1)), Some(Value::str("one")));
    assert_eq!(signal.drain(), vec![Value::str("two")]);
}

#[test]
fn test_missing_holder() {
    let class = document();
    let model = Model::of(class).unwrap();
    let value = Value::object(Instance::new(class).unwrap());
    let pending = property(&model, "pending");
    assert_eq!(pending.ty(), &Type::class(ClassId::BOXED_INT));

    assert!(model.get(&value, Some(&pending)).unwrap().is_null());
    assert!(matches!(
        model.set(&value, Some(&pending), Value::Int(1)),
        Err(ModelError::NullTarget { .. })
    ));
    assert!(model.observe(&value, Some(&pending)).unwrap().is_absent());
}

#[test]
fn test_generic_holder_content() {
    let wrapper = ClassBuilder::new("HolderWrapper");
    let t = wrapper.var("T");
    let wrapper = wrapper
        .type_param("T")
        .field(FieldDecl::public("item", Type::variable_of(t)).modifiers(FINAL))
        .register()
        .unwrap();

    let specialized =
        Model::of_type(&Type::parameterized(wrapper, vec![ClassId::BOXED_LONG.into()])).unwrap();
    assert_eq!(
        property(&specialized, "item").ty(),
        &Type::class(ClassId::BOXED_LONG)
    );

    let raw = Model::of(wrapper).unwrap();
    assert_eq!(property(&raw, "item").ty(), &Type::class(ClassId::OBJECT));
}
