//! Field-backed property tests
//!
//! Covers field eligibility (visibility, `@Managed`, static and final),
//! inheritance and shadowing, and typed reads and writes.

mod common;

use common::{names, property};
use raya_model::{
    AccessorKind, Annotation, ClassBuilder, ClassId, FieldDecl, Instance, MethodDecl, Model,
    ModelError, Modifiers, Type, Value,
};

fn person() -> ClassId {
    ClassBuilder::new("FieldPerson")
        .field(FieldDecl::public("name", ClassId::STRING))
        .field(FieldDecl::public("age", ClassId::INT))
        .field(FieldDecl::new("secret", ClassId::STRING))
        .field(FieldDecl::new("nick", ClassId::STRING).modifiers(Modifiers::PRIVATE).managed())
        .field(FieldDecl::public("id", ClassId::LONG).modifiers(Modifiers::PUBLIC | Modifiers::FINAL))
        .field(
            FieldDecl::public("COUNT", ClassId::INT).modifiers(Modifiers::PUBLIC | Modifiers::STATIC),
        )
        .field(
            FieldDecl::public("handle", ClassId::LONG).modifiers(Modifiers::PUBLIC | Modifiers::NATIVE),
        )
        .register()
        .unwrap()
}

// ============================================================================
// Eligibility
// ============================================================================

#[test]
fn test_field_eligibility() {
    common::init_tracing();
    let model = Model::of(person()).unwrap();

    // Public and @Managed fields only; shorter names first
    assert_eq!(names(&model), vec!["age", "name", "nick"]);
    assert!(model.property("secret").is_none());
    assert!(model.property("id").is_none());
    assert!(model.property("COUNT").is_none());
    assert!(model.property("handle").is_none());

    let age = property(&model, "age");
    assert_eq!(age.kind(), AccessorKind::Field);
    assert_eq!(age.ty(), &Type::class(ClassId::INT));
    assert!(age.is_readable());
    assert!(age.is_writable());
    assert!(!age.is_observable());
}

#[test]
fn test_managed_fields_regardless_of_visibility() {
    let class = ClassBuilder::new("FieldVisibility")
        .field(FieldDecl::public("open", ClassId::INT))
        .field(FieldDecl::new("prot", ClassId::INT).modifiers(Modifiers::PROTECTED))
        .field(FieldDecl::new("prot_m", ClassId::INT).modifiers(Modifiers::PROTECTED).managed())
        .field(FieldDecl::new("pack", ClassId::INT))
        .field(FieldDecl::new("pack_m", ClassId::INT).managed())
        .field(FieldDecl::new("priv_m", ClassId::INT).modifiers(Modifiers::PRIVATE).managed())
        .register()
        .unwrap();
    let model = Model::of(class).unwrap();

    assert_eq!(names(&model), vec!["open", "pack_m", "priv_m", "prot_m"]);
    assert!(model.property("prot").is_none());
    assert!(model.property("pack").is_none());

    let value = Value::object(Instance::new(class).unwrap());
    for name in ["pack_m", "priv_m", "prot_m"] {
        let managed = property(&model, name);
        model.set(&value, Some(&managed), Value::Int(3)).unwrap();
        assert_eq!(model.get(&value, Some(&managed)).unwrap(), Value::Int(3));
    }
}

// ============================================================================
// Access
// ============================================================================

#[test]
fn test_field_get_and_set() {
    let class = person();
    let model = Model::of(class).unwrap();
    let value = Value::object(Instance::new(class).unwrap());

    let age = property(&model, "age");
    let name = property(&model, "name");
    let nick = property(&model, "nick");

    // Defaults: zero for primitives, null otherwise
    assert_eq!(model.get(&value, Some(&age)).unwrap(), Value::Int(0));
    assert!(model.get(&value, Some(&name)).unwrap().is_null());

    let carrier = model.set(&value, Some(&age), Value::Int(42)).unwrap();
    assert_eq!(carrier, value);
    assert_eq!(model.get(&value, Some(&age)).unwrap(), Value::Int(42));

    // Widening conversion
    model.set(&value, Some(&age), Value::Short(7)).unwrap();
    assert_eq!(model.get(&value, Some(&age)).unwrap(), Value::Int(7));

    // Private @Managed field is reachable
    model.set(&value, Some(&nick), Value::str("Ada")).unwrap();
    assert_eq!(model.get(&value, Some(&nick)).unwrap(), Value::str("Ada"));

    // Strings may be null
    model.set(&value, Some(&name), Value::str("x")).unwrap();
    model.set(&value, Some(&name), Value::Null).unwrap();
    assert!(model.get(&value, Some(&name)).unwrap().is_null());
}

#[test]
fn test_field_type_mismatch() {
    let class = person();
    let model = Model::of(class).unwrap();
    let value = Value::object(Instance::new(class).unwrap());
    let age = property(&model, "age");
    let name = property(&model, "name");

    assert!(matches!(
        model.set(&value, Some(&age), Value::Null),
        Err(ModelError::TypeMismatch { .. })
    ));
    assert!(matches!(
        model.set(&value, Some(&age), Value::Long(1)),
        Err(ModelError::TypeMismatch { .. })
    ));
    assert!(matches!(
        model.set(&value, Some(&name), Value::Int(1)),
        Err(ModelError::TypeMismatch { .. })
    ));
    // Failed writes leave the slot untouched
    assert_eq!(model.get(&value, Some(&age)).unwrap(), Value::Int(0));
}

#[test]
fn test_foreign_instance_is_rejected() {
    let named = ClassBuilder::new("FieldNamed")
        .field(FieldDecl::public("name", ClassId::STRING))
        .register()
        .unwrap();
    let counted = ClassBuilder::new("FieldCounted")
        .field(FieldDecl::public("count", ClassId::INT))
        .register()
        .unwrap();
    let named_model = Model::of(named).unwrap();
    let counted_model = Model::of(counted).unwrap();
    let name = property(&named_model, "name");
    let count = property(&counted_model, "count");

    let other = Value::object(Instance::new(counted).unwrap());
    assert!(matches!(
        named_model.set(&other, Some(&name), Value::str("oops")),
        Err(ModelError::TypeMismatch { .. })
    ));
    assert!(matches!(
        named_model.get(&other, Some(&name)),
        Err(ModelError::TypeMismatch { .. })
    ));
    assert!(matches!(
        named_model.observe(&other, Some(&name)),
        Err(ModelError::TypeMismatch { .. })
    ));

    // The instance is untouched
    assert_eq!(counted_model.get(&other, Some(&count)).unwrap(), Value::Int(0));
}

#[test]
fn test_null_arguments() {
    let class = person();
    let model = Model::of(class).unwrap();
    let value = Value::object(Instance::new(class).unwrap());
    let age = property(&model, "age");

    assert!(model.get(&Value::Null, Some(&age)).unwrap().is_null());
    assert!(model.get(&value, None).unwrap().is_null());
    assert!(matches!(
        model.set(&Value::Null, Some(&age), Value::Int(1)),
        Err(ModelError::NullTarget { .. })
    ));
    assert!(matches!(
        model.set(&value, None, Value::Int(1)),
        Err(ModelError::NullTarget { .. })
    ));
    assert!(model.observe(&value, Some(&age)).unwrap().is_absent());
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn test_inherited_and_shadowed_fields() {
    let base = ClassBuilder::new("ShadowBase")
        .field(FieldDecl::public("value", ClassId::STRING))
        .field(FieldDecl::public("extra", ClassId::INT))
        .field(FieldDecl::public("kept", ClassId::STRING))
        .register()
        .unwrap();
    let derived = ClassBuilder::new("ShadowDerived")
        .extends(base)
        .field(FieldDecl::public("value", ClassId::BOXED_INT))
        // Not eligible, so the inherited `kept` stays visible
        .field(FieldDecl::new("kept", ClassId::LONG))
        .register()
        .unwrap();

    let model = Model::of(derived).unwrap();
    assert_eq!(names(&model), vec!["kept", "extra", "value"]);

    let value = property(&model, "value");
    assert_eq!(value.ty(), &Type::class(ClassId::BOXED_INT));
    assert_eq!(value.declaring(), derived);

    let kept = property(&model, "kept");
    assert_eq!(kept.ty(), &Type::class(ClassId::STRING));
    assert_eq!(kept.declaring(), base);

    // Inherited slots are addressed on subclass instances
    let instance = Value::object(Instance::new(derived).unwrap());
    let extra = property(&model, "extra");
    model.set(&instance, Some(&extra), Value::Int(5)).unwrap();
    model.set(&instance, Some(&value), Value::Int(6)).unwrap();
    assert_eq!(model.get(&instance, Some(&extra)).unwrap(), Value::Int(5));
    assert_eq!(model.get(&instance, Some(&value)).unwrap(), Value::Int(6));
}

#[test]
fn test_transient_and_renamed_fields() {
    let class = ClassBuilder::new("FieldFlags")
        .field(FieldDecl::public("cache", ClassId::STRING).modifiers(Modifiers::PUBLIC | Modifiers::TRANSIENT))
        .field(FieldDecl::public("scratch", ClassId::STRING).annotate(Annotation::Transient))
        .field(FieldDecl::new("x", ClassId::INT).annotate(Annotation::managed_as("position")))
        .field(FieldDecl::public("plain", ClassId::STRING).annotate(Annotation::marker_with("Column", "plain_col")))
        .register()
        .unwrap();
    let model = Model::of(class).unwrap();

    assert!(property(&model, "cache").is_transitory());
    assert!(property(&model, "scratch").is_transitory());
    assert!(!property(&model, "plain").is_transitory());

    assert!(model.property("x").is_none());
    assert_eq!(property(&model, "position").ty(), &Type::class(ClassId::INT));

    let plain = property(&model, "plain");
    assert!(plain.has_annotation("Column"));
    assert_eq!(
        plain.annotation("Column"),
        Some(&Annotation::marker_with("Column", "plain_col"))
    );
}

#[test]
fn test_fields_win_over_methods() {
    let class = ClassBuilder::new("FieldOverMethod")
        .field(FieldDecl::public("name", ClassId::STRING))
        .method(MethodDecl::getter("getName", ClassId::STRING, |_| Ok(Value::str("from method"))))
        .method(MethodDecl::getter("getTitle", ClassId::STRING, |_| Ok(Value::str("title"))))
        .register()
        .unwrap();
    let model = Model::of(class).unwrap();
    let instance = Value::object(Instance::new(class).unwrap());

    let name = property(&model, "name");
    assert_eq!(name.kind(), AccessorKind::Field);
    assert!(model.get(&instance, Some(&name)).unwrap().is_null());

    let title = property(&model, "title");
    assert_eq!(title.kind(), AccessorKind::MethodPair);
    assert_eq!(model.get(&instance, Some(&title)).unwrap(), Value::str("title"));
}

// ============================================================================
// Traversal
// ============================================================================

#[test]
fn test_walk_visits_properties_in_order() {
    let class = person();
    let model = Model::of(class).unwrap();
    let value = Value::object(Instance::new(class).unwrap());
    model
        .set(&value, Some(&property(&model, "name")), Value::str("Bob"))
        .unwrap();

    let mut seen = Vec::new();
    model
        .walk(&value, |m, p, v| {
            assert_eq!(m.class(), Some(class));
            seen.push((p.name().to_string(), v));
        })
        .unwrap();
    assert_eq!(
        seen,
        vec![
            ("age".to_string(), Value::Int(0)),
            ("name".to_string(), Value::str("Bob")),
            ("nick".to_string(), Value::Null),
        ]
    );

    // Walking nothing is not an error
    model.walk(&Value::Null, |_, _, _| panic!("visited")).unwrap();
}

#[test]
fn test_self_referencing_class() {
    let node = ClassBuilder::new("FieldNode");
    let id = node.id();
    let node = node
        .field(FieldDecl::public("next", id))
        .field(FieldDecl::public("label", ClassId::STRING))
        .register()
        .unwrap();

    let model = Model::of(node).unwrap();
    let next = property(&model, "next");
    // The nested model is the same published instance
    let nested = next.model().unwrap();
    assert!(std::sync::Arc::ptr_eq(&nested, &model));

    let first = Value::object(Instance::new(node).unwrap());
    let second = Value::object(Instance::new(node).unwrap());
    model.set(&first, Some(&next), second.clone()).unwrap();
    assert_eq!(model.get(&first, Some(&next)).unwrap(), second);

    // Unrelated objects are rejected
    let other = ClassBuilder::new("FieldNodeStranger").register().unwrap();
    let stranger = Value::object(Instance::new(other).unwrap());
    assert!(matches!(
        model.set(&first, Some(&next), stranger),
        Err(ModelError::TypeMismatch { .. })
    ));
}
