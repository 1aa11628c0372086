//! Model caching and identity under concurrency

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use raya_model::{ClassBuilder, ClassId, FieldDecl, Model, ModelError, ModelRegistry, Type};

#[test]
fn test_same_type_same_model() {
    common::init_tracing();
    let class = ClassBuilder::new("IdentityPlain")
        .field(FieldDecl::public("name", ClassId::STRING))
        .register()
        .unwrap();

    let a = Model::of(class).unwrap();
    let b = Model::of(class).unwrap();
    let c = Model::of_type(&Type::class(class)).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &c));
    assert!(ModelRegistry::global().contains(&Type::class(class)));

    // Property identity follows model identity
    let p1 = a.property("name").unwrap();
    let p2 = b.property("name").unwrap();
    assert!(Arc::ptr_eq(&p1, &p2));
}

#[test]
fn test_concurrent_builders_share_one_model() {
    const THREADS: usize = 8;

    let class = ClassBuilder::new("IdentityConcurrent")
        .field(FieldDecl::public("a", ClassId::INT))
        .field(FieldDecl::public("b", ClassId::STRING))
        .register()
        .unwrap();

    let barrier = Barrier::new(THREADS);
    let models: Vec<Arc<Model>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    Model::of(class).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = &models[0];
    for model in &models[1..] {
        assert!(Arc::ptr_eq(first, model));
    }
    assert!(Arc::ptr_eq(first, &Model::of(class).unwrap()));
}

#[test]
fn test_parameterizations_are_distinct() {
    let boxed = ClassBuilder::new("IdentityBox");
    let t = boxed.var("T");
    let boxed = boxed
        .type_param("T")
        .field(FieldDecl::public("content", t))
        .register()
        .unwrap();

    let strings = Model::of_type(&Type::parameterized(boxed, vec![ClassId::STRING.into()])).unwrap();
    let ints = Model::of_type(&Type::parameterized(boxed, vec![ClassId::BOXED_INT.into()])).unwrap();
    let raw = Model::of(boxed).unwrap();

    assert!(!Arc::ptr_eq(&strings, &ints));
    assert!(!Arc::ptr_eq(&strings, &raw));
    assert_eq!(strings.to_string(), "IdentityBox<String>");
}

#[test]
fn test_unknown_class_is_an_error() {
    // Reserved by a builder that is never registered
    let pending = ClassBuilder::new("IdentityNeverRegistered");
    let result = Model::of(pending.id());
    assert!(matches!(result, Err(ModelError::UnknownClass { .. })));
    assert!(!ModelRegistry::global().contains(&Type::class(pending.id())));
}
