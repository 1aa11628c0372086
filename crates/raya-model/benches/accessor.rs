use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use once_cell::sync::Lazy;
use raya_model::{
    ClassBuilder, ClassId, FieldDecl, Instance, MethodDecl, Model, Modifiers, Type, Value,
};

static SAMPLE: Lazy<ClassId> = Lazy::new(|| {
    ClassBuilder::new("BenchSample")
        .field(FieldDecl::public("count", ClassId::INT))
        .field(FieldDecl::new("name", ClassId::STRING).modifiers(Modifiers::PRIVATE))
        .method(MethodDecl::getter("getName", ClassId::STRING, |this| {
            Ok(this
                .as_instance()
                .and_then(|instance| instance.slot(1))
                .unwrap_or(Value::Null))
        }))
        .register()
        .unwrap()
});

fn sample_class() -> ClassId {
    *SAMPLE
}

fn bench_field_access(c: &mut Criterion) {
    let class = sample_class();
    let model = Model::of(class).unwrap();
    let value = Value::object(Instance::new(class).unwrap());
    let count = model.property("count").unwrap();

    let mut group = c.benchmark_group("field");
    group.bench_function("get", |b| {
        b.iter(|| model.get(black_box(&value), Some(&count)).unwrap());
    });
    group.bench_function("set", |b| {
        b.iter(|| {
            model
                .set(black_box(&value), Some(&count), Value::Int(black_box(7)))
                .unwrap()
        });
    });
    group.finish();
}

fn bench_method_access(c: &mut Criterion) {
    let class = sample_class();
    let model = Model::of(class).unwrap();
    let value = Value::object(Instance::new(class).unwrap());
    let name = model.property("name").unwrap();

    c.bench_function("method_get", |b| {
        b.iter(|| model.get(black_box(&value), Some(&name)).unwrap());
    });
}

fn bench_model_lookup(c: &mut Criterion) {
    let class = sample_class();
    Model::of(class).unwrap();

    let mut group = c.benchmark_group("model_lookup");
    group.bench_function("class", |b| {
        b.iter(|| Model::of(black_box(class)).unwrap());
    });

    let list = Type::list_of(ClassId::STRING.into());
    Model::of_type(&list).unwrap();
    group.bench_with_input(BenchmarkId::new("type", "List<String>"), &list, |b, ty| {
        b.iter(|| Model::of_type(black_box(ty)).unwrap());
    });
    group.finish();
}

fn bench_list_elements(c: &mut Criterion) {
    let model = Model::of_type(&Type::list_of(ClassId::BOXED_INT.into())).unwrap();
    let mut group = c.benchmark_group("list_walk");

    for len in [8usize, 64, 512] {
        let list = Value::list((0..len as i32).map(Value::Int).collect());
        group.bench_with_input(BenchmarkId::from_parameter(len), &list, |b, list| {
            b.iter(|| {
                let mut total = 0i64;
                model
                    .walk(black_box(list), |_, _, v| {
                        if let Value::Int(n) = v {
                            total += i64::from(n);
                        }
                    })
                    .unwrap();
                total
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_field_access,
    bench_method_access,
    bench_model_lookup,
    bench_list_elements
);
criterion_main!(benches);
