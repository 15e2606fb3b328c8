#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use service_container::{supertypes, Constructor, Container, InstantiateResult, Kind, Service, Supertype};
use std::sync::Arc;

trait Handler: Send + Sync {}

struct A(i32);
struct B(String, u64);
struct C(Service);

impl Handler for A {}
impl Handler for B {}

impl Constructor for A {
    type Args = (i32,);

    fn supertypes() -> Vec<Supertype> {
        supertypes![dyn Handler]
    }

    fn construct(_: Option<Container>, (value,): Self::Args) -> InstantiateResult<Arc<Self>> {
        Ok(Arc::new(Self(value)))
    }
}

impl Constructor for B {
    type Args = (String, u64);

    fn supertypes() -> Vec<Supertype> {
        supertypes![dyn Handler]
    }

    fn construct(_: Option<Container>, (name, value): Self::Args) -> InstantiateResult<Arc<Self>> {
        Ok(Arc::new(Self(name, value)))
    }
}

impl Constructor for C {
    type Args = ();

    const KINDS: &'static [Kind] = &[Kind::Service];

    fn construct(container: Option<Container>, (): ()) -> InstantiateResult<Arc<Self>> {
        Ok(Arc::new(Self(Service::new(container))))
    }
}

#[inline]
fn container_with_factories() -> Container {
    let container = Container::new();
    container
        .add::<A>((1,))
        .add::<B>(("b".to_owned(), 2))
        .add::<C>(());
    container
}

#[inline]
fn container_child_with_hierarchy(container: Container) -> Container {
    let app = Container::with_parent(container);
    let session = Container::with_parent(app);
    let request = Container::with_parent(session);
    Container::with_parent(request)
}

#[inline]
fn container_get(container: &Container) {
    let _ = container.get::<A>().unwrap();
    let _ = container.get::<B>().unwrap();
    let _ = container.get::<C>().unwrap();
}

fn criterion_benchmark(c: &mut Criterion) {
    let container_1 = container_with_factories();
    let container_2 = container_with_factories();
    container_get(&container_2);
    let container_3 = container_child_with_hierarchy(container_2.clone());

    c.bench_function("container_new_with_factories", |b| b.iter(container_with_factories))
        .bench_function("container_child_with_hierarchy", |b| {
            b.iter(|| container_child_with_hierarchy(container_1.clone()))
        })
        .bench_function("container_get", |b| b.iter(|| container_get(&container_with_factories())))
        .bench_function("container_get_with_cache", |b| b.iter(|| container_get(&container_2)))
        .bench_function("container_get_from_parent", |b| b.iter(|| container_get(&container_3)))
        .bench_function("container_get_subtype", |b| {
            b.iter(|| container_2.get_registered::<dyn Handler>().unwrap())
        })
        .bench_function("container_get_with", |b| {
            b.iter(|| container_1.get_with::<A>((3,)).unwrap())
        })
        .bench_function("container_find", |b| b.iter(|| container_2.find::<dyn Handler>().unwrap()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
