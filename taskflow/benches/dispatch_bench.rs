//! Benchmarks for the dispatch hot paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use taskflow::actions::{ActionMethod, TaskClassInfoStore, TaskType};
use taskflow::core::TaskNode;
use taskflow::dependencies::{Dependency, TaskDependencyResolver};

fn class_info_benchmark(c: &mut Criterion) {
    let store = TaskClassInfoStore::new();
    let base = TaskType::builder("Base")
        .action(ActionMethod::new("prepare", |_| Ok(())))
        .build();
    let task_type = TaskType::builder("Compile")
        .extends(&base)
        .action(ActionMethod::new("compile", |_| Ok(())))
        .action(ActionMethod::incremental("sync", |_, _| Ok(())))
        .build();

    c.bench_function("class_info_cached", |b| {
        b.iter(|| black_box(store.task_class_info(&task_type).is_ok()))
    });

    c.bench_function("class_info_uncached", |b| {
        b.iter(|| {
            store.evict(task_type.id());
            black_box(store.task_class_info(&task_type).is_ok())
        })
    });
}

fn resolution_benchmark(c: &mut Criterion) {
    let plain = TaskType::builder("Plain").build();
    let root = TaskNode::new(":root", Arc::clone(&plain)).into_ref();
    let leaves: Vec<_> = (0..100)
        .map(|i| TaskNode::new(format!(":leaf{i}"), Arc::clone(&plain)).into_ref())
        .collect();
    for chunk in leaves.chunks(10) {
        root.depends_on(Dependency::tasks(chunk.iter().cloned()));
    }
    let resolver = TaskDependencyResolver::new();

    c.bench_function("resolve_100_tasks", |b| {
        b.iter(|| black_box(resolver.resolve(&root).len()))
    });
}

criterion_group!(benches, class_info_benchmark, resolution_benchmark);
criterion_main!(benches);
