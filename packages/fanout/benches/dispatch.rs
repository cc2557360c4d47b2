//! Benchmarks for registry fan-out and declarative table dispatch overhead.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint;

use criterion::{Criterion, criterion_group, criterion_main};
use fanout::{EventTable, Track};

fn fan_out_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");

    let track = Track::<u32, u32, String>::new();
    track.register("tick", |input| Ok(input + 1));

    group.bench_function("invoke_one_callback", |b| {
        b.iter(|| {
            let results = track.invoke("tick", hint::black_box(&1)).unwrap();
            hint::black_box(results);
        });
    });

    let wide = Track::<u32, u32, String>::new();
    for _ in 0..16 {
        wide.register("tick", |input| Ok(input + 1));
    }

    group.bench_function("invoke_sixteen_callbacks", |b| {
        b.iter(|| {
            let results = wide.invoke("tick", hint::black_box(&1)).unwrap();
            hint::black_box(results);
        });
    });

    group.bench_function("register_and_remove", |b| {
        b.iter(|| {
            let id = track.register("churn", |input| Ok(*input));
            hint::black_box(track.remove(&id));
        });
    });

    group.finish();
}

fn table_dispatch_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_dispatch");

    fn bump(total: &mut u32, amount: &u32) -> u32 {
        *total += amount;
        *total
    }

    let table = EventTable::builder().on("bump", bump).build();

    group.bench_function("invoke_bound_handler", |b| {
        let mut total = 0_u32;

        b.iter(|| {
            let result = table.invoke(&mut total, "bump", hint::black_box(&1));
            hint::black_box(result);
        });
    });

    group.finish();
}

criterion_group!(benches, fan_out_overhead, table_dispatch_overhead);
criterion_main!(benches);
