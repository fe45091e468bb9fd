// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for range partitioning and plan construction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keyspace_planner::{plan_dispatch, Ceiling, FrontLoaded, GlobalRange, PartitionStrategy};

fn bench_partition(c: &mut Criterion) {
    let range = GlobalRange::new(0, 1 << 30).unwrap();
    let mut group = c.benchmark_group("partition");
    group.bench_function("front-loaded/2560", |b| {
        b.iter(|| FrontLoaded::new().partition(black_box(range), black_box(2560)))
    });
    group.bench_function("ceiling/2560", |b| {
        b.iter(|| Ceiling::new().partition(black_box(range), black_box(2560)))
    });
    group.finish();
}

fn bench_plan_dispatch(c: &mut Criterion) {
    let range = GlobalRange::new(0, 1 << 24).unwrap();
    c.bench_function("plan_dispatch/64x16", |b| {
        b.iter(|| plan_dispatch(&FrontLoaded::new(), black_box(range), 1 << 20, 64, 16))
    });
}

criterion_group!(benches, bench_partition, bench_plan_dispatch);
criterion_main!(benches);
