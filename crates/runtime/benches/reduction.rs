// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for result reduction.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use runtime::{reduce, Reducer, WorkerId, WorkerResult};

fn synthetic_results(workers: usize) -> Vec<WorkerResult> {
    (0..workers as u64)
        .map(|i| WorkerResult::new(i.wrapping_mul(0x9e37_79b9_7f4a_7c15), 1_000 + i % 97))
        .collect()
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    for units in [1u32, 8, 64, 256] {
        let results = synthetic_results(units as usize * 16);
        group.bench_with_input(BenchmarkId::from_parameter(units), &results, |b, r| {
            b.iter(|| reduce(black_box(r), units, 16))
        });
    }
    group.finish();
}

fn bench_reducer_reverse_order(c: &mut Criterion) {
    let results = synthetic_results(64 * 16);
    c.bench_function("reducer/reverse/64x16", |b| {
        b.iter(|| {
            let mut reducer = Reducer::new(64, 16).unwrap();
            for (idx, r) in results.iter().enumerate().rev() {
                reducer
                    .absorb(WorkerId::from_linear(idx as u32, 16), *r)
                    .unwrap();
            }
            reducer.finish().unwrap()
        })
    });
}

criterion_group!(benches, bench_reduce, bench_reducer_reverse_order);
criterion_main!(benches);
