// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the worker kernel and a simulated run.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use execution_gateway::kernel;
use execution_gateway::{
    CycleModel, ExecutionGateway, ProgramRef, SimulatedConfig, SimulatedGateway,
};
use keyspace_planner::WorkerParams;

fn bench_permute_key(c: &mut Criterion) {
    c.bench_function("permute_key/64-loops", |b| {
        b.iter(|| kernel::permute_key(black_box(0xDEAD_BEEF), black_box(64)))
    });
}

fn bench_simulated_run(c: &mut Criterion) {
    let gw = SimulatedGateway::new(SimulatedConfig {
        available_units: 2,
        threads_per_unit: 8,
        cycle_model: CycleModel::PerPermutation(1),
        ..Default::default()
    });
    let units = gw.allocate(0).unwrap();
    let program = ProgramRef::new(kernel::KERNEL_NAME);
    for (u, unit) in units.iter().enumerate() {
        gw.load_program(unit, &program).unwrap();
        for t in 0..8u32 {
            let fkey = (u as u32 * 8 + t) * 16;
            gw.send_params(unit, t, WorkerParams { fkey, lkey: fkey + 16, loops: 16 })
                .unwrap();
        }
    }

    c.bench_function("simulated_run/2x8x16keys", |b| {
        b.iter(|| gw.run_all(black_box(&units)).unwrap())
    });
    gw.release(&units);
}

criterion_group!(benches, bench_permute_key, bench_simulated_run);
criterion_main!(benches);
