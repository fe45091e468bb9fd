// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Example: Compare partitioning strategies and run one search batch.
//!
//! Shows how the two strategies split an uneven range, then runs the
//! type-state pipeline on the simulated gateway and prints both summary
//! lines.
//!
//! ```bash
//! cargo run -p runtime --example strategy_comparison
//! ```

use keyspace_planner::{plan_dispatch, Ceiling, FrontLoaded, GlobalRange, PartitionStrategy};
use runtime::{RuntimeConfig, SearchEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing.
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let strategies: Vec<Box<dyn PartitionStrategy>> =
        vec![Box::new(FrontLoaded::new()), Box::new(Ceiling::new())];

    let cases = [(0u64, 10u64, 4u32), (0, 1000, 7), (3, 5, 4)];

    println!(
        "{:<14} {:>12} {:>8} {:>8} {:>8}  Sizes",
        "Strategy", "Range", "Workers", "Min", "Max",
    );
    println!("{}", "-".repeat(70));

    for strategy in &strategies {
        for &(first, last, workers) in &cases {
            let range = GlobalRange::new(first, last)?;
            let parts = strategy.partition(range, workers)?;
            let sizes: Vec<u64> = parts.iter().map(|p| p.len()).collect();
            println!(
                "{:<14} {:>12} {:>8} {:>8} {:>8}  {:?}",
                strategy.name(),
                range.to_string(),
                workers,
                sizes.iter().min().copied().unwrap_or(0),
                sizes.iter().max().copied().unwrap_or(0),
                sizes,
            );
        }
    }

    // Plan without running.
    let range = GlobalRange::new(0, 4096)?;
    let plan = plan_dispatch(&FrontLoaded::new(), range, 64, 4, 16)?;
    println!("\nPlan: {}\n", plan.summary());

    println!("--- Running 0..4096 x 64 loops on the simulated gateway ---\n");
    let config = RuntimeConfig {
        first_key: 0,
        last_key: 4096,
        loops: 64,
        ..Default::default()
    };

    let engine = SearchEngine::new(config)?.allocate()?.dispatch()?;

    // Run using tokio.
    let rt = tokio::runtime::Runtime::new()?;
    let output = rt.block_on(engine.run())?;

    for (unit, agg) in output.reduction.units.iter().enumerate() {
        println!("unit {unit:02}: sum={:016x} cycles={}", agg.sum, agg.cycles);
    }
    println!("{}", output.host_line());
    println!("{}", output.device_line());
    println!("Timings: {}", output.timings.summary());

    Ok(())
}
