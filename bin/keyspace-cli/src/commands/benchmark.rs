// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `keyspace-rt benchmark` command: sweep unit counts and strategies.
//!
//! Runs the same search with every combination and prints a comparison
//! table with host and device throughput. Every run must produce the same
//! checksum; a mismatch is reported as an error.

use anyhow::Context;
use runtime::{RuntimeConfig, SearchEngine};

#[derive(Debug, serde::Serialize)]
struct BenchResult {
    strategy: String,
    units: u32,
    checksum: u64,
    max_cycles: u64,
    host_seconds: f64,
    host_mkeys_per_sec: f64,
    device_mkeys_per_sec: f64,
}

pub async fn execute(
    config: RuntimeConfig,
    sweep_units: &str,
    strategies: &str,
    json: bool,
) -> anyhow::Result<()> {
    // Parse comma-separated unit counts.
    let unit_counts: Vec<u32> = sweep_units
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<u32>()
                .with_context(|| format!("invalid unit count '{}'", s.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if unit_counts.contains(&0) {
        anyhow::bail!("unit counts in a sweep must be at least 1");
    }

    let strategy_names: Vec<&str> = strategies.split(',').map(|s| s.trim()).collect();

    if !json {
        println!(
            "Range [{}, {}) x {} loops, {} thread(s) per unit",
            config.first_key, config.last_key, config.loops, config.threads_per_unit,
        );
        println!(
            "{:<14} {:>6} {:>18} {:>14} {:>12} {:>12} {:>12}",
            "Strategy", "Units", "Checksum", "Max cycles", "Seconds", "Host Mk/s", "Dev Mk/s",
        );
        println!("{}", "-".repeat(94));
    }

    let mut results: Vec<BenchResult> = Vec::new();
    for &strategy in &strategy_names {
        for &units in &unit_counts {
            let r = run_single(&config, strategy, units)
                .await
                .with_context(|| format!("benchmark '{strategy}' on {units} unit(s) failed"))?;
            if !json {
                println!(
                    "{:<14} {:>6} {:>18x} {:>14} {:>12.6} {:>12} {:>12}",
                    r.strategy,
                    r.units,
                    r.checksum,
                    r.max_cycles,
                    r.host_seconds,
                    super::mkeys(r.host_mkeys_per_sec),
                    super::mkeys(r.device_mkeys_per_sec),
                );
            }
            results.push(r);
        }
    }

    if let Some(first) = results.first() {
        if let Some(bad) = results.iter().find(|r| r.checksum != first.checksum) {
            anyhow::bail!(
                "checksum mismatch: {} on {} unit(s) gave {:x}, expected {:x}",
                bad.strategy,
                bad.units,
                bad.checksum,
                first.checksum,
            );
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let fastest = results
        .iter()
        .filter(|r| r.host_mkeys_per_sec.is_finite())
        .max_by(|a, b| a.host_mkeys_per_sec.total_cmp(&b.host_mkeys_per_sec));
    if let Some(f) = fastest {
        println!();
        println!(
            "Fastest: {} on {} unit(s) ({} Mkeys/s host)",
            f.strategy,
            f.units,
            super::mkeys(f.host_mkeys_per_sec),
        );
    }
    Ok(())
}

/// Runs one configuration on a fresh simulated gateway.
async fn run_single(base: &RuntimeConfig, strategy: &str, units: u32) -> anyhow::Result<BenchResult> {
    let config = RuntimeConfig {
        strategy: strategy.to_string(),
        units,
        simulated_units: base.simulated_units.max(units),
        ..base.clone()
    };

    let engine = SearchEngine::new(config)?.allocate()?.dispatch()?;
    let output = engine.run().await?;

    Ok(BenchResult {
        strategy: strategy.to_string(),
        units: output.unit_count,
        checksum: output.checksum(),
        max_cycles: output.max_cycles(),
        host_seconds: output.throughput.host_seconds,
        host_mkeys_per_sec: output.throughput.host_mkeys_per_sec,
        device_mkeys_per_sec: output.throughput.device_mkeys_per_sec,
    })
}
