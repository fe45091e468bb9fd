// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `keyspace-rt run` command: search one range and print the report.
//!
//! Demonstrates the full type-state pipeline:
//! ```text
//! SearchEngine<Idle> → allocate → <Loaded> → dispatch → <Dispatched> → run
//! ```

use keyspace_planner::DispatchPlan;
use runtime::{RuntimeConfig, SearchEngine, SearchOutput};

#[derive(serde::Serialize)]
struct RunReport<'a> {
    gateway: &'a str,
    plan: &'a DispatchPlan,
    output: &'a SearchOutput,
}

pub async fn execute(config: RuntimeConfig, json: bool) -> anyhow::Result<()> {
    let gateway = config.create_gateway()?;
    let gateway_name = gateway.name().to_string();
    let threads = gateway.threads_per_unit();

    // Step 1: Idle → Loaded (lease units, load the program).
    let loaded = SearchEngine::with_gateway(config, gateway).allocate()?;
    if !json {
        println!(
            "Allocated {} unit(s) x {threads} thread(s) on '{gateway_name}'",
            loaded.units().len(),
        );
    }

    // Step 2: Loaded → Dispatched (partition and send parameters).
    let engine = loaded.dispatch()?;
    if !json {
        print_assignments(engine.plan());
    }

    // Step 3: run, collect, reduce.
    let output = engine.run().await?;

    if json {
        let report = RunReport {
            gateway: &gateway_name,
            plan: engine.plan(),
            output: &output,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_output(&output);
    }

    engine.release();
    Ok(())
}

pub fn print_assignments(plan: &DispatchPlan) {
    for a in &plan.assignments {
        println!("Thread {} {}->{}", a.worker, a.params.fkey, a.params.lkey);
    }
}

fn print_output(output: &SearchOutput) {
    for (unit, agg) in output.reduction.units.iter().enumerate() {
        println!("Unit {unit:02} cycle count = {} cc", agg.cycles);
    }
    println!("{}", output.host_line());
    println!("{}", output.device_line());
    tracing::info!(
        "host {} Mkeys/s, device {} Mkeys/s per unit; {}",
        super::mkeys(output.throughput.host_mkeys_per_sec),
        super::mkeys(output.throughput.device_mkeys_per_sec),
        output.timings.summary(),
    );
}
