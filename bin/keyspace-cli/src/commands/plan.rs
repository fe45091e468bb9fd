// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `keyspace-rt plan` command: show how a range would be split.

use runtime::RuntimeConfig;

pub fn execute(config: RuntimeConfig, json: bool) -> anyhow::Result<()> {
    // Without a lease, `units = 0` means "as many as the simulator exposes".
    let unit_count = if config.units == 0 {
        config.simulated_units
    } else {
        config.units
    };

    let strategy = config.create_strategy()?;
    let plan = keyspace_planner::plan_dispatch(
        strategy.as_ref(),
        config.range()?,
        config.loops,
        unit_count,
        config.threads_per_unit,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("{}", plan.summary());
    println!(
        "Work: {} key-iterations, {} of {} workers active",
        plan.total_work(),
        plan.active_workers(),
        plan.num_workers(),
    );
    super::run::print_assignments(&plan);
    Ok(())
}
