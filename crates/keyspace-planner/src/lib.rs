// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # keyspace-planner
//!
//! Splits a half-open key range into contiguous per-worker sub-ranges and
//! encodes each worker's dispatch parameters.
//!
//! # Strategies
//!
//! | Strategy | Remainder placement | `0..10` over 4 workers |
//! |---|---|---|
//! | [`FrontLoaded`] (default) | earliest workers | `3, 3, 2, 2` |
//! | [`Ceiling`] | interleaved | `3, 2, 3, 2` |
//!
//! Both cover the range exactly once with no gaps or overlaps, and sub-range
//! sizes differ by at most one key.
//!
//! # Example
//! ```
//! use keyspace_planner::{plan_dispatch, FrontLoaded, GlobalRange};
//!
//! let range = GlobalRange::new(0, 16).unwrap();
//! let plan = plan_dispatch(&FrontLoaded::new(), range, 1, 2, 2).unwrap();
//! assert_eq!(plan.num_workers(), 4);
//! assert_eq!(plan.assignments[3].params.fkey, 12);
//! ```

mod error;
mod params;
mod plan;
mod range;
pub mod strategy;

pub use error::PlannerError;
pub use params::{WorkerId, WorkerParams, PARAMS_RECORD_BYTES};
pub use plan::{DispatchPlan, WorkerAssignment};
pub use range::{GlobalRange, KeyRange};
pub use strategy::ceiling::Ceiling;
pub use strategy::front_loaded::FrontLoaded;
pub use strategy::PartitionStrategy;

/// Partitions `range` with the default [`FrontLoaded`] strategy.
pub fn partition(range: GlobalRange, worker_count: u32) -> Result<Vec<KeyRange>, PlannerError> {
    FrontLoaded::new().partition(range, worker_count)
}

/// Partitions `range` across `unit_count * threads_per_unit` workers and
/// encodes one [`WorkerParams`] record per worker with `loops` broadcast.
///
/// The returned plan has already passed [`DispatchPlan::validate`].
pub fn plan_dispatch(
    strategy: &dyn PartitionStrategy,
    range: GlobalRange,
    loops: u64,
    unit_count: u32,
    threads_per_unit: u32,
) -> Result<DispatchPlan, PlannerError> {
    let worker_count = unit_count
        .checked_mul(threads_per_unit)
        .ok_or_else(|| {
            PlannerError::InvalidPlan(format!(
                "{unit_count} units x {threads_per_unit} threads overflows the worker index"
            ))
        })?;

    let ranges = strategy.partition(range, worker_count)?;
    let loops_field = u32::try_from(loops).map_err(|_| PlannerError::KeyOverflow {
        field: "loops",
        value: loops,
    })?;

    let mut builder = plan::PlanBuilder::new(
        strategy.name(),
        range,
        loops_field,
        unit_count,
        threads_per_unit,
    );
    for sub in ranges {
        let params = WorkerParams::encode(sub, loops)?;
        let worker = builder.add_worker(params);
        tracing::debug!("worker {worker} assigned {}->{}", params.fkey, params.lkey);
    }

    let plan = builder.build();
    plan.validate()?;
    tracing::info!("{}", plan.summary());
    Ok(plan)
}
