// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dispatch plan: the output of the keyspace planner.
//!
//! A plan holds one [`WorkerAssignment`] per worker thread, ordered by linear
//! worker index. It is the contract between the planner and the runtime:
//! the runtime sends each assignment's parameters to its worker verbatim.

use crate::{GlobalRange, PlannerError, WorkerId, WorkerParams};

/// The parameters sent to a single worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct WorkerAssignment {
    /// Which unit/thread receives these parameters.
    pub worker: WorkerId,
    /// The encoded sub-range and loop count.
    pub params: WorkerParams,
}

/// The complete dispatch plan for one search batch.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DispatchPlan {
    /// Strategy name that produced this plan.
    pub strategy_name: String,
    /// The global key range being searched.
    pub range: GlobalRange,
    /// Iterations per key, identical for every worker.
    pub loops: u32,
    /// Number of execution units.
    pub unit_count: u32,
    /// Worker threads per unit.
    pub threads_per_unit: u32,
    /// Per-worker assignments, indexed by linear worker index.
    pub assignments: Vec<WorkerAssignment>,
}

impl DispatchPlan {
    /// Total number of workers (`unit_count * threads_per_unit`).
    pub fn num_workers(&self) -> usize {
        self.assignments.len()
    }

    /// Number of keys in the global range.
    pub fn total_keys(&self) -> u64 {
        self.range.len()
    }

    /// Total work `loops * keys`, in permutation evaluations.
    pub fn total_work(&self) -> u128 {
        u128::from(self.loops) * u128::from(self.total_keys())
    }

    /// Number of workers that received at least one key.
    pub fn active_workers(&self) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.params.num_keys() > 0)
            .count()
    }

    /// Assignments belonging to `unit`, in thread order.
    pub fn unit_assignments(&self, unit: u32) -> &[WorkerAssignment] {
        let threads = self.threads_per_unit as usize;
        let start = (unit as usize).saturating_mul(threads).min(self.assignments.len());
        let end = start.saturating_add(threads).min(self.assignments.len());
        &self.assignments[start..end]
    }

    /// Validates the plan.
    ///
    /// Checks:
    /// - Worker count equals `unit_count * threads_per_unit`.
    /// - Each assignment's worker id agrees with its linear position.
    /// - Every sub-range is well-formed (`fkey <= lkey`).
    /// - Sub-ranges are contiguous and tile the global range exactly.
    /// - `loops` is identical across all workers.
    pub fn validate(&self) -> Result<(), PlannerError> {
        let expected_workers = u64::from(self.unit_count) * u64::from(self.threads_per_unit);
        if expected_workers == 0 {
            return Err(PlannerError::NoWorkers);
        }
        if self.assignments.len() as u64 != expected_workers {
            return Err(PlannerError::InvalidPlan(format!(
                "expected {expected_workers} workers, plan has {}",
                self.assignments.len(),
            )));
        }

        let mut expected_fkey = self.range.first();

        for (idx, assignment) in self.assignments.iter().enumerate() {
            let expected_id = WorkerId::from_linear(idx as u32, self.threads_per_unit);
            if assignment.worker != expected_id {
                return Err(PlannerError::InvalidPlan(format!(
                    "worker at index {idx} is {}, expected {expected_id}",
                    assignment.worker,
                )));
            }

            let p = assignment.params;
            if p.loops != self.loops {
                return Err(PlannerError::InvalidPlan(format!(
                    "worker {} has loops={}, plan broadcasts {}",
                    assignment.worker, p.loops, self.loops,
                )));
            }
            if u64::from(p.fkey) != expected_fkey {
                return Err(PlannerError::InvalidPlan(format!(
                    "worker {} starts at {}, expected {expected_fkey}",
                    assignment.worker, p.fkey,
                )));
            }
            if p.lkey < p.fkey {
                return Err(PlannerError::InvalidPlan(format!(
                    "worker {} has inverted range {}->{}",
                    assignment.worker, p.fkey, p.lkey,
                )));
            }
            expected_fkey = u64::from(p.lkey);
        }

        if expected_fkey != self.range.last() {
            return Err(PlannerError::InvalidPlan(format!(
                "assignments end at {expected_fkey}, range ends at {}",
                self.range.last(),
            )));
        }

        Ok(())
    }

    /// Returns a human-readable summary of the plan.
    pub fn summary(&self) -> String {
        let sizes = self.assignments.iter().map(|a| a.params.num_keys());
        let min = sizes.clone().min().unwrap_or(0);
        let max = sizes.max().unwrap_or(0);

        format!(
            "Plan '{}': {} keys {} x {} loops over {} units x {} threads \
             ({} workers, {} active), keys/worker {}..={}",
            self.strategy_name,
            self.total_keys(),
            self.range,
            self.loops,
            self.unit_count,
            self.threads_per_unit,
            self.num_workers(),
            self.active_workers(),
            min,
            max,
        )
    }
}

/// Builder helper for constructing a `DispatchPlan` incrementally.
///
/// Worker ids are assigned in push order.
pub(crate) struct PlanBuilder {
    strategy_name: String,
    range: GlobalRange,
    loops: u32,
    unit_count: u32,
    threads_per_unit: u32,
    assignments: Vec<WorkerAssignment>,
}

impl PlanBuilder {
    /// Creates a new builder.
    pub fn new(
        strategy_name: &str,
        range: GlobalRange,
        loops: u32,
        unit_count: u32,
        threads_per_unit: u32,
    ) -> Self {
        Self {
            strategy_name: strategy_name.to_string(),
            range,
            loops,
            unit_count,
            threads_per_unit,
            assignments: Vec::with_capacity(unit_count as usize * threads_per_unit as usize),
        }
    }

    /// Appends the next worker's parameters.
    pub fn add_worker(&mut self, params: WorkerParams) -> WorkerId {
        let worker = WorkerId::from_linear(self.assignments.len() as u32, self.threads_per_unit);
        self.assignments.push(WorkerAssignment { worker, params });
        worker
    }

    /// Consumes the builder and returns the finished plan.
    pub fn build(self) -> DispatchPlan {
        DispatchPlan {
            strategy_name: self.strategy_name,
            range: self.range,
            loops: self.loops,
            unit_count: self.unit_count,
            threads_per_unit: self.threads_per_unit,
            assignments: self.assignments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(fkey: u32, lkey: u32) -> WorkerParams {
        WorkerParams { fkey, lkey, loops: 1 }
    }

    fn sample_plan() -> DispatchPlan {
        let mut b = PlanBuilder::new("test", GlobalRange::new(0, 16).unwrap(), 1, 2, 2);
        b.add_worker(params(0, 4));
        b.add_worker(params(4, 8));
        b.add_worker(params(8, 12));
        b.add_worker(params(12, 16));
        b.build()
    }

    #[test]
    fn test_validate_ok() {
        sample_plan().validate().unwrap();
    }

    #[test]
    fn test_counts() {
        let plan = sample_plan();
        assert_eq!(plan.num_workers(), 4);
        assert_eq!(plan.total_keys(), 16);
        assert_eq!(plan.total_work(), 16);
        assert_eq!(plan.active_workers(), 4);
    }

    #[test]
    fn test_builder_assigns_worker_ids() {
        let plan = sample_plan();
        let ids: Vec<WorkerId> = plan.assignments.iter().map(|a| a.worker).collect();
        assert_eq!(
            ids,
            vec![
                WorkerId::new(0, 0),
                WorkerId::new(0, 1),
                WorkerId::new(1, 0),
                WorkerId::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_unit_assignments() {
        let plan = sample_plan();
        let unit1 = plan.unit_assignments(1);
        assert_eq!(unit1.len(), 2);
        assert_eq!(unit1[0].params.fkey, 8);
        assert!(plan.unit_assignments(9).is_empty());
    }

    #[test]
    fn test_validate_gap() {
        let mut plan = sample_plan();
        plan.assignments[2].params.fkey = 9;
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_validate_short_coverage() {
        let mut plan = sample_plan();
        plan.assignments[3].params.lkey = 15;
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_validate_loops_not_broadcast() {
        let mut plan = sample_plan();
        plan.assignments[1].params.loops = 2;
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_validate_worker_count() {
        let mut plan = sample_plan();
        plan.assignments.pop();
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_validate_bad_worker_id() {
        let mut plan = sample_plan();
        plan.assignments[1].worker = WorkerId::new(1, 1);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_summary() {
        let s = sample_plan().summary();
        assert!(s.contains("'test'"));
        assert!(s.contains("16 keys"));
        assert!(s.contains("2 units x 2 threads"));
    }
}
