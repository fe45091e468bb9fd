// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Result reduction.
//!
//! Worker results fold into one [`UnitResult`] per unit and then into a single
//! [`GlobalResult`]:
//!
//! ```text
//! unit.sum      = XOR  of its threads' sums
//! unit.cycles   = MAX  of its threads' cycles   (slowest thread)
//! global.sum    = XOR  of unit sums
//! global.cycles = MAX  of unit cycles           (slowest unit)
//! ```
//!
//! XOR and max are commutative and associative, so the outcome does not
//! depend on the order results are retrieved in.

use crate::RuntimeError;
use execution_gateway::WorkerResult;
use keyspace_planner::WorkerId;

/// Aggregate over one unit's threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct UnitResult {
    pub sum: u64,
    pub cycles: u64,
}

impl UnitResult {
    fn absorb(&mut self, result: WorkerResult) {
        self.sum ^= result.sum;
        self.cycles = self.cycles.max(result.cycles);
    }
}

/// The final answer of a search batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct GlobalResult {
    pub sum: u64,
    pub max_cycles: u64,
}

/// Per-unit and global aggregates.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Reduction {
    pub global: GlobalResult,
    pub units: Vec<UnitResult>,
}

/// Incremental accumulator.
///
/// Results may be absorbed in any order. Each worker must be absorbed
/// exactly once before [`Reducer::finish`].
#[derive(Debug)]
pub struct Reducer {
    threads_per_unit: u32,
    units: Vec<UnitResult>,
    seen: Vec<bool>,
    absorbed: usize,
}

impl Reducer {
    /// Creates an accumulator for `unit_count * threads_per_unit` workers.
    pub fn new(unit_count: u32, threads_per_unit: u32) -> Result<Self, RuntimeError> {
        let workers = unit_count as usize * threads_per_unit as usize;
        Ok(Self {
            threads_per_unit,
            units: reserve_filled(unit_count as usize, UnitResult::default())?,
            seen: reserve_filled(workers, false)?,
            absorbed: 0,
        })
    }

    /// Folds one worker's result into its unit.
    pub fn absorb(&mut self, worker: WorkerId, result: WorkerResult) -> Result<(), RuntimeError> {
        let unexpected = |detail| RuntimeError::UnexpectedResult {
            unit: worker.unit,
            thread: worker.thread,
            detail,
        };
        if worker.thread >= self.threads_per_unit {
            return Err(unexpected("thread index outside the unit"));
        }
        let unit = self
            .units
            .get_mut(worker.unit as usize)
            .ok_or_else(|| unexpected("unit index outside the allocation"))?;
        // Widened so an arbitrary unit index cannot overflow.
        let idx = worker.unit as usize * self.threads_per_unit as usize + worker.thread as usize;
        if std::mem::replace(&mut self.seen[idx], true) {
            return Err(unexpected("result already absorbed"));
        }
        unit.absorb(result);
        self.absorbed += 1;
        Ok(())
    }

    /// Number of results absorbed so far.
    pub fn absorbed(&self) -> usize {
        self.absorbed
    }

    /// Completes the reduction. Fails if any worker is missing.
    pub fn finish(self) -> Result<Reduction, RuntimeError> {
        if self.absorbed != self.seen.len() {
            return Err(RuntimeError::ResultCountMismatch {
                expected: self.seen.len(),
                actual: self.absorbed,
            });
        }

        let global = self
            .units
            .iter()
            .fold(GlobalResult::default(), |acc, u| GlobalResult {
                sum: acc.sum ^ u.sum,
                max_cycles: acc.max_cycles.max(u.cycles),
            });

        Ok(Reduction {
            global,
            units: self.units,
        })
    }
}

/// Reduces results given in linear worker order
/// (`idx = unit * threads_per_unit + thread`).
pub fn reduce(
    results: &[WorkerResult],
    unit_count: u32,
    threads_per_unit: u32,
) -> Result<Reduction, RuntimeError> {
    let expected = unit_count as usize * threads_per_unit as usize;
    if results.len() != expected {
        return Err(RuntimeError::ResultCountMismatch {
            expected,
            actual: results.len(),
        });
    }

    let mut reducer = Reducer::new(unit_count, threads_per_unit)?;
    for (idx, result) in results.iter().enumerate() {
        reducer.absorb(WorkerId::from_linear(idx as u32, threads_per_unit), *result)?;
    }
    reducer.finish()
}

/// Allocates a filled buffer, reporting allocation failure instead of
/// aborting.
fn reserve_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>, RuntimeError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| RuntimeError::ResourceExhaustion {
            requested: len,
            detail: e.to_string(),
        })?;
    buf.resize(len, value);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(sum: u64, cycles: u64) -> WorkerResult {
        WorkerResult::new(sum, cycles)
    }

    #[test]
    fn test_end_to_end_example() {
        let results = vec![r(1, 100); 4];
        let red = reduce(&results, 1, 4).unwrap();
        assert_eq!(red.global, GlobalResult { sum: 0, max_cycles: 100 });
        assert_eq!(red.units, vec![UnitResult { sum: 0, cycles: 100 }]);
    }

    #[test]
    fn test_per_unit_aggregation() {
        let results = vec![r(0b0001, 5), r(0b0010, 9), r(0b0100, 3), r(0b1000, 7)];
        let red = reduce(&results, 2, 2).unwrap();
        assert_eq!(red.units[0], UnitResult { sum: 0b0011, cycles: 9 });
        assert_eq!(red.units[1], UnitResult { sum: 0b1100, cycles: 7 });
        assert_eq!(red.global, GlobalResult { sum: 0b1111, max_cycles: 9 });
    }

    #[test]
    fn test_all_empty_work_is_zero() {
        let red = reduce(&vec![WorkerResult::default(); 8], 2, 4).unwrap();
        assert_eq!(red.global, GlobalResult::default());
    }

    #[test]
    fn test_length_mismatch() {
        let err = reduce(&[r(1, 1)], 1, 2).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::ResultCountMismatch { expected: 2, actual: 1 }
        ));
    }

    #[test]
    fn test_reducer_any_order() {
        let mut reducer = Reducer::new(2, 2).unwrap();
        reducer.absorb(WorkerId::new(1, 1), r(8, 70)).unwrap();
        reducer.absorb(WorkerId::new(0, 0), r(1, 10)).unwrap();
        reducer.absorb(WorkerId::new(1, 0), r(4, 20)).unwrap();
        reducer.absorb(WorkerId::new(0, 1), r(2, 90)).unwrap();
        assert_eq!(reducer.absorbed(), 4);
        let red = reducer.finish().unwrap();
        assert_eq!(red.global, GlobalResult { sum: 15, max_cycles: 90 });
        assert_eq!(red.units[1].cycles, 70);
    }

    #[test]
    fn test_reducer_rejects_duplicates_and_strangers() {
        let mut reducer = Reducer::new(1, 2).unwrap();
        reducer.absorb(WorkerId::new(0, 0), r(1, 1)).unwrap();
        assert!(reducer.absorb(WorkerId::new(0, 0), r(1, 1)).is_err());
        assert!(reducer.absorb(WorkerId::new(0, 2), r(1, 1)).is_err());
        assert!(reducer.absorb(WorkerId::new(3, 0), r(1, 1)).is_err());
        assert!(matches!(
            reducer.absorb(WorkerId::new(u32::MAX, 1), r(1, 1)),
            Err(RuntimeError::UnexpectedResult { unit: u32::MAX, thread: 1, .. })
        ));
        assert_eq!(reducer.absorbed(), 1);
    }

    #[test]
    fn test_reducer_missing_worker() {
        let mut reducer = Reducer::new(1, 2).unwrap();
        reducer.absorb(WorkerId::new(0, 1), r(1, 1)).unwrap();
        assert!(matches!(
            reducer.finish(),
            Err(RuntimeError::ResultCountMismatch { expected: 2, actual: 1 })
        ));
    }
}
