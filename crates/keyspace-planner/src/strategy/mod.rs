// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`PartitionStrategy`] trait and strategy implementations.
//!
//! A strategy only decides where each worker's sub-range begins. The shared
//! [`PartitionStrategy::partition`] turns those boundaries into ranges, so
//! every strategy inherits contiguity and exact coverage for free: worker
//! `idx` ends exactly where worker `idx + 1` begins.

pub mod ceiling;
pub mod front_loaded;

use crate::{GlobalRange, KeyRange, PlannerError};

/// Trait for range partitioning strategies.
///
/// Strategies are pure arithmetic with no I/O, which keeps them trivially
/// unit-testable and amenable to property-based testing.
pub trait PartitionStrategy: Send + Sync {
    /// Human-readable name of this strategy.
    fn name(&self) -> &str;

    /// Offset from the start of the range at which worker `idx` begins.
    ///
    /// Must be monotonically non-decreasing in `idx`, return `0` for
    /// `idx == 0` and `keys` for `idx == worker_count`.
    fn boundary(&self, keys: u64, idx: u32, worker_count: u32) -> u64;

    /// Splits `range` into `worker_count` contiguous sub-ranges, indexed by
    /// linear worker index.
    ///
    /// Empty sub-ranges are legal output when there are more workers than
    /// keys.
    fn partition(
        &self,
        range: GlobalRange,
        worker_count: u32,
    ) -> Result<Vec<KeyRange>, PlannerError> {
        if worker_count == 0 {
            return Err(PlannerError::NoWorkers);
        }

        let keys = range.len();
        let ranges = (0..worker_count)
            .map(|idx| {
                let fkey = range.first() + self.boundary(keys, idx, worker_count);
                let lkey = (range.first() + self.boundary(keys, idx + 1, worker_count))
                    .min(range.last());
                KeyRange { fkey, lkey }
            })
            .collect();

        Ok(ranges)
    }
}

/// Resolves a strategy by its configuration name.
pub fn by_name(name: &str) -> Option<Box<dyn PartitionStrategy>> {
    match name.to_lowercase().as_str() {
        "front-loaded" | "balanced" => Some(Box::new(front_loaded::FrontLoaded::new())),
        "ceiling" | "interpolated" => Some(Box::new(ceiling::Ceiling::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("front-loaded").unwrap().name(), "front-loaded");
        assert_eq!(by_name("Ceiling").unwrap().name(), "ceiling");
        assert!(by_name("round-robin").is_none());
    }

    #[test]
    fn test_zero_workers_rejected_by_every_strategy() {
        let range = GlobalRange::new(0, 10).unwrap();
        for name in ["front-loaded", "ceiling"] {
            let err = by_name(name).unwrap().partition(range, 0).unwrap_err();
            assert_eq!(err, PlannerError::NoWorkers);
        }
    }
}
