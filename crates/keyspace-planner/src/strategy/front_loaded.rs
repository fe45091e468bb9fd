// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Front-loaded balanced partitioning (the default).
//!
//! With `q = n / workers` and `r = n % workers`, the first `r` workers get
//! `q + 1` keys and the rest get `q`. Splitting ten keys across four workers
//! yields sizes `3, 3, 2, 2`.

use crate::strategy::PartitionStrategy;

/// Remainder keys go to the earliest workers, one each.
#[derive(Debug, Clone, Default)]
pub struct FrontLoaded;

impl FrontLoaded {
    pub fn new() -> Self {
        Self
    }
}

impl PartitionStrategy for FrontLoaded {
    fn name(&self) -> &str {
        "front-loaded"
    }

    fn boundary(&self, keys: u64, idx: u32, worker_count: u32) -> u64 {
        let workers = u64::from(worker_count);
        let idx = u64::from(idx);
        let base = keys / workers;
        let remainder = keys % workers;
        // idx * base <= workers * base <= keys, so this never overflows.
        idx * base + idx.min(remainder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GlobalRange, KeyRange};

    fn sizes(first: u64, last: u64, workers: u32) -> Vec<u64> {
        FrontLoaded::new()
            .partition(GlobalRange::new(first, last).unwrap(), workers)
            .unwrap()
            .iter()
            .map(KeyRange::len)
            .collect()
    }

    #[test]
    fn test_even_split() {
        let r = FrontLoaded::new()
            .partition(GlobalRange::new(0, 16).unwrap(), 4)
            .unwrap();
        let bounds: Vec<(u64, u64)> = r.iter().map(|k| (k.fkey, k.lkey)).collect();
        assert_eq!(bounds, vec![(0, 4), (4, 8), (8, 12), (12, 16)]);
    }

    #[test]
    fn test_uneven_split_front_loads() {
        assert_eq!(sizes(0, 10, 4), vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_more_workers_than_keys() {
        assert_eq!(sizes(0, 3, 8), vec![1, 1, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_offset_range() {
        let r = FrontLoaded::new()
            .partition(GlobalRange::new(100, 107).unwrap(), 3)
            .unwrap();
        assert_eq!(r[0], KeyRange { fkey: 100, lkey: 103 });
        assert_eq!(r[1], KeyRange { fkey: 103, lkey: 105 });
        assert_eq!(r[2], KeyRange { fkey: 105, lkey: 107 });
    }

    #[test]
    fn test_degenerate_range() {
        let r = FrontLoaded::new()
            .partition(GlobalRange::new(42, 42).unwrap(), 5)
            .unwrap();
        assert_eq!(r.len(), 5);
        assert!(r.iter().all(|k| k.is_empty() && k.fkey == 42));
    }

    #[test]
    fn test_full_u64_span() {
        let r = FrontLoaded::new()
            .partition(GlobalRange::new(0, u64::MAX).unwrap(), 7)
            .unwrap();
        assert_eq!(r[0].fkey, 0);
        assert_eq!(r[6].lkey, u64::MAX);
        for pair in r.windows(2) {
            assert_eq!(pair[0].lkey, pair[1].fkey);
        }
    }
}
