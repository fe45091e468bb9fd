// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Ceiling-interpolated partitioning.
//!
//! Worker `idx` begins at `ceil(n * idx / workers)`. Sizes still differ by at
//! most one, but the larger shares are spread through the worker list rather
//! than packed at the front: ten keys over four workers gives `3, 2, 3, 2`.
//! Products are taken in `u128` so `n * idx` cannot overflow.

use crate::strategy::PartitionStrategy;

/// Boundaries at `ceil(n * idx / workers)`.
#[derive(Debug, Clone, Default)]
pub struct Ceiling;

impl Ceiling {
    pub fn new() -> Self {
        Self
    }
}

impl PartitionStrategy for Ceiling {
    fn name(&self) -> &str {
        "ceiling"
    }

    fn boundary(&self, keys: u64, idx: u32, worker_count: u32) -> u64 {
        let n = u128::from(keys);
        let workers = u128::from(worker_count);
        let offset = (n * u128::from(idx) + workers - 1) / workers;
        // offset <= n for idx <= workers.
        offset as u64
    }
}
