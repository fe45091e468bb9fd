// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the keyspace planner.

/// Errors that can occur while partitioning a key range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlannerError {
    /// The range's first key lies after its last key.
    #[error("inverted key range: first key {first} is greater than last key {last}")]
    InvertedRange { first: u64, last: u64 },

    /// Partitioning was requested for zero workers.
    #[error("cannot partition a key range across zero workers")]
    NoWorkers,

    /// A key bound or loop count does not fit the 32-bit parameter record.
    #[error("{field} value {value} does not fit in a 32-bit worker parameter")]
    KeyOverflow { field: &'static str, value: u64 },

    /// A parameter record had the wrong byte length.
    #[error("worker parameter record must be {expected} bytes, got {actual}")]
    BadRecordLength { expected: usize, actual: usize },

    /// The dispatch plan violates one of its structural invariants.
    #[error("invalid dispatch plan: {0}")]
    InvalidPlan(String),
}
