// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the search runtime.

/// Errors that can occur while dispatching and running a keyspace search.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The planner rejected the range or worker layout.
    #[error("planner error: {0}")]
    PlannerError(#[from] keyspace_planner::PlannerError),

    /// The execution substrate failed (allocation, load, transfer, or run).
    #[error("gateway error: {0}")]
    GatewayError(#[from] execution_gateway::GatewayError),

    /// A local buffer for collecting results could not be reserved.
    #[error("resource exhaustion: cannot reserve {requested} result slots: {detail}")]
    ResourceExhaustion { requested: usize, detail: String },

    /// The number of worker results does not match the worker layout.
    #[error("expected {expected} worker results, got {actual}")]
    ResultCountMismatch { expected: usize, actual: usize },

    /// A result arrived for a worker outside the layout, or twice.
    #[error("unexpected result for worker {unit:02}-{thread:02}: {detail}")]
    UnexpectedResult {
        unit: u32,
        thread: u32,
        detail: &'static str,
    },

    /// The blocking run task did not complete.
    #[error("run task failed: {0}")]
    TaskFailed(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
