// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the execution gateway.

/// Errors raised at the host/device boundary.
///
/// Every variant is fatal for the batch: the caller discards partial
/// results and releases the units.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// No execution units could be reserved.
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// The worker program did not match or could not be loaded.
    #[error("program load failed on unit {unit}: {detail}")]
    Load { unit: u32, detail: String },

    /// Parameter or result transfer to/from one worker failed.
    #[error("transfer failed for worker {unit:02}-{thread:02}: {detail}")]
    Transfer {
        unit: u32,
        thread: u32,
        detail: String,
    },

    /// A unit reported a fault while executing.
    #[error("execution fault on unit {unit}: {detail}")]
    Execution { unit: u32, detail: String },
}
