// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`ExecutionGateway`] trait.

use crate::{GatewayError, ProgramRef, UnitHandle, WorkerResult};
use keyspace_planner::WorkerParams;

/// Capabilities the host needs from an execution substrate.
///
/// Implementations own the mechanics of reserving units, moving bytes and
/// booting programs. The host drives them in one synchronous barrier:
/// allocate, load, send every worker's parameters, run all units, receive
/// every worker's result, release.
///
/// Methods take `&self`; implementations synchronise internally so a
/// gateway can be shared behind an `Arc` between the engine and its
/// [`UnitLease`](crate::UnitLease).
pub trait ExecutionGateway: Send + Sync {
    /// Human-readable name of this gateway.
    fn name(&self) -> &str;

    /// Number of worker threads each unit runs.
    fn threads_per_unit(&self) -> u32;

    /// Reserves up to `unit_count_hint` units (`0` requests every available
    /// unit). Fails if none are available.
    fn allocate(&self, unit_count_hint: u32) -> Result<Vec<UnitHandle>, GatewayError>;

    /// Loads the worker program onto `unit`.
    fn load_program(&self, unit: &UnitHandle, program: &ProgramRef) -> Result<(), GatewayError>;

    /// Copies one worker's parameter record to its slot on `unit`.
    fn send_params(
        &self,
        unit: &UnitHandle,
        thread: u32,
        params: WorkerParams,
    ) -> Result<(), GatewayError>;

    /// Boots every unit and blocks until all of them finish.
    fn run_all(&self, units: &[UnitHandle]) -> Result<(), GatewayError>;

    /// Reads one worker's result record back from `unit`.
    fn receive_result(&self, unit: &UnitHandle, thread: u32) -> Result<WorkerResult, GatewayError>;

    /// Returns `units` to the substrate. Never fails.
    fn release(&self, units: &[UnitHandle]);
}
