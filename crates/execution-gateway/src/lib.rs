// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # execution-gateway
//!
//! The boundary between the host and the execution substrate that runs the
//! keyspace workers.
//!
//! # Key Components
//!
//! - [`ExecutionGateway`]: what the host needs from a substrate (allocate units,
//!   load the worker program, send parameters, run, receive results,
//!   release).
//! - [`UnitLease`]: an RAII reservation. Dropping it releases the units, so
//!   cleanup runs on success, on `?` early returns, and on unwinding.
//! - [`SimulatedGateway`]: an in-process substrate that runs the Keccak
//!   [`kernel`] on a `rayon` pool, with fault injection for tests.
//! - [`GatewayError`]: allocation, load, transfer and execution failures.
//!
//! # Example
//! ```
//! use execution_gateway::{ExecutionGateway, SimulatedConfig, SimulatedGateway, UnitLease};
//! use std::sync::Arc;
//!
//! let gateway = Arc::new(SimulatedGateway::new(SimulatedConfig::default()));
//! {
//!     let lease = UnitLease::acquire(gateway.clone(), 2).unwrap();
//!     assert_eq!(lease.len(), 2);
//! }
//! // Units are back with the gateway once the lease is dropped.
//! assert_eq!(gateway.allocated_units(), 0);
//! ```

mod error;
mod gateway;
pub mod kernel;
mod lease;
pub mod simulated;
mod types;

pub use error::GatewayError;
pub use gateway::ExecutionGateway;
pub use lease::UnitLease;
pub use simulated::{CycleModel, Fault, SimulatedConfig, SimulatedGateway};
pub use types::{ProgramRef, UnitHandle, WorkerResult, RESULT_RECORD_BYTES};
