// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The engine that runs a partitioned keyspace search end to end.
//!
//! The runtime takes:
//! - A [`RuntimeConfig`] naming the key range, loop count, and strategy.
//! - An [`ExecutionGateway`](execution_gateway::ExecutionGateway) that owns
//!   the execution units.
//!
//! And drives one batch: lease units, load the program, partition the range
//! with `keyspace-planner`, send parameters, run every unit, then collect,
//! reduce, and report throughput.
//!
//! # Type-State Pipeline
//! The runtime enforces a type-safe pipeline:
//! ```text
//! SearchEngine<Idle> → SearchEngine<Loaded> → SearchEngine<Dispatched>
//! ```
//! Transitions are compile-time checked.
//!
//! # Async Execution
//! `run_all` blocks until every unit finishes, so it is moved onto a
//! `tokio` blocking task and the engine awaits it.

mod config;
mod engine;
mod error;
mod metrics;
mod reduce;

pub use config::RuntimeConfig;
pub use engine::{Dispatched, EngineState, Idle, Loaded, SearchEngine, SearchOutput};
pub use error::RuntimeError;
pub use metrics::{PhaseTimings, ThroughputReport};
pub use reduce::{reduce, GlobalResult, Reducer, Reduction, UnitResult};

pub use execution_gateway::WorkerResult;
pub use keyspace_planner::WorkerId;
