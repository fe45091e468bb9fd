// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The search engine with a type-state enforced pipeline.
//!
//! ```text
//! SearchEngine<Idle>
//!     │  .allocate()    lease units, load the worker program
//!     ▼
//! SearchEngine<Loaded>
//!     │  .dispatch()    partition the range, send every worker's params
//!     ▼
//! SearchEngine<Dispatched>
//!     │  .run()         run all units, collect, reduce, report
//!     ▼
//!   SearchOutput
//! ```
//!
//! Each state transition consumes the old value and returns a new one,
//! making invalid state sequences a compile error. From `Loaded` onwards
//! the engine owns a [`UnitLease`], so the units are released whenever the
//! engine is dropped, including after a failed transition.

use crate::metrics::PhaseTimings;
use crate::reduce::{Reducer, Reduction};
use crate::{RuntimeConfig, RuntimeError, ThroughputReport};
use execution_gateway::{ExecutionGateway, UnitHandle, UnitLease};
use keyspace_planner::{DispatchPlan, GlobalRange, WorkerId};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ── Type-state markers ─────────────────────────────────────────

/// Engine is created but holds no units.
#[derive(Debug)]
pub struct Idle;

/// Units are leased and the worker program is loaded.
#[derive(Debug)]
pub struct Loaded {
    lease: UnitLease,
}

/// Every worker has received its parameters.
#[derive(Debug)]
pub struct Dispatched {
    lease: UnitLease,
    plan: DispatchPlan,
    dispatch_duration: Duration,
}

/// Sealed trait for engine states.
pub trait EngineState: std::fmt::Debug {}
impl EngineState for Idle {}
impl EngineState for Loaded {}
impl EngineState for Dispatched {}

// ── Search output ──────────────────────────────────────────────

/// The result of one search batch.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchOutput {
    /// The searched range.
    pub range: GlobalRange,
    /// Iterations per key.
    pub loops: u32,
    /// Units that ran.
    pub unit_count: u32,
    /// Threads per unit.
    pub threads_per_unit: u32,
    /// Per-unit and global aggregates.
    pub reduction: Reduction,
    /// Host and device throughput.
    pub throughput: ThroughputReport,
    /// Host-side phase timings.
    pub timings: PhaseTimings,
}

impl SearchOutput {
    /// The global checksum.
    pub fn checksum(&self) -> u64 {
        self.reduction.global.sum
    }

    /// The slowest unit's cycle count.
    pub fn max_cycles(&self) -> u64 {
        self.reduction.global.max_cycles
    }

    /// Summary line using host wall-clock timing.
    pub fn host_line(&self) -> String {
        self.report_line(
            "host  ",
            self.throughput.host_seconds,
            self.throughput.host_mkeys_per_sec,
        )
    }

    /// Summary line using device cycle timing.
    pub fn device_line(&self) -> String {
        self.report_line(
            "device",
            self.throughput.device_seconds,
            self.throughput.device_mkeys_per_sec,
        )
    }

    fn report_line(&self, label: &str, seconds: f64, mkeys: f64) -> String {
        format!(
            "{label} fkey= {:>6} lkey= {:>6} loops= {:>6} SUM= {:x} seconds= {:.6}   Mks= {:.6}",
            self.range.first(),
            self.range.last(),
            self.loops,
            self.checksum(),
            seconds,
            mkeys,
        )
    }
}

// ── Engine ─────────────────────────────────────────────────────

/// The keyspace search engine.
///
/// `S` is a type-state marker that enforces the pipeline ordering at
/// compile time. You cannot call `.run()` before `.dispatch()` or dispatch
/// without leased units; the compiler catches it.
///
/// # Example
/// ```no_run
/// use runtime::{RuntimeConfig, SearchEngine};
///
/// # async fn example() -> Result<(), runtime::RuntimeError> {
/// let engine = SearchEngine::new(RuntimeConfig::default())?
///     .allocate()?
///     .dispatch()?;
/// let output = engine.run().await?;
/// println!("{}", output.host_line());
/// # Ok(())
/// # }
/// ```
pub struct SearchEngine<S: EngineState = Idle> {
    config: RuntimeConfig,
    gateway: Arc<dyn ExecutionGateway>,
    state: S,
}

// ── Idle → Loaded ──────────────────────────────────────────────

impl SearchEngine<Idle> {
    /// Creates an engine using the gateway named in `config`.
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let gateway = config.create_gateway()?;
        Ok(Self::with_gateway(config, gateway))
    }

    /// Creates an engine on an explicit gateway.
    pub fn with_gateway(config: RuntimeConfig, gateway: Arc<dyn ExecutionGateway>) -> Self {
        tracing::info!(
            "engine created on gateway '{}' with strategy '{}'",
            gateway.name(),
            config.strategy,
        );
        Self {
            config,
            gateway,
            state: Idle,
        }
    }

    /// Leases units and loads the worker program onto each of them.
    /// Transitions to the `Loaded` state.
    pub fn allocate(self) -> Result<SearchEngine<Loaded>, RuntimeError> {
        let lease = UnitLease::acquire(Arc::clone(&self.gateway), self.config.units)?;

        let program = self.config.program_ref();
        for unit in lease.units() {
            // A failure here drops `lease`, which releases every unit.
            self.gateway.load_program(unit, &program)?;
        }
        tracing::info!(
            "loaded '{program}' on {} unit(s) x {} thread(s)",
            lease.len(),
            self.gateway.threads_per_unit(),
        );

        Ok(SearchEngine {
            config: self.config,
            gateway: self.gateway,
            state: Loaded { lease },
        })
    }
}

// ── Loaded → Dispatched ────────────────────────────────────────

impl SearchEngine<Loaded> {
    /// The leased units.
    pub fn units(&self) -> &[UnitHandle] {
        self.state.lease.units()
    }

    /// Partitions the range across every leased worker and sends each
    /// worker its parameters. Transitions to the `Dispatched` state.
    pub fn dispatch(self) -> Result<SearchEngine<Dispatched>, RuntimeError> {
        let started = Instant::now();
        let lease = self.state.lease;
        let unit_count = u32::try_from(lease.len()).map_err(|_| {
            RuntimeError::ConfigError(format!("{} units exceed the worker index", lease.len()))
        })?;
        let threads = self.gateway.threads_per_unit();

        let strategy = self.config.create_strategy()?;
        let plan = keyspace_planner::plan_dispatch(
            strategy.as_ref(),
            self.config.range()?,
            self.config.loops,
            unit_count,
            threads,
        )?;

        for (unit_idx, unit) in lease.units().iter().enumerate() {
            for assignment in plan.unit_assignments(unit_idx as u32) {
                self.gateway
                    .send_params(unit, assignment.worker.thread, assignment.params)?;
            }
        }

        let dispatch_duration = started.elapsed();
        tracing::debug!(
            "dispatched {} worker(s) in {:.3}ms",
            plan.num_workers(),
            dispatch_duration.as_secs_f64() * 1000.0,
        );

        Ok(SearchEngine {
            config: self.config,
            gateway: self.gateway,
            state: Dispatched {
                lease,
                plan,
                dispatch_duration,
            },
        })
    }
}

// ── Dispatched: run the batch ──────────────────────────────────

impl SearchEngine<Dispatched> {
    /// The dispatch plan sent to the workers.
    pub fn plan(&self) -> &DispatchPlan {
        &self.state.plan
    }

    /// The leased units.
    pub fn units(&self) -> &[UnitHandle] {
        self.state.lease.units()
    }

    /// Runs every unit, then collects and reduces all worker results.
    ///
    /// Steps:
    /// 1. Trigger all units and block (on a blocking task) until they finish.
    /// 2. Receive every worker's result and fold it into the reducer.
    /// 3. Derive host and device throughput.
    ///
    /// Any gateway failure aborts the batch; partial results are discarded.
    /// The engine can be run again with the same parameters.
    pub async fn run(&self) -> Result<SearchOutput, RuntimeError> {
        let plan = &self.state.plan;
        let units = self.state.lease.units().to_vec();

        tracing::info!("running {} unit(s)", units.len());
        let run_duration = {
            let gateway = Arc::clone(&self.gateway);
            tokio::task::spawn_blocking(move || -> Result<Duration, RuntimeError> {
                let started = Instant::now();
                gateway.run_all(&units)?;
                Ok(started.elapsed())
            })
            .await
            .map_err(|e| RuntimeError::TaskFailed(e.to_string()))??
        };

        let collect_started = Instant::now();
        let reduction = self.collect()?;
        let collect_duration = collect_started.elapsed();

        for (unit, agg) in reduction.units.iter().enumerate() {
            tracing::info!("unit {unit} cycle count = {} cc", agg.cycles);
        }

        let throughput = ThroughputReport::from_elapsed(
            plan.total_work(),
            run_duration,
            reduction.global.max_cycles,
            self.config.clock_hz,
            plan.unit_count,
        );

        let output = SearchOutput {
            range: plan.range,
            loops: plan.loops,
            unit_count: plan.unit_count,
            threads_per_unit: plan.threads_per_unit,
            reduction,
            throughput,
            timings: PhaseTimings {
                dispatch: self.state.dispatch_duration,
                run: run_duration,
                collect: collect_duration,
            },
        };
        tracing::info!("{}", output.host_line());
        Ok(output)
    }

    /// Releases the units now instead of at drop.
    pub fn release(self) {
        self.state.lease.release();
    }

    fn collect(&self) -> Result<Reduction, RuntimeError> {
        let plan = &self.state.plan;
        let mut reducer = Reducer::new(plan.unit_count, plan.threads_per_unit)?;

        for (unit_idx, unit) in self.state.lease.units().iter().enumerate() {
            for thread in 0..plan.threads_per_unit {
                let result = self.gateway.receive_result(unit, thread)?;
                let worker = WorkerId::new(unit_idx as u32, thread);
                tracing::debug!(
                    "worker {worker}: sum={:#018x} cycles={}",
                    result.sum,
                    result.cycles,
                );
                reducer.absorb(worker, result)?;
            }
        }

        reducer.finish()
    }
}

impl<S: EngineState> std::fmt::Debug for SearchEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("state", &std::any::type_name::<S>())
            .field("gateway", &self.gateway.name())
            .field("strategy", &self.config.strategy)
            .field("range", &(self.config.first_key..self.config.last_key))
            .finish()
    }
}
