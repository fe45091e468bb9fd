// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! In-process execution substrate.
//!
//! [`SimulatedGateway`] stands in for accelerator hardware: a fixed pool of
//! units, each with `threads_per_unit` parameter and result slots. `run_all`
//! executes every worker's [`kernel`](crate::kernel) call on a `rayon` pool
//! and converts each worker's elapsed time into device cycles at the
//! configured clock.
//!
//! Faults can be injected per operation so error paths (and the guarantee
//! that units are released after them) can be exercised without hardware.

use crate::kernel::{self, KERNEL_NAME};
use crate::{ExecutionGateway, GatewayError, ProgramRef, UnitHandle, WorkerResult};
use keyspace_planner::WorkerParams;
use rayon::prelude::*;
use std::sync::Mutex;
use std::time::Instant;

/// Default device clock, in Hz.
pub const DEFAULT_CLOCK_HZ: u64 = 600_000_000;

/// Default worker threads per unit.
pub const DEFAULT_THREADS_PER_UNIT: u32 = 16;

/// How the simulator derives a worker's cycle count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CycleModel {
    /// Measured host time of the worker, scaled by the device clock.
    Measured,
    /// A fixed cost per permutation evaluation (`keys * loops * cost`).
    PerPermutation(u64),
}

/// Simulator configuration.
#[derive(Debug, Clone)]
pub struct SimulatedConfig {
    /// Units the simulator can hand out.
    pub available_units: u32,
    /// Worker threads per unit.
    pub threads_per_unit: u32,
    /// Device clock used to convert time to cycles.
    pub clock_hz: u64,
    /// Cycle accounting model.
    pub cycle_model: CycleModel,
    /// Host threads for the rayon pool (`None` uses the global pool).
    pub host_threads: Option<usize>,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            available_units: 4,
            threads_per_unit: DEFAULT_THREADS_PER_UNIT,
            clock_hz: DEFAULT_CLOCK_HZ,
            cycle_model: CycleModel::Measured,
            host_threads: None,
        }
    }
}

/// A failure to inject into the next matching operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Allocate,
    Load { unit: u32 },
    SendParams { unit: u32, thread: u32 },
    Run { unit: u32 },
    ReceiveResult { unit: u32, thread: u32 },
}

#[derive(Debug, Default)]
struct UnitSlot {
    allocated: bool,
    program: Option<ProgramRef>,
    params: Vec<Option<WorkerParams>>,
    results: Option<Vec<WorkerResult>>,
}

#[derive(Debug, Default)]
struct SimState {
    units: Vec<UnitSlot>,
    faults: Vec<Fault>,
    released_units: usize,
    runs: u64,
}

impl SimState {
    /// Removes and reports a pending fault matching `fault`.
    fn take_fault(&mut self, fault: Fault) -> bool {
        match self.faults.iter().position(|f| *f == fault) {
            Some(pos) => {
                self.faults.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// An in-process, multi-threaded execution gateway.
pub struct SimulatedGateway {
    config: SimulatedConfig,
    state: Mutex<SimState>,
    pool: Option<rayon::ThreadPool>,
}

impl SimulatedGateway {
    /// Creates a simulator. Falls back to the global rayon pool if a
    /// dedicated pool cannot be built.
    pub fn new(config: SimulatedConfig) -> Self {
        let pool = config.host_threads.and_then(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .thread_name(|i| format!("sim-unit-{i}"))
                .build()
                .map_err(|e| tracing::warn!("simulated gateway: dedicated pool unavailable: {e}"))
                .ok()
        });

        let units = (0..config.available_units)
            .map(|_| UnitSlot::default())
            .collect();

        Self {
            config,
            state: Mutex::new(SimState {
                units,
                ..Default::default()
            }),
            pool,
        }
    }

    /// Queues a fault for the next matching operation.
    pub fn inject(&self, fault: Fault) {
        self.lock().faults.push(fault);
    }

    /// Units currently reserved.
    pub fn allocated_units(&self) -> usize {
        self.lock().units.iter().filter(|u| u.allocated).count()
    }

    /// Total units returned through [`ExecutionGateway::release`].
    pub fn released_units(&self) -> usize {
        self.lock().released_units
    }

    /// Number of completed `run_all` calls.
    pub fn runs(&self) -> u64 {
        self.lock().runs
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        // A panicked worker cannot leave the slot table half-written, so a
        // poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_thread(&self, unit: &UnitHandle, thread: u32) -> Result<(), GatewayError> {
        if thread >= self.config.threads_per_unit {
            return Err(GatewayError::Transfer {
                unit: unit.id(),
                thread,
                detail: format!(
                    "thread index out of range (unit has {} threads)",
                    self.config.threads_per_unit
                ),
            });
        }
        Ok(())
    }

    fn cycles_for(&self, params: &WorkerParams, started: Instant) -> u64 {
        match self.config.cycle_model {
            CycleModel::Measured => {
                let secs = started.elapsed().as_secs_f64();
                (secs * self.config.clock_hz as f64) as u64
            }
            CycleModel::PerPermutation(cost) => params
                .num_keys()
                .saturating_mul(u64::from(params.loops))
                .saturating_mul(cost),
        }
    }

    fn execute(&self, jobs: &[(u32, Vec<WorkerParams>)]) -> Vec<(u32, Vec<WorkerResult>)> {
        let work = || {
            jobs.par_iter()
                .map(|(unit, threads)| {
                    let results = threads
                        .par_iter()
                        .map(|p| {
                            let started = Instant::now();
                            let sum = kernel::search_range(
                                u64::from(p.fkey),
                                u64::from(p.lkey),
                                p.loops,
                            );
                            WorkerResult::new(sum, self.cycles_for(p, started))
                        })
                        .collect();
                    (*unit, results)
                })
                .collect()
        };
        match &self.pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }
}

fn allocated_slot<'a>(
    state: &'a mut SimState,
    unit: &UnitHandle,
) -> Option<&'a mut UnitSlot> {
    state
        .units
        .get_mut(unit.id() as usize)
        .filter(|slot| slot.allocated)
}

impl ExecutionGateway for SimulatedGateway {
    fn name(&self) -> &str {
        "simulated"
    }

    fn threads_per_unit(&self) -> u32 {
        self.config.threads_per_unit
    }

    fn allocate(&self, unit_count_hint: u32) -> Result<Vec<UnitHandle>, GatewayError> {
        let mut state = self.lock();
        if state.take_fault(Fault::Allocate) {
            return Err(GatewayError::Allocation("injected allocation fault".into()));
        }

        let free: Vec<u32> = state
            .units
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.allocated)
            .map(|(id, _)| id as u32)
            .collect();
        if free.is_empty() {
            return Err(GatewayError::Allocation(format!(
                "no free units ({} configured)",
                self.config.available_units
            )));
        }

        let want = if unit_count_hint == 0 {
            free.len()
        } else {
            (unit_count_hint as usize).min(free.len())
        };

        let threads = self.config.threads_per_unit as usize;
        let handles = free[..want]
            .iter()
            .map(|&id| {
                let slot = &mut state.units[id as usize];
                slot.allocated = true;
                slot.program = None;
                slot.params = vec![None; threads];
                slot.results = None;
                UnitHandle::new(id)
            })
            .collect();
        Ok(handles)
    }

    fn load_program(&self, unit: &UnitHandle, program: &ProgramRef) -> Result<(), GatewayError> {
        let mut state = self.lock();
        if state.take_fault(Fault::Load { unit: unit.id() }) {
            return Err(GatewayError::Load {
                unit: unit.id(),
                detail: "injected load fault".into(),
            });
        }
        if program.name != KERNEL_NAME {
            return Err(GatewayError::Load {
                unit: unit.id(),
                detail: format!("unknown program '{program}', expected '{KERNEL_NAME}'"),
            });
        }
        let slot = allocated_slot(&mut state, unit).ok_or_else(|| GatewayError::Load {
            unit: unit.id(),
            detail: "unit is not allocated".into(),
        })?;
        slot.program = Some(program.clone());
        Ok(())
    }

    fn send_params(
        &self,
        unit: &UnitHandle,
        thread: u32,
        params: WorkerParams,
    ) -> Result<(), GatewayError> {
        self.check_thread(unit, thread)?;
        let mut state = self.lock();
        if state.take_fault(Fault::SendParams { unit: unit.id(), thread }) {
            return Err(GatewayError::Transfer {
                unit: unit.id(),
                thread,
                detail: "injected parameter transfer fault".into(),
            });
        }
        let slot = allocated_slot(&mut state, unit).ok_or_else(|| GatewayError::Transfer {
            unit: unit.id(),
            thread,
            detail: "unit is not allocated".into(),
        })?;
        // Round-trip through the wire layout, as a real transfer would.
        let wire = params.to_bytes();
        let landed = WorkerParams::from_bytes(&wire).map_err(|e| GatewayError::Transfer {
            unit: unit.id(),
            thread,
            detail: e.to_string(),
        })?;
        slot.params[thread as usize] = Some(landed);
        slot.results = None;
        Ok(())
    }

    fn run_all(&self, units: &[UnitHandle]) -> Result<(), GatewayError> {
        let jobs = {
            let mut state = self.lock();
            let mut jobs = Vec::with_capacity(units.len());
            for unit in units {
                if state.take_fault(Fault::Run { unit: unit.id() }) {
                    return Err(GatewayError::Execution {
                        unit: unit.id(),
                        detail: "injected device fault".into(),
                    });
                }
                let slot = allocated_slot(&mut state, unit).ok_or_else(|| {
                    GatewayError::Execution {
                        unit: unit.id(),
                        detail: "unit is not allocated".into(),
                    }
                })?;
                if slot.program.is_none() {
                    return Err(GatewayError::Execution {
                        unit: unit.id(),
                        detail: "no program loaded".into(),
                    });
                }
                let params = slot
                    .params
                    .iter()
                    .copied()
                    .enumerate()
                    .map(|(thread, p)| {
                        p.ok_or_else(|| GatewayError::Execution {
                            unit: unit.id(),
                            detail: format!("thread {thread} has no parameters"),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                jobs.push((unit.id(), params));
            }
            jobs
        };

        tracing::debug!("simulated gateway: running {} unit(s)", jobs.len());
        let finished = self.execute(&jobs);

        let mut state = self.lock();
        for (unit, results) in finished {
            if let Some(slot) = state.units.get_mut(unit as usize) {
                slot.results = Some(results);
            }
        }
        state.runs += 1;
        Ok(())
    }

    fn receive_result(&self, unit: &UnitHandle, thread: u32) -> Result<WorkerResult, GatewayError> {
        self.check_thread(unit, thread)?;
        let mut state = self.lock();
        if state.take_fault(Fault::ReceiveResult { unit: unit.id(), thread }) {
            return Err(GatewayError::Transfer {
                unit: unit.id(),
                thread,
                detail: "injected result transfer fault".into(),
            });
        }
        let slot = allocated_slot(&mut state, unit).ok_or_else(|| GatewayError::Transfer {
            unit: unit.id(),
            thread,
            detail: "unit is not allocated".into(),
        })?;
        let result = slot
            .results
            .as_ref()
            .and_then(|r| r.get(thread as usize))
            .copied()
            .ok_or_else(|| GatewayError::Transfer {
                unit: unit.id(),
                thread,
                detail: "no result available; unit has not run".into(),
            })?;
        Ok(WorkerResult::from_bytes(&result.to_bytes()))
    }

    fn release(&self, units: &[UnitHandle]) {
        let mut state = self.lock();
        let mut released = 0;
        for unit in units {
            if let Some(slot) = state.units.get_mut(unit.id() as usize) {
                if slot.allocated {
                    *slot = UnitSlot::default();
                    released += 1;
                }
            }
        }
        state.released_units += released;
    }
}

impl std::fmt::Debug for SimulatedGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedGateway")
            .field("available_units", &self.config.available_units)
            .field("threads_per_unit", &self.config.threads_per_unit)
            .field("clock_hz", &self.config.clock_hz)
            .field("allocated", &self.allocated_units())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(units: u32, threads: u32) -> SimulatedGateway {
        SimulatedGateway::new(SimulatedConfig {
            available_units: units,
            threads_per_unit: threads,
            cycle_model: CycleModel::PerPermutation(10),
            ..Default::default()
        })
    }

    fn program() -> ProgramRef {
        ProgramRef::new(KERNEL_NAME)
    }

    #[test]
    fn test_allocate_honours_hint() {
        let gw = sim(4, 2);
        assert_eq!(gw.allocate(2).unwrap().len(), 2);
        assert_eq!(gw.allocate(0).unwrap().len(), 2);
        assert!(matches!(gw.allocate(1), Err(GatewayError::Allocation(_))));
    }

    #[test]
    fn test_allocate_with_no_units() {
        let gw = sim(0, 2);
        assert!(matches!(gw.allocate(0), Err(GatewayError::Allocation(_))));
    }

    #[test]
    fn test_load_rejects_wrong_program() {
        let gw = sim(1, 1);
        let units = gw.allocate(0).unwrap();
        let err = gw
            .load_program(&units[0], &ProgramRef::new("sha256"))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Load { unit: 0, .. }));
    }

    #[test]
    fn test_full_cycle() {
        let gw = sim(2, 2);
        let units = gw.allocate(0).unwrap();
        let ranges = [(0, 3), (3, 5), (5, 8), (8, 8)];
        for (i, (fkey, lkey)) in ranges.iter().enumerate() {
            let unit = &units[i / 2];
            gw.load_program(unit, &program()).unwrap();
            let p = WorkerParams { fkey: *fkey, lkey: *lkey, loops: 2 };
            gw.send_params(unit, (i % 2) as u32, p).unwrap();
        }
        gw.run_all(&units).unwrap();
        assert_eq!(gw.runs(), 1);

        let r = gw.receive_result(&units[0], 0).unwrap();
        assert_eq!(r.sum, kernel::search_range(0, 3, 2));
        assert_eq!(r.cycles, 3 * 2 * 10);

        let empty = gw.receive_result(&units[1], 1).unwrap();
        assert_eq!(empty, WorkerResult::new(0, 0));
    }

    #[test]
    fn test_receive_before_run_fails() {
        let gw = sim(1, 1);
        let units = gw.allocate(0).unwrap();
        let err = gw.receive_result(&units[0], 0).unwrap_err();
        assert!(matches!(err, GatewayError::Transfer { .. }));
    }

    #[test]
    fn test_run_without_params_fails() {
        let gw = sim(1, 2);
        let units = gw.allocate(0).unwrap();
        gw.load_program(&units[0], &program()).unwrap();
        gw.send_params(&units[0], 0, WorkerParams { fkey: 0, lkey: 1, loops: 1 })
            .unwrap();
        assert!(matches!(
            gw.run_all(&units),
            Err(GatewayError::Execution { unit: 0, .. })
        ));
    }

    #[test]
    fn test_thread_out_of_range() {
        let gw = sim(1, 2);
        let units = gw.allocate(0).unwrap();
        let err = gw
            .send_params(&units[0], 2, WorkerParams { fkey: 0, lkey: 1, loops: 1 })
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transfer { thread: 2, .. }));
    }

    #[test]
    fn test_injected_faults_fire_once() {
        let gw = sim(1, 1);
        let units = gw.allocate(0).unwrap();
        gw.load_program(&units[0], &program()).unwrap();
        gw.send_params(&units[0], 0, WorkerParams { fkey: 0, lkey: 2, loops: 1 })
            .unwrap();

        gw.inject(Fault::Run { unit: 0 });
        assert!(gw.run_all(&units).is_err());
        gw.run_all(&units).unwrap();

        gw.inject(Fault::ReceiveResult { unit: 0, thread: 0 });
        assert!(gw.receive_result(&units[0], 0).is_err());
        assert!(gw.receive_result(&units[0], 0).is_ok());
    }

    #[test]
    fn test_release_frees_units() {
        let gw = sim(2, 1);
        let units = gw.allocate(0).unwrap();
        gw.release(&units);
        assert_eq!(gw.allocated_units(), 0);
        assert_eq!(gw.released_units(), 2);
        // Releasing twice is harmless.
        gw.release(&units);
        assert_eq!(gw.released_units(), 2);
        assert_eq!(gw.allocate(0).unwrap().len(), 2);
    }

    #[test]
    fn test_dedicated_pool() {
        let gw = SimulatedGateway::new(SimulatedConfig {
            available_units: 1,
            threads_per_unit: 4,
            host_threads: Some(2),
            ..Default::default()
        });
        let units = gw.allocate(0).unwrap();
        gw.load_program(&units[0], &program()).unwrap();
        for t in 0..4 {
            gw.send_params(&units[0], t, WorkerParams { fkey: t, lkey: t + 1, loops: 1 })
                .unwrap();
        }
        gw.run_all(&units).unwrap();
        let sum = (0..4).fold(0, |acc, t| acc ^ gw.receive_result(&units[0], t).unwrap().sum);
        assert_eq!(sum, kernel::search_range(0, 4, 1));
    }
}
