// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Throughput and phase-timing metrics.
//!
//! [`ThroughputReport`] derives keys-per-second figures two ways: from the
//! host's wall-clock measurement around the run trigger, and from the
//! slowest unit's device cycle count. Device throughput is normalised per
//! unit because every unit runs concurrently and the cycle count already
//! reflects one unit's serial time.

use std::time::Duration;

/// Host- and device-observed throughput for one batch.
///
/// A throughput whose elapsed time is zero or negative is `NaN`.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ThroughputReport {
    /// Elapsed host seconds around the run trigger.
    pub host_seconds: f64,
    /// Millions of key-iterations per second, host timing.
    pub host_mkeys_per_sec: f64,
    /// Slowest unit's cycles divided by the device clock.
    pub device_seconds: f64,
    /// Millions of key-iterations per second per unit, device timing.
    pub device_mkeys_per_sec: f64,
}

impl ThroughputReport {
    /// Computes throughput.
    ///
    /// - `work`: `loops * (last - first)`
    /// - `host_micros`: elapsed host microseconds around the run
    /// - `max_cycles`: the slowest unit's cycle count
    /// - `clock_hz`: device clock frequency
    /// - `unit_count`: units that ran concurrently
    pub fn compute(
        work: u128,
        host_micros: f64,
        max_cycles: u64,
        clock_hz: f64,
        unit_count: u32,
    ) -> Self {
        let mkeys = work as f64 / 1e6;

        let host_seconds = host_micros / 1e6;
        let host_mkeys_per_sec = rate(mkeys, host_seconds);

        let device_seconds = if clock_hz > 0.0 {
            max_cycles as f64 / clock_hz
        } else {
            f64::NAN
        };
        let device_mkeys_per_sec = if unit_count == 0 {
            f64::NAN
        } else {
            rate(mkeys, device_seconds) / f64::from(unit_count)
        };

        Self {
            host_seconds,
            host_mkeys_per_sec,
            device_seconds,
            device_mkeys_per_sec,
        }
    }

    /// Convenience wrapper taking the host time as a [`Duration`].
    pub fn from_elapsed(
        work: u128,
        host_elapsed: Duration,
        max_cycles: u64,
        clock_hz: u64,
        unit_count: u32,
    ) -> Self {
        let micros = host_elapsed.as_secs_f64() * 1e6;
        Self::compute(work, micros, max_cycles, clock_hz as f64, unit_count)
    }
}

fn rate(mkeys: f64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        mkeys / seconds
    } else {
        f64::NAN
    }
}

/// Wall-clock time spent in each host phase of a batch.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct PhaseTimings {
    /// Sending every worker's parameters.
    pub dispatch: Duration,
    /// The blocking run of all units.
    pub run: Duration,
    /// Receiving and reducing results.
    pub collect: Duration,
}

impl PhaseTimings {
    /// Sum of all phases.
    pub fn total(&self) -> Duration {
        self.dispatch + self.run + self.collect
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "dispatch {:.3}ms, run {:.3}ms, collect {:.3}ms, total {:.3}ms",
            self.dispatch.as_secs_f64() * 1000.0,
            self.run.as_secs_f64() * 1000.0,
            self.collect.as_secs_f64() * 1000.0,
            self.total().as_secs_f64() * 1000.0,
        )
    }
}
