// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! first_key = 0
//! last_key = 1024
//! loops = 1048576
//! units = 0                 # 0 = every available unit
//! threads_per_unit = 16
//! clock_hz = 600000000
//! program = "keccakf"
//! strategy = "front-loaded"
//! gateway = "simulated"
//! simulated_units = 4
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use execution_gateway::{
    CycleModel, ExecutionGateway, ProgramRef, SimulatedConfig, SimulatedGateway,
};
use keyspace_planner::{GlobalRange, PartitionStrategy};
use std::path::Path;
use std::sync::Arc;

/// Configuration for a keyspace search batch.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// First key of the search range (inclusive).
    pub first_key: u64,
    /// Last key of the search range (exclusive).
    pub last_key: u64,
    /// Permutation iterations per key.
    pub loops: u64,
    /// Units to request from the gateway (`0` = all available).
    pub units: u32,
    /// Worker threads per unit.
    pub threads_per_unit: u32,
    /// Device clock frequency used to turn cycles into seconds.
    pub clock_hz: u64,
    /// Worker program to load.
    pub program: String,
    /// Partition strategy: `"front-loaded"` or `"ceiling"`.
    pub strategy: String,
    /// Gateway implementation. Only `"simulated"` ships with the runtime.
    pub gateway: String,
    /// Units the simulated gateway exposes.
    pub simulated_units: u32,
    /// Cycle accounting for the simulated gateway.
    pub cycle_model: CycleModel,
    /// Host threads backing the simulated gateway (defaults to all cores).
    pub host_threads: Option<usize>,
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::ConfigError(format!(
                "cannot read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        toml::from_str(toml_str).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML parse error: {e}"))
        })
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML serialise error: {e}"))
        })
    }

    /// The configured search range.
    pub fn range(&self) -> Result<GlobalRange, super::RuntimeError> {
        Ok(GlobalRange::new(self.first_key, self.last_key)?)
    }

    /// The worker program reference.
    pub fn program_ref(&self) -> ProgramRef {
        ProgramRef::new(self.program.clone())
    }

    /// Creates the partition strategy specified by this config.
    pub fn create_strategy(&self) -> Result<Box<dyn PartitionStrategy>, super::RuntimeError> {
        keyspace_planner::strategy::by_name(&self.strategy).ok_or_else(|| {
            super::RuntimeError::ConfigError(format!(
                "unknown strategy '{}'; expected 'front-loaded' or 'ceiling'",
                self.strategy
            ))
        })
    }

    /// Creates the gateway specified by this config.
    pub fn create_gateway(&self) -> Result<Arc<dyn ExecutionGateway>, super::RuntimeError> {
        match self.gateway.to_lowercase().as_str() {
            "simulated" | "sim" => {
                if self.threads_per_unit == 0 {
                    return Err(super::RuntimeError::ConfigError(
                        "threads_per_unit must be at least 1".into(),
                    ));
                }
                Ok(Arc::new(SimulatedGateway::new(self.simulated_config())))
            }
            other => Err(super::RuntimeError::ConfigError(format!(
                "unknown gateway '{other}'; expected 'simulated'"
            ))),
        }
    }

    /// The simulator settings derived from this config.
    pub fn simulated_config(&self) -> SimulatedConfig {
        SimulatedConfig {
            available_units: self.simulated_units,
            threads_per_unit: self.threads_per_unit,
            clock_hz: self.clock_hz,
            cycle_model: self.cycle_model,
            host_threads: self.host_threads,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            first_key: 0,
            last_key: 1 << 10,
            loops: 1 << 20,
            units: 0,
            threads_per_unit: execution_gateway::simulated::DEFAULT_THREADS_PER_UNIT,
            clock_hz: execution_gateway::simulated::DEFAULT_CLOCK_HZ,
            program: execution_gateway::kernel::KERNEL_NAME.to_string(),
            strategy: "front-loaded".to_string(),
            gateway: "simulated".to_string(),
            simulated_units: 4,
            cycle_model: CycleModel::Measured,
            host_threads: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = RuntimeConfig::default();
        assert_eq!(c.first_key, 0);
        assert_eq!(c.last_key, 1024);
        assert_eq!(c.loops, 1_048_576);
        assert_eq!(c.clock_hz, 600_000_000);
        assert_eq!(c.program, "keccakf");
    }

    #[test]
    fn test_from_toml_partial() {
        let toml = r#"
first_key = 100
last_key = 200
loops = 8
strategy = "ceiling"
"#;
        let c = RuntimeConfig::from_toml(toml).unwrap();
        assert_eq!(c.range().unwrap(), GlobalRange::new(100, 200).unwrap());
        assert_eq!(c.loops, 8);
        assert_eq!(c.strategy, "ceiling");
        assert_eq!(c.threads_per_unit, 16);
    }

    #[test]
    fn test_cycle_model_in_toml() {
        let c = RuntimeConfig::from_toml("cycle_model = { per-permutation = 40 }").unwrap();
        assert_eq!(c.cycle_model, CycleModel::PerPermutation(40));
        let c = RuntimeConfig::from_toml(r#"cycle_model = "measured""#).unwrap();
        assert_eq!(c.cycle_model, CycleModel::Measured);
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = RuntimeConfig {
            units: 3,
            host_threads: Some(2),
            ..Default::default()
        };
        let toml = c.to_toml().unwrap();
        let back = RuntimeConfig::from_toml(&toml).unwrap();
        assert_eq!(back.units, 3);
        assert_eq!(back.host_threads, Some(2));
        assert_eq!(back.strategy, c.strategy);
    }

    #[test]
    fn test_inverted_range() {
        let c = RuntimeConfig {
            first_key: 9,
            last_key: 1,
            ..Default::default()
        };
        assert!(c.range().is_err());
    }

    #[test]
    fn test_create_strategy() {
        let c = RuntimeConfig::default();
        assert_eq!(c.create_strategy().unwrap().name(), "front-loaded");
        let bad = RuntimeConfig {
            strategy: "bogus".into(),
            ..Default::default()
        };
        assert!(bad.create_strategy().is_err());
    }

    #[test]
    fn test_create_gateway() {
        let gw = RuntimeConfig::default().create_gateway().unwrap();
        assert_eq!(gw.name(), "simulated");
        assert_eq!(gw.threads_per_unit(), 16);

        let bad = RuntimeConfig {
            gateway: "upmem".into(),
            ..Default::default()
        };
        assert!(bad.create_gateway().is_err());

        let no_threads = RuntimeConfig {
            threads_per_unit: 0,
            ..Default::default()
        };
        assert!(no_threads.create_gateway().is_err());
    }
}
