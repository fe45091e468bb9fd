// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # keyspace-rt
//!
//! Command-line interface for the keyspace dispatch runtime.
//!
//! ## Usage
//! ```bash
//! # Search keys 0..1024, 1048576 permutations each, on every unit
//! keyspace-rt
//!
//! # Explicit range and loop count on two units
//! keyspace-rt 0 4096 64 --units 2
//!
//! # Print the partition without running it
//! keyspace-rt plan 0 10 1 --units 1 --threads 4
//!
//! # Sweep unit counts and strategies
//! keyspace-rt benchmark 0 65536 16 --sweep-units 1,2,4
//! ```

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "keyspace-rt",
    about = "Partitioned keyspace search across execution units",
    version,
    author,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Path to a TOML configuration file (explicit CLI values take precedence).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    search: SearchArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search batch (the default when no subcommand is given).
    Run {
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Partition the range and print every worker's parameters without running.
    Plan {
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Run the same search across several unit counts and strategies.
    Benchmark {
        #[command(flatten)]
        search: SearchArgs,

        /// Comma-separated unit counts to sweep (e.g., "1,2,4").
        #[arg(long, default_value = "1,2,4")]
        sweep_units: String,

        /// Strategies to benchmark (comma-separated).
        #[arg(long, default_value = "front-loaded,ceiling")]
        strategies: String,
    },
}

/// The search parameters shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// First key of the range (inclusive) [default: 0].
    first_key: Option<u64>,

    /// Last key of the range (exclusive) [default: 1024].
    last_key: Option<u64>,

    /// Permutations applied to each key [default: 1048576].
    loop_count: Option<u64>,

    /// Units to allocate (0 = every available unit).
    #[arg(short, long)]
    units: Option<u32>,

    /// Threads per unit.
    #[arg(short, long)]
    threads: Option<u32>,

    /// Device clock frequency used for cycle-based timing.
    #[arg(long)]
    clock_hz: Option<u64>,

    /// Partition strategy: front-loaded, ceiling.
    #[arg(short, long)]
    strategy: Option<String>,

    /// Units the simulated gateway exposes.
    #[arg(long)]
    sim_units: Option<u32>,
}

impl SearchArgs {
    /// Builds the runtime configuration: defaults, then the config file,
    /// then any value given explicitly on the command line.
    pub fn resolve(&self, config_path: Option<&Path>) -> anyhow::Result<runtime::RuntimeConfig> {
        let mut config = match config_path {
            Some(path) => runtime::RuntimeConfig::from_file(path)?,
            None => runtime::RuntimeConfig::default(),
        };

        if let Some(v) = self.first_key {
            config.first_key = v;
        }
        if let Some(v) = self.last_key {
            config.last_key = v;
        }
        if let Some(v) = self.loop_count {
            config.loops = v;
        }
        if let Some(v) = self.units {
            config.units = v;
        }
        if let Some(v) = self.threads {
            config.threads_per_unit = v;
        }
        if let Some(v) = self.clock_hz {
            config.clock_hz = v;
        }
        if let Some(v) = &self.strategy {
            config.strategy = v.clone();
        }
        if let Some(v) = self.sim_units {
            config.simulated_units = v;
        }

        tracing::debug!("resolved config: {config:?}");
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        None => {
            let config = cli.search.resolve(config_path)?;
            commands::run::execute(config, cli.json).await
        }
        Some(Commands::Run { search }) => {
            let config = search.resolve(config_path)?;
            commands::run::execute(config, cli.json).await
        }
        Some(Commands::Plan { search }) => {
            let config = search.resolve(config_path)?;
            commands::plan::execute(config, cli.json)
        }
        Some(Commands::Benchmark {
            search,
            sweep_units,
            strategies,
        }) => {
            let config = search.resolve(config_path)?;
            commands::benchmark::execute(config, &sweep_units, &strategies, cli.json).await
        }
    }
}
