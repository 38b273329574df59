pub mod compare;
pub mod init;
pub mod run;
pub mod scenarios;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use olb_core::config::PolicyKind;
use olb_core::{ScenarioKind, SimulationConfig};

/// Flags shared by `run` and `compare`. Anything set here wins over the file.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Path to olb.toml (defaults are used when absent)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Placement policy: olb, random, distance
    #[arg(short, long)]
    pub policy: Option<PolicyKind>,
    /// Seed for environment generation, arrival shuffling, and random placement
    #[arg(long)]
    pub seed: Option<u64>,
    /// Scenario: random, icu, ambulatory, emergency
    #[arg(long)]
    pub scenario: Option<ScenarioKind>,
    /// Number of sensors (random scenario)
    #[arg(long)]
    pub sensors: Option<u32>,
    /// Number of fog nodes (random scenario)
    #[arg(long)]
    pub nodes: Option<u32>,
    /// Directory for result files
    #[arg(short, long)]
    pub out: Option<String>,
}

impl RunArgs {
    /// Load the config file (or defaults) and apply the flag overrides.
    pub fn load_config(&self) -> anyhow::Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SimulationConfig::default(),
        };

        if let Some(policy) = self.policy {
            config.simulation.policy = policy;
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(scenario) = self.scenario {
            config.simulation.scenario = scenario;
        }
        if let Some(n) = self.sensors {
            config.devices.num_sensors = n;
        }
        if let Some(n) = self.nodes {
            config.devices.num_fog_nodes = n;
        }
        if let Some(dir) = &self.out {
            config.output.dir = dir.clone();
        }

        config.validate()?;
        Ok(config)
    }
}
