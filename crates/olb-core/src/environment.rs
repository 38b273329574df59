//! Digital-twin environment: the planar space and the devices in it.
//!
//! The environment is built once before a run and handed to the placement
//! engine as a read-only catalogue. Every run that needs isolated node
//! state clones it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::devices::{FogNode, Position, SensorDevice, SensorId};
use crate::error::{CoreError, CoreResult};
use crate::scenarios::{self, ScenarioKind};

/// Offset applied to the seed of the fog-node stream so that sensor and
/// node draws stay independent.
const NODE_SEED_OFFSET: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub width: f64,
    pub height: f64,
    pub sensors: Vec<SensorDevice>,
    pub fog_nodes: Vec<FogNode>,
}

/// Compact description of an environment, echoed into result files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSummary {
    pub width: f64,
    pub height: f64,
    pub num_sensors: usize,
    pub num_fog_nodes: usize,
    pub sensor_positions: Vec<Position>,
    pub fog_node_positions: Vec<Position>,
}

impl Environment {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            sensors: Vec::new(),
            fog_nodes: Vec::new(),
        }
    }

    /// Build the environment a config asks for.
    pub fn from_config(config: &SimulationConfig) -> CoreResult<Self> {
        let width = config.environment.width;
        let height = config.environment.height;
        let seed = config.simulation.seed;
        let env = match config.simulation.scenario {
            ScenarioKind::Random => Self::generate(
                width,
                height,
                config.devices.num_sensors,
                config.devices.num_fog_nodes,
                seed,
            )?,
            ScenarioKind::Icu => scenarios::icu(width, height, scenarios::DEFAULT_ICU_BEDS)?,
            ScenarioKind::Ambulatory => scenarios::ambulatory(
                width,
                height,
                scenarios::DEFAULT_AMBULATORY_PATIENTS,
                seed,
            )?,
            ScenarioKind::Emergency => {
                scenarios::emergency(width, height, scenarios::DEFAULT_AMBULANCES)?
            }
        };
        info!(
            scenario = %config.simulation.scenario,
            sensors = env.sensors.len(),
            fog_nodes = env.fog_nodes.len(),
            "environment built"
        );
        Ok(env)
    }

    /// Generate a seeded random twin.
    pub fn generate(
        width: f64,
        height: f64,
        num_sensors: u32,
        num_fog_nodes: u32,
        seed: u64,
    ) -> CoreResult<Self> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(CoreError::Config(format!(
                "environment size must be finite and > 0, got {width} x {height}"
            )));
        }
        let mut env = Self::new(width, height);

        let mut rng = StdRng::seed_from_u64(seed);
        for id in 0..num_sensors {
            let sensor = SensorDevice {
                id,
                position: Position::new(rng.gen_range(0.0..=width), rng.gen_range(0.0..=height)),
                transmission_power: rng.gen_range(0.1..=1.0),
                flow_rate: rng.gen_range(0.5..=2.0),
                traffic_size: rng.gen_range(0.1..=1.0),
                flow_size: rng.gen_range(100.0..=1000.0),
            };
            env.add_sensor(sensor)?;
        }

        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(NODE_SEED_OFFSET));
        let max_x = (width - 100.0).min(2500.0).max(100.0);
        let max_y = (height - 100.0).min(1500.0).max(100.0);
        for id in 0..num_fog_nodes {
            let node = FogNode {
                id,
                position: Position::new(rng.gen_range(100.0..=max_x), rng.gen_range(100.0..=max_y)),
                processing_power: rng.gen_range(1000.0..=5000.0),
                bandwidth: rng.gen_range(10.0..=100.0),
                carrier_frequency: rng.gen_range(2.4..=5.0),
                noise_power: rng.gen_range(1e-12..=1e-10),
            };
            env.add_fog_node(node)?;
        }

        debug!(num_sensors, num_fog_nodes, seed, "random environment generated");
        Ok(env)
    }

    pub fn add_sensor(&mut self, sensor: SensorDevice) -> CoreResult<()> {
        sensor.validate()?;
        self.check_bounds(&format!("sensor {}", sensor.id), &sensor.position)?;
        if self.sensors.iter().any(|s| s.id == sensor.id) {
            return Err(CoreError::DuplicateId(format!("sensor {}", sensor.id)));
        }
        self.sensors.push(sensor);
        Ok(())
    }

    pub fn add_fog_node(&mut self, node: FogNode) -> CoreResult<()> {
        node.validate()?;
        self.check_bounds(&format!("fog node {}", node.id), &node.position)?;
        if self.fog_nodes.iter().any(|n| n.id == node.id) {
            return Err(CoreError::DuplicateId(format!("fog node {}", node.id)));
        }
        self.fog_nodes.push(node);
        Ok(())
    }

    pub fn sensor(&self, id: SensorId) -> Option<&SensorDevice> {
        self.sensors.iter().find(|s| s.id == id)
    }

    pub fn summary(&self) -> EnvironmentSummary {
        EnvironmentSummary {
            width: self.width,
            height: self.height,
            num_sensors: self.sensors.len(),
            num_fog_nodes: self.fog_nodes.len(),
            sensor_positions: self.sensors.iter().map(|s| s.position).collect(),
            fog_node_positions: self.fog_nodes.iter().map(|n| n.position).collect(),
        }
    }

    fn check_bounds(&self, entity: &str, p: &Position) -> CoreResult<()> {
        if (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y) {
            Ok(())
        } else {
            Err(CoreError::OutOfBounds {
                entity: entity.to_string(),
                x: p.x,
                y: p.y,
                width: self.width,
                height: self.height,
            })
        }
    }
}
