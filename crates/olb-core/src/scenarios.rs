//! Built-in healthcare scenarios with fixed device catalogues.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::devices::{FogNode, NodeId, Position, SensorDevice, SensorId};
use crate::environment::Environment;
use crate::error::CoreResult;

pub const DEFAULT_ICU_BEDS: u32 = 10;
pub const DEFAULT_AMBULATORY_PATIENTS: u32 = 15;
pub const DEFAULT_AMBULANCES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Seeded random twin sized by `[devices]`.
    #[default]
    Random,
    Icu,
    Ambulatory,
    Emergency,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::Random,
        ScenarioKind::Icu,
        ScenarioKind::Ambulatory,
        ScenarioKind::Emergency,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::Random => "random",
            ScenarioKind::Icu => "icu",
            ScenarioKind::Ambulatory => "ambulatory",
            ScenarioKind::Emergency => "emergency",
        }
    }

    /// Human-readable (name, description) pair.
    pub fn describe(&self) -> (&'static str, &'static str) {
        match self {
            ScenarioKind::Random => (
                "Random Twin",
                "Uniformly scattered sensors and fog nodes, sized by [devices]",
            ),
            ScenarioKind::Icu => (
                "Intensive Care Unit",
                "High-frequency continuous monitoring: ECG, vitals, ventilators, IV pumps",
            ),
            ScenarioKind::Ambulatory => (
                "Ambulatory Care",
                "Mobile patients with low-power wearable monitors",
            ),
            ScenarioKind::Emergency => (
                "Emergency Response",
                "Ambulances with emergency monitoring equipment",
            ),
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ScenarioKind {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioKind::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::error::CoreError::Config(format!("unknown scenario '{s}'")))
    }
}

/// (tx power W, flow rate Hz, traffic Mb, flow MI, dx, dy)
type SensorTemplate = (f64, f64, f64, f64, f64, f64);

/// (x, y, MIPS, MHz, GHz, noise W)
type NodeTemplate = (f64, f64, f64, f64, f64, f64);

const ICU_SENSORS: [SensorTemplate; 4] = [
    (0.8, 10.0, 2.0, 1500.0, 0.0, 0.0),  // ECG
    (0.6, 1.0, 0.5, 800.0, 50.0, 0.0),   // vital signs
    (0.9, 5.0, 1.0, 1200.0, 0.0, 50.0),  // ventilator
    (0.4, 0.2, 0.1, 300.0, 50.0, 50.0),  // IV pump
];

const ICU_NODES: [NodeTemplate; 3] = [
    (800.0, 800.0, 8000.0, 200.0, 5.0, 1e-11),
    (1200.0, 800.0, 6000.0, 150.0, 2.4, 1e-11),
    (1000.0, 1200.0, 5000.0, 100.0, 2.4, 1e-10),
];

const AMBULATORY_SENSORS: [SensorTemplate; 3] = [
    (0.2, 0.1, 0.05, 200.0, 0.0, 0.0),    // fitness tracker
    (0.3, 0.05, 0.02, 150.0, 10.0, 10.0), // glucose monitor
    (0.25, 0.02, 0.1, 400.0, -10.0, 10.0), // smart inhaler
];

const AMBULATORY_NODES: [NodeTemplate; 6] = [
    (600.0, 600.0, 3000.0, 80.0, 2.4, 1e-10),
    (1500.0, 600.0, 3500.0, 90.0, 2.4, 1e-10),
    (2400.0, 600.0, 3000.0, 80.0, 2.4, 1e-10),
    (600.0, 1400.0, 2500.0, 70.0, 2.4, 1e-10),
    (1500.0, 1400.0, 4000.0, 100.0, 5.0, 1e-11),
    (2400.0, 1400.0, 2500.0, 70.0, 2.4, 1e-10),
];

const EMERGENCY_SENSORS: [SensorTemplate; 5] = [
    (1.0, 20.0, 3.0, 2000.0, 0.0, 0.0),  // portable ECG
    (0.8, 5.0, 0.8, 600.0, 20.0, 0.0),   // pulse oximeter
    (0.7, 1.0, 0.3, 400.0, 0.0, 20.0),   // blood pressure
    (0.3, 0.5, 0.1, 200.0, 20.0, 20.0),  // temperature
    (0.5, 2.0, 0.05, 100.0, 10.0, 10.0), // GPS tracker
];

const EMERGENCY_NODES: [NodeTemplate; 5] = [
    (1500.0, 1000.0, 10000.0, 300.0, 5.0, 1e-12),
    (800.0, 800.0, 6000.0, 200.0, 5.0, 1e-11),
    (2200.0, 800.0, 6000.0, 200.0, 5.0, 1e-11),
    (1500.0, 400.0, 4000.0, 150.0, 2.4, 1e-10),
    (1500.0, 1600.0, 4000.0, 150.0, 2.4, 1e-10),
];

const AMBULANCE_POSITIONS: [(f64, f64); 5] = [
    (500.0, 300.0),
    (1200.0, 400.0),
    (2000.0, 600.0),
    (800.0, 1600.0),
    (2200.0, 1400.0),
];

/// ICU ward: beds on a 5x2 grid, four monitors per bed.
pub fn icu(width: f64, height: f64, num_beds: u32) -> CoreResult<Environment> {
    let beds: Vec<Position> = (0..5)
        .flat_map(|x| {
            (0..2).map(move |y| Position::new(x as f64 * 300.0 + 500.0, y as f64 * 400.0 + 600.0))
        })
        .collect();
    let mut env = Environment::new(width, height);
    for bed in 0..num_beds {
        let anchor = beds[bed as usize % beds.len()];
        add_group(&mut env, bed, anchor, &ICU_SENSORS)?;
    }
    add_nodes(&mut env, &ICU_NODES)?;
    Ok(env)
}

/// Outpatient clinic: patients at seeded random positions, three wearables each.
pub fn ambulatory(
    width: f64,
    height: f64,
    num_patients: u32,
    seed: u64,
) -> CoreResult<Environment> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut env = Environment::new(width, height);
    for patient in 0..num_patients {
        let anchor = Position::new(rng.gen_range(200.0..=2800.0), rng.gen_range(200.0..=1800.0));
        add_group(&mut env, patient, anchor, &AMBULATORY_SENSORS)?;
    }
    add_nodes(&mut env, &AMBULATORY_NODES)?;
    Ok(env)
}

/// Ambulances en route, five monitors each.
pub fn emergency(width: f64, height: f64, num_ambulances: u32) -> CoreResult<Environment> {
    let mut env = Environment::new(width, height);
    for unit in 0..num_ambulances {
        let (x, y) = AMBULANCE_POSITIONS[unit as usize % AMBULANCE_POSITIONS.len()];
        add_group(&mut env, unit, Position::new(x, y), &EMERGENCY_SENSORS)?;
    }
    add_nodes(&mut env, &EMERGENCY_NODES)?;
    Ok(env)
}

fn add_group(
    env: &mut Environment,
    group: u32,
    anchor: Position,
    templates: &[SensorTemplate],
) -> CoreResult<()> {
    let per_group = templates.len() as SensorId;
    for (k, &(power, rate, traffic, flow, dx, dy)) in templates.iter().enumerate() {
        env.add_sensor(SensorDevice {
            id: group * per_group + k as SensorId,
            position: anchor.offset(dx, dy),
            transmission_power: power,
            flow_rate: rate,
            traffic_size: traffic,
            flow_size: flow,
        })?;
    }
    Ok(())
}

fn add_nodes(env: &mut Environment, templates: &[NodeTemplate]) -> CoreResult<()> {
    for (id, &(x, y, mips, bw, ghz, noise)) in templates.iter().enumerate() {
        env.add_fog_node(FogNode {
            id: id as NodeId,
            position: Position::new(x, y),
            processing_power: mips,
            bandwidth: bw,
            carrier_frequency: ghz,
            noise_power: noise,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icu_layout() {
        let env = icu(3000.0, 2000.0, 10).unwrap();
        assert_eq!(env.sensors.len(), 40);
        assert_eq!(env.fog_nodes.len(), 3);
        // Bed 0 ECG sits on the first grid point.
        assert_eq!(env.sensors[0].position, Position::new(500.0, 600.0));
        assert_eq!(env.sensors[0].flow_rate, 10.0);
        // Ids are dense and unique.
        let ids: Vec<SensorId> = env.sensors.iter().map(|s| s.id).collect();
        assert_eq!(ids, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn ambulatory_is_seeded() {
        let a = ambulatory(3000.0, 2000.0, 15, 5).unwrap();
        let b = ambulatory(3000.0, 2000.0, 15, 5).unwrap();
        assert_eq!(a.sensors, b.sensors);
        assert_eq!(a.sensors.len(), 45);
        assert_eq!(a.fog_nodes.len(), 6);
    }

    #[test]
    fn emergency_wraps_positions() {
        let env = emergency(3000.0, 2000.0, 7).unwrap();
        assert_eq!(env.sensors.len(), 35);
        // Unit 5 reuses the first ambulance position.
        assert_eq!(env.sensors[25].position, env.sensors[0].position);
    }

    #[test]
    fn icu_does_not_fit_small_area() {
        assert!(icu(1000.0, 500.0, 1).is_err());
    }

    #[test]
    fn scenario_from_str() {
        assert_eq!("ICU".parse::<ScenarioKind>().unwrap(), ScenarioKind::Icu);
        assert!("hospital".parse::<ScenarioKind>().is_err());
    }
}
