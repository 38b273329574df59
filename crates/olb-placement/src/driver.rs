//! Simulation driver: feeds arrivals to the engine in order.
//!
//! Drains an [`ArrivalQueue`] synchronously, one decision at a time.
//! `NoFeasibleNode` is recorded as a rejection and the run continues;
//! every other error aborts the run.

use olb_core::config::PolicyKind;
use olb_core::{ArrivalQueue, Environment, NodeId, SensorDevice, SensorId, SimulationConfig};
use serde::Serialize;
use tracing::{info, warn};

use crate::accountant::{LoadAccountant, NodeState};
use crate::engine::{AssignmentRecord, PlacementEngine};
use crate::error::{PlacementError, PlacementResult};
use crate::model::{Infeasibility, PropagationModel};
use crate::policy::build_policy;

/// Receives decisions as they are made.
pub trait DecisionSink {
    fn on_decision(&mut self, sensor: &SensorDevice, record: &AssignmentRecord);

    fn on_rejection(&mut self, _rejection: &Rejection) {}
}

impl DecisionSink for Vec<AssignmentRecord> {
    fn on_decision(&mut self, _sensor: &SensorDevice, record: &AssignmentRecord) {
        self.push(record.clone());
    }
}

/// A sensor no node could take.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    /// Index of the arrival in the queue.
    pub arrival: usize,
    pub sensor_id: SensorId,
    pub reasons: Vec<(NodeId, Infeasibility)>,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub policy: PolicyKind,
    pub log: Vec<AssignmentRecord>,
    pub rejections: Vec<Rejection>,
    /// Final node states in id order.
    pub nodes: Vec<NodeState>,
}

/// One run over one environment. Owns an isolated copy of node state.
pub struct Simulation<'a> {
    env: &'a Environment,
    engine: PlacementEngine,
}

impl<'a> Simulation<'a> {
    /// Build a run with the given policy and the config's model and seed.
    pub fn new(
        env: &'a Environment,
        policy: PolicyKind,
        config: &SimulationConfig,
    ) -> PlacementResult<Self> {
        let accountant = LoadAccountant::new(
            env.fog_nodes.iter().cloned(),
            PropagationModel::from_config(&config.model),
        )?;
        let engine = PlacementEngine::new(accountant, build_policy(policy, config.simulation.seed));
        Ok(Self { env, engine })
    }

    /// Process every arrival, then drain the engine.
    pub fn run(
        mut self,
        queue: ArrivalQueue,
        sink: &mut dyn DecisionSink,
    ) -> PlacementResult<RunOutcome> {
        let policy = self.engine.policy_kind();
        let mut rejections = Vec::new();
        info!(%policy, arrivals = queue.len(), "run started");

        for (arrival, event) in queue.enumerate() {
            let sensor = self
                .env
                .sensor(event.sensor_id)
                .ok_or(PlacementError::UnknownSensor(event.sensor_id))?;

            match self.engine.decide(sensor) {
                Ok(record) => sink.on_decision(sensor, &record),
                Err(PlacementError::NoFeasibleNode { sensor, reasons }) => {
                    let rejection = Rejection {
                        arrival,
                        sensor_id: sensor,
                        reasons,
                    };
                    warn!(sensor, arrival, "sensor rejected");
                    sink.on_rejection(&rejection);
                    rejections.push(rejection);
                }
                Err(e) => {
                    warn!(%policy, error = %e, "run aborted");
                    return Err(e);
                }
            }
        }

        self.engine.drain();
        let (log, accountant) = self.engine.into_parts();
        info!(
            %policy,
            placed = log.len(),
            rejected = rejections.len(),
            "run finished"
        );
        Ok(RunOutcome {
            policy,
            log,
            rejections,
            nodes: accountant.nodes().cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use olb_core::{ArrivalEvent, ArrivalOrder};

    fn env() -> Environment {
        Environment::generate(3000.0, 2000.0, 12, 4, 42).unwrap()
    }

    #[test]
    fn run_places_every_sensor_or_rejects_it() {
        let env = env();
        let config = SimulationConfig::default();
        let queue = ArrivalQueue::from_environment(&env, ArrivalOrder::ById, 0);
        let mut sink: Vec<AssignmentRecord> = Vec::new();

        let outcome = Simulation::new(&env, PolicyKind::Olb, &config)
            .unwrap()
            .run(queue, &mut sink)
            .unwrap();

        assert_eq!(outcome.log.len() + outcome.rejections.len(), 12);
        assert_eq!(sink, outcome.log);
        let assigned: usize = outcome.nodes.iter().map(|n| n.assigned.len()).sum();
        assert_eq!(assigned, outcome.log.len());
        for n in &outcome.nodes {
            assert!(n.load.is_feasible());
        }
    }

    #[test]
    fn unknown_sensor_aborts() {
        let env = env();
        let config = SimulationConfig::default();
        let queue = ArrivalQueue::from_events([ArrivalEvent {
            sensor_id: 999,
            timestamp: 0.0,
        }]);
        let err = Simulation::new(&env, PolicyKind::Olb, &config)
            .unwrap()
            .run(queue, &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, PlacementError::UnknownSensor(999));
    }

    #[test]
    fn rejections_are_recorded_and_run_continues() {
        let mut env = Environment::new(1000.0, 1000.0);
        env.add_fog_node(olb_core::FogNode {
            id: 0,
            position: olb_core::Position::new(500.0, 500.0),
            processing_power: 1000.0,
            bandwidth: 50.0,
            carrier_frequency: 2.4,
            noise_power: 1e-11,
        })
        .unwrap();
        for (id, flow_size) in [(0, 2000.0), (1, 100.0)] {
            env.add_sensor(SensorDevice {
                id,
                position: olb_core::Position::new(100.0, 100.0),
                transmission_power: 0.5,
                flow_rate: 1.0,
                traffic_size: 0.1,
                flow_size,
            })
            .unwrap();
        }

        let queue = ArrivalQueue::from_environment(&env, ArrivalOrder::ById, 0);
        let outcome = Simulation::new(&env, PolicyKind::Olb, &SimulationConfig::default())
            .unwrap()
            .run(queue, &mut Vec::new())
            .unwrap();

        assert_eq!(outcome.rejections.len(), 1);
        assert_eq!(outcome.rejections[0].sensor_id, 0);
        assert_eq!(outcome.rejections[0].arrival, 0);
        assert_eq!(outcome.log.len(), 1);
        assert_eq!(outcome.log[0].sensor_id, 1);
    }

    #[test]
    fn colocated_sensor_aborts_unless_clamped() {
        let mut env = Environment::new(1000.0, 1000.0);
        for (id, x) in [(0, 500.0), (1, 900.0)] {
            env.add_fog_node(olb_core::FogNode {
                id,
                position: olb_core::Position::new(x, 500.0),
                processing_power: 1000.0,
                bandwidth: 50.0,
                carrier_frequency: 2.4,
                noise_power: 1e-11,
            })
            .unwrap();
        }
        env.add_sensor(SensorDevice {
            id: 0,
            position: olb_core::Position::new(500.0, 500.0),
            transmission_power: 0.5,
            flow_rate: 1.0,
            traffic_size: 0.1,
            flow_size: 100.0,
        })
        .unwrap();

        let queue = || ArrivalQueue::from_environment(&env, ArrivalOrder::ById, 0);
        let err = Simulation::new(&env, PolicyKind::Olb, &SimulationConfig::default())
            .unwrap()
            .run(queue(), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, PlacementError::DegenerateGeometry { sensor: 0, node: 0 });

        let mut clamped = SimulationConfig::default();
        clamped.model.min_distance_m = Some(1.0);
        let outcome = Simulation::new(&env, PolicyKind::Olb, &clamped)
            .unwrap()
            .run(queue(), &mut Vec::new())
            .unwrap();
        assert_eq!(outcome.log.len(), 1);
        assert_eq!(outcome.log[0].node_id, 0);
    }
}
