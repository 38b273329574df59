//! Load accountant: sole owner of mutable fog-node state.
//!
//! Tracks cumulative traffic load (TL), compute load (CL), and the set of
//! assigned sensors per node. Projections are read-only; `commit` is the
//! single point where load is actually applied. Commits are all-or-nothing
//! and must be monotonic: load is never released within a run.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use olb_core::{FogNode, NodeId, SensorDevice, SensorId};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{PlacementError, PlacementResult};
use crate::model::{LoadSnapshot, NodeLoad, NodeScore, Projection, PropagationModel};

/// Read-only view of one node: descriptor, cumulative load, assigned sensors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeState {
    pub node: FogNode,
    pub load: NodeLoad,
    pub assigned: BTreeSet<SensorId>,
}

/// Owns per-node load state for exactly one run.
///
/// Single-writer: callers must not interleave commits for the same node.
/// Independent runs each build their own accountant.
#[derive(Debug, Clone)]
pub struct LoadAccountant {
    model: PropagationModel,
    nodes: BTreeMap<NodeId, NodeState>,
    /// sensor → node it was committed to.
    placed: HashMap<SensorId, NodeId>,
}

impl LoadAccountant {
    /// Take ownership of a fixed node set, all starting unloaded.
    pub fn new(
        nodes: impl IntoIterator<Item = FogNode>,
        model: PropagationModel,
    ) -> PlacementResult<Self> {
        let mut map = BTreeMap::new();
        for node in nodes {
            let id = node.id;
            let state = NodeState {
                node,
                load: NodeLoad::default(),
                assigned: BTreeSet::new(),
            };
            if map.insert(id, state).is_some() {
                return Err(PlacementError::DuplicateNode(id));
            }
        }
        Ok(Self {
            model,
            nodes: map,
            placed: HashMap::new(),
        })
    }

    /// Seed a node with background load before the run starts.
    ///
    /// Subject to the same rules as a commit: in `[0, 1)` and never below
    /// the stored value.
    pub fn preload(&mut self, node_id: NodeId, load: NodeLoad) -> PlacementResult<()> {
        let state = self.state_mut(node_id)?;
        check_transition(node_id, state.load, load)?;
        state.load = load;
        debug!(node = node_id, tl = load.traffic, cl = load.compute, "node preloaded");
        Ok(())
    }

    /// Post-assignment load of `node_id` if it took `sensor`. No mutation.
    pub fn project(&self, node_id: NodeId, sensor: &SensorDevice) -> PlacementResult<Projection> {
        let state = self.state(node_id)?;
        self.model.project(sensor, &state.node, state.load)
    }

    /// Score every node for `sensor` through [`project`](Self::project), in id order.
    pub fn score(&self, sensor: &SensorDevice) -> PlacementResult<Vec<NodeScore>> {
        self.nodes
            .values()
            .map(|state| {
                let distance = sensor.position.distance_to(&state.node.position);
                let score = NodeScore::from_projection(
                    &state.node,
                    distance,
                    self.project(state.node.id, sensor),
                )?;
                trace!(
                    sensor = sensor.id,
                    node = state.node.id,
                    l_total = ?score.total_latency(),
                    "node scored"
                );
                Ok(score)
            })
            .collect()
    }

    /// Apply a decision: set the node's load to `projected` and record the sensor.
    pub fn commit(
        &mut self,
        node_id: NodeId,
        sensor_id: SensorId,
        projected: NodeLoad,
    ) -> PlacementResult<()> {
        if let Some(&existing) = self.placed.get(&sensor_id) {
            return Err(PlacementError::StateConflict {
                node: node_id,
                reason: format!("sensor {sensor_id} already committed to node {existing}"),
            });
        }
        let state = self.state_mut(node_id)?;
        check_transition(node_id, state.load, projected)?;

        state.load = projected;
        state.assigned.insert(sensor_id);
        self.placed.insert(sensor_id, node_id);
        debug!(
            node = node_id,
            sensor = sensor_id,
            tl = projected.traffic,
            cl = projected.compute,
            "load committed"
        );
        Ok(())
    }

    pub fn node_state(&self, node_id: NodeId) -> Option<&NodeState> {
        self.nodes.get(&node_id)
    }

    /// All node states in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeState> {
        self.nodes.values()
    }

    pub fn snapshot(&self) -> LoadSnapshot {
        self.nodes.iter().map(|(id, s)| (*id, s.load)).collect()
    }

    pub fn placement_of(&self, sensor_id: SensorId) -> Option<NodeId> {
        self.placed.get(&sensor_id).copied()
    }

    fn state(&self, node_id: NodeId) -> PlacementResult<&NodeState> {
        self.nodes
            .get(&node_id)
            .ok_or(PlacementError::UnknownNode(node_id))
    }

    fn state_mut(&mut self, node_id: NodeId) -> PlacementResult<&mut NodeState> {
        self.nodes
            .get_mut(&node_id)
            .ok_or(PlacementError::UnknownNode(node_id))
    }
}

/// A load change is allowed only if it stays below saturation and never decreases.
fn check_transition(node: NodeId, current: NodeLoad, next: NodeLoad) -> PlacementResult<()> {
    if !next.is_feasible() {
        return Err(PlacementError::Saturated {
            node,
            tl: next.traffic,
            cl: next.compute,
        });
    }
    if next.traffic < current.traffic || next.compute < current.compute {
        return Err(PlacementError::StateConflict {
            node,
            reason: format!(
                "non-monotonic load: ({:.6}, {:.6}) -> ({:.6}, {:.6})",
                current.traffic, current.compute, next.traffic, next.compute
            ),
        });
    }
    Ok(())
}
