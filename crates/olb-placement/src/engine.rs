//! OLB placement engine: one greedy decision per sensor arrival.
//!
//! For each sensor the engine walks `Idle → Scoring → Selecting →
//! Committed`, then returns to `Idle` on the next arrival; it ends in
//! `Drained` once the caller has no more arrivals. It never revisits a
//! committed sensor, so the result is a per-decision optimum under the
//! load seen at that moment, not a global one.

use olb_core::config::PolicyKind;
use olb_core::{NodeId, SensorDevice, SensorId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::accountant::{LoadAccountant, NodeState};
use crate::error::{PlacementError, PlacementResult};
use crate::model::{NodeLoad, NodeScore, ScoreOutcome};
use crate::policy::PlacementPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnginePhase {
    Idle,
    Scoring,
    Selecting,
    Committed,
    Drained,
}

/// One committed decision. Immutable once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// Position in the decision log.
    pub order: usize,
    pub sensor_id: SensorId,
    pub node_id: NodeId,
    /// `L_m` at decision time.
    pub comm_latency: f64,
    /// `L_p` at decision time.
    pub comp_latency: f64,
    /// Node load right after the commit.
    pub load_after: NodeLoad,
}

impl AssignmentRecord {
    pub fn total_latency(&self) -> f64 {
        self.comm_latency + self.comp_latency
    }
}

pub struct PlacementEngine {
    accountant: LoadAccountant,
    policy: Box<dyn PlacementPolicy>,
    log: Vec<AssignmentRecord>,
    phase: EnginePhase,
}

impl PlacementEngine {
    pub fn new(accountant: LoadAccountant, policy: Box<dyn PlacementPolicy>) -> Self {
        Self {
            accountant,
            policy,
            log: Vec::new(),
            phase: EnginePhase::Idle,
        }
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// What-if scores for `sensor` under the current load. No mutation.
    pub fn score(&self, sensor: &SensorDevice) -> PlacementResult<Vec<NodeScore>> {
        self.policy.score(sensor, &self.accountant)
    }

    /// Place `sensor`, commit the load, and log the decision.
    ///
    /// Fails with `NoFeasibleNode` (state untouched) when every node would
    /// saturate or has no usable link. A sensor sitting on a node with no
    /// minimum distance configured fails with `DegenerateGeometry`, also
    /// without touching state.
    pub fn decide(&mut self, sensor: &SensorDevice) -> PlacementResult<AssignmentRecord> {
        if self.phase == EnginePhase::Drained {
            return Err(PlacementError::Drained);
        }
        self.transition(EnginePhase::Idle);

        self.transition(EnginePhase::Scoring);
        let scores = match self.policy.score(sensor, &self.accountant) {
            Ok(scores) => scores,
            Err(e) => {
                self.transition(EnginePhase::Idle);
                return Err(e);
            }
        };

        self.transition(EnginePhase::Selecting);
        let candidates: Vec<&NodeScore> = scores.iter().filter(|s| s.is_feasible()).collect();
        if candidates.is_empty() {
            self.transition(EnginePhase::Idle);
            let reasons = scores
                .iter()
                .filter_map(|s| match s.outcome {
                    ScoreOutcome::Infeasible(reason) => Some((s.node_id, reason)),
                    ScoreOutcome::Feasible { .. } => None,
                })
                .collect();
            warn!(sensor = sensor.id, "no feasible fog node");
            return Err(PlacementError::NoFeasibleNode {
                sensor: sensor.id,
                reasons,
            });
        }

        let chosen = self
            .policy
            .select(sensor, &candidates)
            .and_then(|id| candidates.iter().find(|c| c.node_id == id).copied());
        let Some(&NodeScore {
            node_id,
            outcome:
                ScoreOutcome::Feasible {
                    comm_latency,
                    comp_latency,
                    projected,
                },
            ..
        }) = chosen
        else {
            self.transition(EnginePhase::Idle);
            return Err(PlacementError::StateConflict {
                node: candidates[0].node_id,
                reason: format!("{} policy selected no feasible candidate", self.policy.kind()),
            });
        };

        if let Err(e) = self.accountant.commit(node_id, sensor.id, projected) {
            self.transition(EnginePhase::Idle);
            return Err(e);
        }

        let record = AssignmentRecord {
            order: self.log.len(),
            sensor_id: sensor.id,
            node_id,
            comm_latency,
            comp_latency,
            load_after: projected,
        };
        self.log.push(record.clone());
        self.transition(EnginePhase::Committed);

        debug!(
            policy = %self.policy.kind(),
            sensor = sensor.id,
            node = node_id,
            l_m = comm_latency,
            l_p = comp_latency,
            l_total = record.total_latency(),
            "sensor placed"
        );
        Ok(record)
    }

    /// Mark the arrival stream as finished. Further `decide` calls fail.
    pub fn drain(&mut self) {
        self.transition(EnginePhase::Drained);
    }

    pub fn node_state(&self, node_id: NodeId) -> Option<&NodeState> {
        self.accountant.node_state(node_id)
    }

    pub fn accountant(&self) -> &LoadAccountant {
        &self.accountant
    }

    /// Mutable access for setting background load before the first decision.
    pub fn accountant_mut(&mut self) -> &mut LoadAccountant {
        &mut self.accountant
    }

    pub fn log(&self) -> &[AssignmentRecord] {
        &self.log
    }

    pub fn into_parts(self) -> (Vec<AssignmentRecord>, LoadAccountant) {
        (self.log, self.accountant)
    }

    fn transition(&mut self, next: EnginePhase) {
        trace!(from = ?self.phase, to = ?next, "engine phase");
        self.phase = next;
    }
}
