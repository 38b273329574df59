//! Placement policies sharing one scoring interface.
//!
//! Every policy scores through the propagation/congestion model and is
//! offered only the feasible candidates, so baselines obey the same
//! saturation invariant as OLB and report comparable latencies.

use std::cmp::Ordering;

use olb_core::config::PolicyKind;
use olb_core::{NodeId, SensorDevice};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::accountant::LoadAccountant;
use crate::error::PlacementResult;
use crate::model::NodeScore;

pub trait PlacementPolicy: Send {
    fn kind(&self) -> PolicyKind;

    /// Score every node for `sensor` against the accountant's current load.
    fn score(
        &self,
        sensor: &SensorDevice,
        accountant: &LoadAccountant,
    ) -> PlacementResult<Vec<NodeScore>> {
        accountant.score(sensor)
    }

    /// Pick one of the feasible candidates (never empty, id order).
    fn select(&mut self, sensor: &SensorDevice, candidates: &[&NodeScore]) -> Option<NodeId>;
}

/// Build the policy a config names.
pub fn build_policy(kind: PolicyKind, seed: u64) -> Box<dyn PlacementPolicy> {
    match kind {
        PolicyKind::Olb => Box::new(OlbPolicy),
        PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
        PolicyKind::Distance => Box::new(DistancePolicy),
    }
}

/// Minimum `L_total`; ties go to the lowest node id.
#[derive(Debug, Default, Clone, Copy)]
pub struct OlbPolicy;

impl PlacementPolicy for OlbPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Olb
    }

    fn select(&mut self, _sensor: &SensorDevice, candidates: &[&NodeScore]) -> Option<NodeId> {
        candidates
            .iter()
            .filter_map(|c| c.total_latency().map(|l| (l, c.node_id)))
            .min_by(|a, b| lowest_then_id(*a, *b))
            .map(|(_, id)| id)
    }
}

/// Uniformly random feasible node, reproducible for a fixed seed.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PlacementPolicy for RandomPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Random
    }

    fn select(&mut self, _sensor: &SensorDevice, candidates: &[&NodeScore]) -> Option<NodeId> {
        candidates.choose(&mut self.rng).map(|c| c.node_id)
    }
}

/// Nearest feasible node; ties go to the lowest node id.
#[derive(Debug, Default, Clone, Copy)]
pub struct DistancePolicy;

impl PlacementPolicy for DistancePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Distance
    }

    fn select(&mut self, _sensor: &SensorDevice, candidates: &[&NodeScore]) -> Option<NodeId> {
        candidates
            .iter()
            .map(|c| (c.distance, c.node_id))
            .min_by(|a, b| lowest_then_id(*a, *b))
            .map(|(_, id)| id)
    }
}

fn lowest_then_id(a: (f64, NodeId), b: (f64, NodeId)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeLoad, ScoreOutcome};
    use olb_core::Position;

    fn sensor() -> SensorDevice {
        SensorDevice {
            id: 0,
            position: Position::new(0.0, 0.0),
            transmission_power: 0.5,
            flow_rate: 1.0,
            traffic_size: 1.0,
            flow_size: 1.0,
        }
    }

    fn feasible(node_id: NodeId, distance: f64, l_m: f64, l_p: f64) -> NodeScore {
        NodeScore {
            node_id,
            distance,
            outcome: ScoreOutcome::Feasible {
                comm_latency: l_m,
                comp_latency: l_p,
                projected: NodeLoad::new(0.1, 0.1),
            },
        }
    }

    #[test]
    fn olb_picks_lowest_latency() {
        let scores = [
            feasible(0, 10.0, 0.5, 0.5),
            feasible(1, 90.0, 0.1, 0.2),
            feasible(2, 5.0, 0.3, 0.3),
        ];
        let refs: Vec<&NodeScore> = scores.iter().collect();
        assert_eq!(OlbPolicy.select(&sensor(), &refs), Some(1));
    }

    #[test]
    fn olb_tie_breaks_on_lowest_id() {
        let scores = [
            feasible(4, 10.0, 0.25, 0.25),
            feasible(2, 90.0, 0.25, 0.25),
            feasible(7, 1.0, 0.25, 0.25),
        ];
        let refs: Vec<&NodeScore> = scores.iter().collect();
        assert_eq!(OlbPolicy.select(&sensor(), &refs), Some(2));
    }

    #[test]
    fn distance_picks_nearest() {
        let scores = [
            feasible(0, 10.0, 0.0, 0.0),
            feasible(1, 3.0, 9.0, 9.0),
            feasible(2, 3.0, 0.0, 0.0),
        ];
        let refs: Vec<&NodeScore> = scores.iter().collect();
        assert_eq!(DistancePolicy.select(&sensor(), &refs), Some(1));
    }

    #[test]
    fn random_is_seeded_and_in_range() {
        let scores = [
            feasible(3, 1.0, 0.1, 0.1),
            feasible(5, 1.0, 0.1, 0.1),
            feasible(8, 1.0, 0.1, 0.1),
        ];
        let refs: Vec<&NodeScore> = scores.iter().collect();

        let mut a = RandomPolicy::new(17);
        let mut b = RandomPolicy::new(17);
        let picks_a: Vec<_> = (0..20).map(|_| a.select(&sensor(), &refs).unwrap()).collect();
        let picks_b: Vec<_> = (0..20).map(|_| b.select(&sensor(), &refs).unwrap()).collect();
        assert_eq!(picks_a, picks_b);
        assert!(picks_a.iter().all(|id| [3, 5, 8].contains(id)));
    }

    #[test]
    fn empty_candidates_select_nothing() {
        assert_eq!(OlbPolicy.select(&sensor(), &[]), None);
        assert_eq!(DistancePolicy.select(&sensor(), &[]), None);
        assert_eq!(RandomPolicy::new(1).select(&sensor(), &[]), None);
    }

    #[test]
    fn build_policy_matches_kind() {
        for kind in PolicyKind::ALL {
            assert_eq!(build_policy(kind, 0).kind(), kind);
        }
    }
}
