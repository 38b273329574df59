//! Metrics aggregator: folds committed decisions into run KPIs.
//!
//! Sums are accumulated incrementally as decisions arrive; node-level
//! figures (processing energy, utilization, balance) are taken from the
//! final node states in [`MetricsAggregator::finalize`].

use std::collections::BTreeMap;

use olb_core::config::MetricsConfig;
use olb_core::{FogNode, NodeId, Position, SensorDevice, SensorId};
use olb_placement::{AssignmentRecord, DecisionSink, NodeState, Rejection};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One committed assignment as it appears in results and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentDetail {
    pub order: usize,
    pub sensor_id: SensorId,
    pub node_id: NodeId,
    pub comm_latency: f64,
    pub comp_latency: f64,
    pub total_latency: f64,
    pub sensor_position: Position,
    pub node_position: Option<Position>,
}

/// Load of one node at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeUtilization {
    pub node_id: NodeId,
    pub sensors: usize,
    pub traffic_load: f64,
    pub compute_load: f64,
    /// `max(TL, CL)`.
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalanceStats {
    pub per_node: Vec<NodeUtilization>,
    pub mean_utilization: f64,
    pub max_utilization: f64,
    pub utilization_variance: f64,
    /// `1 / (1 + variance of per-node sensor counts)`. 1.0 is perfectly even.
    pub score: f64,
}

impl LoadBalanceStats {
    pub fn from_nodes(nodes: &[NodeState]) -> Self {
        let per_node: Vec<NodeUtilization> = nodes
            .iter()
            .map(|n| NodeUtilization {
                node_id: n.node.id,
                sensors: n.assigned.len(),
                traffic_load: n.load.traffic,
                compute_load: n.load.compute,
                utilization: n.load.peak(),
            })
            .collect();

        let utilizations: Vec<f64> = per_node.iter().map(|n| n.utilization).collect();
        let counts: Vec<f64> = per_node.iter().map(|n| n.sensors as f64).collect();

        Self {
            mean_utilization: mean(&utilizations),
            max_utilization: utilizations.iter().copied().fold(0.0, f64::max),
            utilization_variance: variance(&utilizations),
            score: 1.0 / (1.0 + variance(&counts)),
            per_node,
        }
    }
}

/// Run-level KPIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// `L = Σ (L_m + L_p)` over all assignments.
    pub overall_latency: f64,
    pub communication_latency: f64,
    pub computing_latency: f64,
    /// Mean `L_total` per assigned sensor.
    pub execution_time: f64,
    /// `Σ flow_rate × traffic_size` over assigned sensors (Mb/s).
    pub network_usage: f64,
    /// Network usage over the run duration (Mb).
    pub network_volume: f64,
    pub transmission_energy: f64,
    pub processing_energy: f64,
    pub energy_consumption: f64,
    pub cost_of_execution: f64,
    pub assigned: usize,
    pub rejected: usize,
    pub load_balance: LoadBalanceStats,
}

/// Collects decisions for one run. Plug it in as the run's [`DecisionSink`].
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    node_positions: BTreeMap<NodeId, Position>,
    comm_latency: f64,
    comp_latency: f64,
    network_usage: f64,
    transmission_energy: f64,
    assignments: Vec<AssignmentDetail>,
    rejected: Vec<SensorId>,
}

impl MetricsAggregator {
    pub fn new<'a>(nodes: impl IntoIterator<Item = &'a FogNode>) -> Self {
        Self {
            node_positions: nodes.into_iter().map(|n| (n.id, n.position)).collect(),
            ..Self::default()
        }
    }

    pub fn assignments(&self) -> &[AssignmentDetail] {
        &self.assignments
    }

    pub fn rejected(&self) -> &[SensorId] {
        &self.rejected
    }

    /// Reduce everything seen so far plus the final node states.
    pub fn finalize(
        &self,
        nodes: &[NodeState],
        duration_secs: f64,
        config: &MetricsConfig,
    ) -> RunMetrics {
        let overall_latency = self.comm_latency + self.comp_latency;
        let assigned = self.assignments.len();
        let execution_time = if assigned > 0 {
            overall_latency / assigned as f64
        } else {
            0.0
        };

        let processing_energy = if config.include_processing_energy {
            nodes
                .iter()
                .map(|n| {
                    n.load.compute * n.node.processing_power * config.processing_watts_per_mips
                })
                .sum()
        } else {
            0.0
        };
        let energy_consumption = self.transmission_energy + processing_energy;

        let cost_of_execution = overall_latency * config.latency_weight
            + self.network_usage * config.network_weight
            + energy_consumption * config.energy_weight;

        let metrics = RunMetrics {
            overall_latency,
            communication_latency: self.comm_latency,
            computing_latency: self.comp_latency,
            execution_time,
            network_usage: self.network_usage,
            network_volume: self.network_usage * duration_secs,
            transmission_energy: self.transmission_energy,
            processing_energy,
            energy_consumption,
            cost_of_execution,
            assigned,
            rejected: self.rejected.len(),
            load_balance: LoadBalanceStats::from_nodes(nodes),
        };
        debug!(
            assigned,
            rejected = metrics.rejected,
            overall_latency,
            cost = cost_of_execution,
            "metrics finalized"
        );
        metrics
    }
}

impl DecisionSink for MetricsAggregator {
    fn on_decision(&mut self, sensor: &SensorDevice, record: &AssignmentRecord) {
        self.comm_latency += record.comm_latency;
        self.comp_latency += record.comp_latency;
        self.network_usage += sensor.data_rate();
        self.transmission_energy += sensor.transmission_power;
        self.assignments.push(AssignmentDetail {
            order: record.order,
            sensor_id: record.sensor_id,
            node_id: record.node_id,
            comm_latency: record.comm_latency,
            comp_latency: record.comp_latency,
            total_latency: record.total_latency(),
            sensor_position: sensor.position,
            node_position: self.node_positions.get(&record.node_id).copied(),
        });
    }

    fn on_rejection(&mut self, rejection: &Rejection) {
        self.rejected.push(rejection.sensor_id);
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance.
fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}
