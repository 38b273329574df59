//! Propagation and congestion model.
//!
//! Pure functions: given a sensor, a fog node, and the node's current
//! cumulative load, compute the radio link, the load this sensor would
//! add, and the resulting M/M/1-style latency scores. Nothing here mutates
//! state, so the same code serves committed decisions and what-if scoring.
//!
//! Channel gain is computed in dB and converted back to the linear domain
//! before it enters the SNR.

use std::collections::BTreeMap;

use olb_core::{FogNode, NodeId, SensorDevice};
use serde::{Deserialize, Serialize};

use crate::error::{PlacementError, PlacementResult};

/// Speed of light in m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Cumulative fractional utilization of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeLoad {
    /// Traffic load TL.
    pub traffic: f64,
    /// Compute load CL.
    pub compute: f64,
}

impl NodeLoad {
    pub fn new(traffic: f64, compute: f64) -> Self {
        Self { traffic, compute }
    }

    /// Both loads strictly below saturation and non-negative.
    pub fn is_feasible(&self) -> bool {
        (0.0..1.0).contains(&self.traffic) && (0.0..1.0).contains(&self.compute)
    }

    /// The larger of the two utilizations.
    pub fn peak(&self) -> f64 {
        self.traffic.max(self.compute)
    }
}

/// Current load per node, as seen by a scoring pass.
pub type LoadSnapshot = BTreeMap<NodeId, NodeLoad>;

/// Why a node cannot take a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Infeasibility {
    /// Projected TL or CL at or above 1.
    Saturated { traffic: f64, compute: f64 },
    /// Link capacity is not positive.
    InvalidCapacity { capacity: f64 },
}

impl std::fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Infeasibility::Saturated { traffic, compute } => {
                write!(f, "saturated (TL'={traffic:.4}, CL'={compute:.4})")
            }
            Infeasibility::InvalidCapacity { capacity } => {
                write!(f, "invalid capacity {capacity}")
            }
        }
    }
}

impl Infeasibility {
    /// Classify a model error. Only an unusable link makes a node
    /// infeasible; zero distance and everything else stay errors.
    pub fn from_error(err: &PlacementError) -> Option<Self> {
        match err {
            PlacementError::InvalidCapacity { capacity, .. } => {
                Some(Infeasibility::InvalidCapacity {
                    capacity: *capacity,
                })
            }
            _ => None,
        }
    }
}

/// Radio link and the per-sensor load contributions (`ea`, `eb`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadContribution {
    /// Distance used by the model, after any clamping (m).
    pub distance: f64,
    pub channel_gain_db: f64,
    pub snr: f64,
    /// Device capacity `c_j` (Mb/s).
    pub capacity: f64,
    /// Traffic load contribution `ea`.
    pub traffic: f64,
    /// Compute load contribution `eb`.
    pub compute: f64,
}

/// Hypothetical post-assignment load of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub node_id: NodeId,
    /// `TL'` and `CL'`.
    pub load: NodeLoad,
    pub feasible: bool,
    pub contribution: LoadContribution,
}

impl Projection {
    /// `(L_m, L_p)` if the projected load is feasible.
    pub fn latencies(&self) -> Option<(f64, f64)> {
        if !self.feasible {
            return None;
        }
        Some((
            congestion_latency(self.load.traffic)?,
            congestion_latency(self.load.compute)?,
        ))
    }
}

/// Outcome of scoring one node for one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Feasible {
        /// Communication latency `L_m`.
        comm_latency: f64,
        /// Computing latency `L_p`.
        comp_latency: f64,
        /// Projected `TL'`, `CL'`.
        projected: NodeLoad,
    },
    Infeasible(Infeasibility),
}

/// Scored candidate for a single node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeScore {
    pub node_id: NodeId,
    /// Raw Euclidean distance between sensor and node (m).
    pub distance: f64,
    pub outcome: ScoreOutcome,
}

impl NodeScore {
    pub fn is_feasible(&self) -> bool {
        matches!(self.outcome, ScoreOutcome::Feasible { .. })
    }

    /// `L_total = L_m + L_p`, only for feasible nodes.
    pub fn total_latency(&self) -> Option<f64> {
        match self.outcome {
            ScoreOutcome::Feasible {
                comm_latency,
                comp_latency,
                ..
            } => Some(comm_latency + comp_latency),
            ScoreOutcome::Infeasible(_) => None,
        }
    }

    /// Build a score from a projection attempt.
    ///
    /// Invalid capacity becomes an infeasible score; any other error is returned.
    pub fn from_projection(
        node: &FogNode,
        distance: f64,
        projection: PlacementResult<Projection>,
    ) -> PlacementResult<Self> {
        let outcome = match projection {
            Ok(p) => match p.latencies() {
                Some((comm_latency, comp_latency)) => ScoreOutcome::Feasible {
                    comm_latency,
                    comp_latency,
                    projected: p.load,
                },
                None => ScoreOutcome::Infeasible(Infeasibility::Saturated {
                    traffic: p.load.traffic,
                    compute: p.load.compute,
                }),
            },
            Err(e) => match Infeasibility::from_error(&e) {
                Some(reason) => ScoreOutcome::Infeasible(reason),
                None => return Err(e),
            },
        };
        Ok(Self {
            node_id: node.id,
            distance,
            outcome,
        })
    }
}

// ── Link formulas ─────────────────────────────────────────────────

/// Wavelength λ = c / f, with `f` in GHz.
pub fn wavelength(carrier_ghz: f64) -> f64 {
    SPEED_OF_LIGHT / (carrier_ghz * 1e9)
}

/// Free-space channel gain `10·log10(λ² / (4πd)²)` in dB. Usually negative.
pub fn channel_gain_db(distance: f64, carrier_ghz: f64) -> f64 {
    let lambda = wavelength(carrier_ghz);
    let path = 4.0 * std::f64::consts::PI * distance;
    10.0 * (lambda.powi(2) / path.powi(2)).log10()
}

pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

/// `SNR = P · g_linear / σ²`.
pub fn snr(transmission_power: f64, gain_db: f64, noise_power: f64) -> f64 {
    transmission_power * db_to_linear(gain_db) / noise_power
}

/// `L = load / (1 - load)`; `None` outside `[0, 1)`.
pub fn congestion_latency(load: f64) -> Option<f64> {
    if (0.0..1.0).contains(&load) {
        Some(load / (1.0 - load))
    } else {
        None
    }
}

// ── Model ─────────────────────────────────────────────────────────

/// Stateless scoring model. The only knob is an optional minimum distance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PropagationModel {
    min_distance_m: Option<f64>,
}

impl PropagationModel {
    pub fn new(min_distance_m: Option<f64>) -> Self {
        Self { min_distance_m }
    }

    pub fn from_config(config: &olb_core::config::ModelConfig) -> Self {
        Self::new(config.min_distance_m)
    }

    /// Distance used by the link budget.
    ///
    /// Clamped up to the configured minimum; without one, zero distance is
    /// `DegenerateGeometry`.
    pub fn distance(&self, sensor: &SensorDevice, node: &FogNode) -> PlacementResult<f64> {
        let d = sensor.position.distance_to(&node.position);
        match self.min_distance_m {
            Some(min) => Ok(d.max(min)),
            None if d > 0.0 => Ok(d),
            None => Err(PlacementError::DegenerateGeometry {
                sensor: sensor.id,
                node: node.id,
            }),
        }
    }

    /// Link budget and the load this sensor adds to `node`.
    pub fn contribution(
        &self,
        sensor: &SensorDevice,
        node: &FogNode,
    ) -> PlacementResult<LoadContribution> {
        let distance = self.distance(sensor, node)?;
        let gain_db = channel_gain_db(distance, node.carrier_frequency);
        let snr = snr(sensor.transmission_power, gain_db, node.noise_power);
        let capacity = node.bandwidth * (1.0 + snr);
        // Written as a negated comparison so NaN is rejected too.
        if !(capacity > 0.0) {
            return Err(PlacementError::InvalidCapacity {
                sensor: sensor.id,
                node: node.id,
                capacity,
            });
        }
        Ok(LoadContribution {
            distance,
            channel_gain_db: gain_db,
            snr,
            capacity,
            traffic: sensor.data_rate() / capacity,
            compute: sensor.instruction_rate() / node.processing_power,
        })
    }

    /// Hypothetical load of `node` after taking `sensor`, from `current`.
    pub fn project(
        &self,
        sensor: &SensorDevice,
        node: &FogNode,
        current: NodeLoad,
    ) -> PlacementResult<Projection> {
        let contribution = self.contribution(sensor, node)?;
        let load = NodeLoad::new(
            current.traffic + contribution.traffic,
            current.compute + contribution.compute,
        );
        Ok(Projection {
            node_id: node.id,
            load,
            feasible: load.is_feasible(),
            contribution,
        })
    }

    /// Score every node against a load snapshot, in node order.
    ///
    /// Nodes missing from the snapshot are treated as unloaded.
    pub fn score(
        &self,
        sensor: &SensorDevice,
        nodes: &[FogNode],
        snapshot: &LoadSnapshot,
    ) -> PlacementResult<Vec<NodeScore>> {
        nodes
            .iter()
            .map(|node| {
                let current = snapshot.get(&node.id).copied().unwrap_or_default();
                let distance = sensor.position.distance_to(&node.position);
                NodeScore::from_projection(node, distance, self.project(sensor, node, current))
            })
            .collect()
    }
}
