//! Placement error types.

use olb_core::{NodeId, SensorId};
use thiserror::Error;

use crate::model::Infeasibility;

/// Errors raised by a single placement decision or commit.
///
/// All of them are local to one decision and are returned to the caller;
/// none are retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("sensor {sensor} and fog node {node} share a position (zero distance)")]
    DegenerateGeometry { sensor: SensorId, node: NodeId },

    #[error("fog node {node} has non-positive capacity {capacity} for sensor {sensor}")]
    InvalidCapacity {
        sensor: SensorId,
        node: NodeId,
        capacity: f64,
    },

    #[error("no feasible fog node for sensor {sensor} ({} node(s) rejected)", .reasons.len())]
    NoFeasibleNode {
        sensor: SensorId,
        reasons: Vec<(NodeId, Infeasibility)>,
    },

    #[error("state conflict on fog node {node}: {reason}")]
    StateConflict { node: NodeId, reason: String },

    #[error("fog node {node} would saturate (TL={tl:.4}, CL={cl:.4})")]
    Saturated { node: NodeId, tl: f64, cl: f64 },

    #[error("unknown fog node: {0}")]
    UnknownNode(NodeId),

    #[error("duplicate fog node: {0}")]
    DuplicateNode(NodeId),

    #[error("unknown sensor: {0}")]
    UnknownSensor(SensorId),

    #[error("placement engine already drained")]
    Drained,
}

pub type PlacementResult<T> = Result<T, PlacementError>;
