//! Device descriptors for the IoT tier and the fog tier.
//!
//! Both descriptors are immutable once built. Mutable load state for a fog
//! node lives in the placement crate's load accountant, never here.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Identifier of a sensor device.
pub type SensorId = u32;

/// Identifier of a fog node. Lower ids win placement ties.
pub type NodeId = u32;

/// A point in the planar environment, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Shift by the given offsets.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

// ── Tier 1: sensors ────────────────────────────────────────────────

/// An IoT sensor producing a stream of workload units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDevice {
    pub id: SensorId,
    pub position: Position,
    /// Transmission power in watts.
    pub transmission_power: f64,
    /// Average arrival frequency of workload units, in Hz.
    pub flow_rate: f64,
    /// Size of one workload unit on the wire, in megabits.
    pub traffic_size: f64,
    /// Computational demand of one workload unit, in million instructions.
    pub flow_size: f64,
}

impl SensorDevice {
    /// Data rate this sensor puts on the network (Mb/s).
    pub fn data_rate(&self) -> f64 {
        self.flow_rate * self.traffic_size
    }

    /// Instruction rate this sensor demands (MIPS).
    pub fn instruction_rate(&self) -> f64 {
        self.flow_rate * self.flow_size
    }

    /// Check that every parameter is finite and non-negative.
    pub fn validate(&self) -> CoreResult<()> {
        let entity = format!("sensor {}", self.id);
        check_finite(&entity, "x", self.position.x)?;
        check_finite(&entity, "y", self.position.y)?;
        check_non_negative(&entity, "transmission_power", self.transmission_power)?;
        check_non_negative(&entity, "flow_rate", self.flow_rate)?;
        check_non_negative(&entity, "traffic_size", self.traffic_size)?;
        check_non_negative(&entity, "flow_size", self.flow_size)?;
        Ok(())
    }
}

// ── Tier 2: fog nodes ──────────────────────────────────────────────

/// Static descriptor of a fog node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogNode {
    pub id: NodeId,
    pub position: Position,
    /// Processing power in MIPS.
    pub processing_power: f64,
    /// Channel bandwidth in MHz.
    pub bandwidth: f64,
    /// Carrier frequency in GHz.
    pub carrier_frequency: f64,
    /// Receiver noise power σ² in watts.
    pub noise_power: f64,
}

impl FogNode {
    /// Check that every parameter used as a divisor is strictly positive.
    pub fn validate(&self) -> CoreResult<()> {
        let entity = format!("fog node {}", self.id);
        check_finite(&entity, "x", self.position.x)?;
        check_finite(&entity, "y", self.position.y)?;
        check_positive(&entity, "processing_power", self.processing_power)?;
        check_positive(&entity, "bandwidth", self.bandwidth)?;
        check_positive(&entity, "carrier_frequency", self.carrier_frequency)?;
        check_positive(&entity, "noise_power", self.noise_power)?;
        Ok(())
    }
}

fn check_finite(entity: &str, field: &str, value: f64) -> CoreResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::InvalidDevice {
            entity: entity.to_string(),
            reason: format!("{field} is not finite"),
        })
    }
}

fn check_non_negative(entity: &str, field: &str, value: f64) -> CoreResult<()> {
    check_finite(entity, field, value)?;
    if value < 0.0 {
        return Err(CoreError::InvalidDevice {
            entity: entity.to_string(),
            reason: format!("{field} must be >= 0, got {value}"),
        });
    }
    Ok(())
}

fn check_positive(entity: &str, field: &str, value: f64) -> CoreResult<()> {
    check_finite(entity, field, value)?;
    if value <= 0.0 {
        return Err(CoreError::InvalidDevice {
            entity: entity.to_string(),
            reason: format!("{field} must be > 0, got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_node(id: NodeId) -> FogNode {
        FogNode {
            id,
            position: Position::new(100.0, 100.0),
            processing_power: 2000.0,
            bandwidth: 50.0,
            carrier_frequency: 2.4,
            noise_power: 1e-11,
        }
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.distance_to(&a), 5.0);
    }

    #[test]
    fn sensor_rates() {
        let s = SensorDevice {
            id: 1,
            position: Position::new(0.0, 0.0),
            transmission_power: 0.5,
            flow_rate: 2.0,
            traffic_size: 0.5,
            flow_size: 300.0,
        };
        assert_eq!(s.data_rate(), 1.0);
        assert_eq!(s.instruction_rate(), 600.0);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn rejects_zero_processing_power() {
        let mut node = make_node(3);
        node.processing_power = 0.0;
        let err = node.validate().unwrap_err();
        assert!(err.to_string().contains("processing_power"));
    }

    #[test]
    fn rejects_nan_noise() {
        let mut node = make_node(3);
        node.noise_power = f64::NAN;
        assert!(node.validate().is_err());
    }

    #[test]
    fn rejects_negative_flow_rate() {
        let s = SensorDevice {
            id: 9,
            position: Position::new(0.0, 0.0),
            transmission_power: 0.5,
            flow_rate: -1.0,
            traffic_size: 0.5,
            flow_size: 300.0,
        };
        assert!(s.validate().is_err());
    }
}
