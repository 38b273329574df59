//! Error types for environment construction and configuration.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building devices, environments, or configs.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{entity} at ({x:.1}, {y:.1}) outside environment bounds {width}x{height}")]
    OutOfBounds {
        entity: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },

    #[error("invalid device {entity}: {reason}")]
    InvalidDevice { entity: String, reason: String },

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("config error: {0}")]
    Config(String),
}
