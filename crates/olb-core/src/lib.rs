//! olb-core: shared types for the OLB fog placement simulator.
//!
//! Holds the immutable device descriptors, the digital-twin environment
//! that generates them, the ordered arrival queue consumed by the
//! placement engine, and the `olb.toml` configuration.

pub mod config;
pub mod devices;
pub mod environment;
pub mod error;
pub mod events;
pub mod scenarios;

pub use config::SimulationConfig;
pub use devices::*;
pub use environment::{Environment, EnvironmentSummary};
pub use error::{CoreError, CoreResult};
pub use events::{ArrivalEvent, ArrivalOrder, ArrivalQueue};
pub use scenarios::ScenarioKind;
