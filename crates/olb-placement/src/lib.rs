//! olb-placement: greedy online placement of sensor workloads on fog nodes.
//!
//! Each sensor arrival is scored against every fog node with a radio
//! propagation model plus an M/M/1-style congestion model, the best
//! feasible node is chosen, and its cumulative load is committed so later
//! arrivals see it.
//!
//! # Components
//!
//! - **`model`**: channel gain, SNR, capacity, load contributions, latency
//! - **`accountant`**: per-node TL/CL and assigned sensors; projections and commits
//! - **`policy`**: OLB, random, and distance selection over the shared scores
//! - **`engine`**: per-arrival state machine and the assignment log
//! - **`driver`**: runs an arrival queue through an engine
//!
//! ```text
//! ArrivalQueue ─▶ Simulation ─▶ PlacementEngine ─┬─▶ policy.score ─▶ LoadAccountant::project
//!                     │                          ├─▶ policy.select
//!                     ▼                          └─▶ LoadAccountant::commit
//!               DecisionSink
//! ```

pub mod accountant;
pub mod driver;
pub mod engine;
pub mod error;
pub mod model;
pub mod policy;

pub use accountant::{LoadAccountant, NodeState};
pub use driver::{DecisionSink, Rejection, RunOutcome, Simulation};
pub use engine::{AssignmentRecord, EnginePhase, PlacementEngine};
pub use error::{PlacementError, PlacementResult};
pub use model::{
    Infeasibility, LoadContribution, LoadSnapshot, NodeLoad, NodeScore, Projection,
    PropagationModel, ScoreOutcome,
};
pub use policy::{DistancePolicy, OlbPolicy, PlacementPolicy, RandomPolicy, build_policy};
