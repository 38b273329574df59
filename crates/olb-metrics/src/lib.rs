//! olb-metrics: run-level KPIs for OLB placement runs.
//!
//! Consumes the decision stream of a run and the final node states, and
//! reduces them to latency, network, energy, cost, and load-balance
//! figures. Nothing here feeds back into placement.
//!
//! # Architecture
//!
//! ```text
//! MetricsAggregator (DecisionSink)
//!   ├── on_decision() ← called per committed assignment
//!   ├── on_rejection() ← called per NoFeasibleNode
//!   └── finalize() → RunMetrics
//!
//! RunResults
//!   ├── write_json() → <dir>/<policy>_results.json
//!   └── format_report() / format_comparison() → text
//! ```

pub mod aggregator;
pub mod report;
pub mod results;

pub use aggregator::{
    AssignmentDetail, LoadBalanceStats, MetricsAggregator, NodeUtilization, RunMetrics,
};
pub use report::{format_comparison, format_report};
pub use results::RunResults;
