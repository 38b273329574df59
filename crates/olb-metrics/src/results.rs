//! Result document for one run, written as pretty JSON.

use std::path::Path;

use anyhow::Context;
use olb_core::config::PolicyKind;
use olb_core::{ArrivalQueue, Environment, EnvironmentSummary, ScenarioKind, SimulationConfig};
use olb_placement::{NodeState, Rejection, RunOutcome, Simulation};
use serde::Serialize;
use tracing::info;

use crate::aggregator::{AssignmentDetail, MetricsAggregator, RunMetrics};
use crate::report::format_report;

#[derive(Debug, Clone, Serialize)]
pub struct RunResults {
    pub policy: PolicyKind,
    pub scenario: ScenarioKind,
    pub seed: u64,
    /// Effective configuration, after CLI overrides.
    pub config: SimulationConfig,
    pub environment: EnvironmentSummary,
    pub metrics: RunMetrics,
    pub assignments: Vec<AssignmentDetail>,
    pub rejections: Vec<Rejection>,
    pub nodes: Vec<NodeState>,
}

impl RunResults {
    /// Run `policy` over `env` and reduce the outcome.
    ///
    /// The run gets its own node state; `env` is only read.
    pub fn collect(
        env: &Environment,
        policy: PolicyKind,
        config: &SimulationConfig,
    ) -> anyhow::Result<Self> {
        let queue = ArrivalQueue::from_environment(
            env,
            config.simulation.arrival_order,
            config.simulation.seed,
        );
        let mut aggregator = MetricsAggregator::new(&env.fog_nodes);

        let outcome = Simulation::new(env, policy, config)
            .and_then(|sim| sim.run(queue, &mut aggregator))
            .with_context(|| format!("{policy} run failed"))?;

        Ok(Self::from_outcome(config, env, outcome, &aggregator))
    }

    pub fn from_outcome(
        config: &SimulationConfig,
        env: &Environment,
        outcome: RunOutcome,
        aggregator: &MetricsAggregator,
    ) -> Self {
        let metrics = aggregator.finalize(
            &outcome.nodes,
            config.simulation.duration_secs,
            &config.metrics,
        );
        Self {
            policy: outcome.policy,
            scenario: config.simulation.scenario,
            seed: config.simulation.seed,
            config: config.clone(),
            environment: env.summary(),
            metrics,
            assignments: aggregator.assignments().to_vec(),
            rejections: outcome.rejections,
            nodes: outcome.nodes,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        write_creating_dirs(path, &self.to_json()?)?;
        info!(policy = %self.policy, path = %path.display(), "results written");
        Ok(())
    }

    pub fn write_report(&self, path: &Path) -> anyhow::Result<()> {
        write_creating_dirs(path, &format_report(self))?;
        info!(policy = %self.policy, path = %path.display(), "report written");
        Ok(())
    }
}

fn write_creating_dirs(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> RunResults {
        let config = SimulationConfig::default();
        let env = Environment::from_config(&config).unwrap();
        RunResults::collect(&env, PolicyKind::Olb, &config).unwrap()
    }

    #[test]
    fn collect_matches_environment() {
        let r = results();
        assert_eq!(r.policy, PolicyKind::Olb);
        assert_eq!(r.environment.num_sensors, 10);
        assert_eq!(r.environment.num_fog_nodes, 6);
        assert_eq!(r.assignments.len() + r.rejections.len(), 10);
        assert_eq!(r.metrics.assigned, r.assignments.len());
        assert_eq!(r.nodes.len(), 6);
    }

    #[test]
    fn collect_is_deterministic() {
        let a = results();
        let b = results();
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.metrics, b.metrics);
    }

    #[test]
    fn write_json_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("olb_results.json");
        let r = results();
        r.write_json(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["policy"], "olb");
        assert_eq!(value["seed"], 42);
        assert_eq!(value["environment"]["num_fog_nodes"], 6);
        assert!(value["metrics"]["overall_latency"].is_number());
        assert!(value["assignments"].is_array());
    }

    #[test]
    fn write_report_writes_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("olb_report.txt");
        results().write_report(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Overall Latency"));
    }
}
