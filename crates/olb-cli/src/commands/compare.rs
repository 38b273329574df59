//! `olb compare`: every policy over the same environment, in parallel.
//!
//! Each run is a blocking task with its own clone of the environment and
//! its own accountant; results are returned in the order requested.

use std::path::Path;

use anyhow::Context;
use olb_core::config::PolicyKind;
use olb_core::{Environment, SimulationConfig};
use olb_metrics::{RunResults, format_comparison};
use tokio::task::JoinSet;
use tracing::info;

use super::RunArgs;

pub async fn compare(args: &RunArgs) -> anyhow::Result<()> {
    let config = args.load_config()?;
    let env = Environment::from_config(&config)?;
    info!(
        scenario = %config.simulation.scenario,
        sensors = env.sensors.len(),
        nodes = env.fog_nodes.len(),
        "starting comparison"
    );

    let runs = run_all(&env, &config, &PolicyKind::ALL).await?;

    let dir = Path::new(&config.output.dir);
    for r in &runs {
        r.write_json(&dir.join(config.output.results_file_for(r.policy)))?;
        r.write_report(&dir.join(config.output.report_file_for(r.policy)))?;
    }
    println!("{}", format_comparison(&runs));
    Ok(())
}

pub async fn run_all(
    env: &Environment,
    config: &SimulationConfig,
    policies: &[PolicyKind],
) -> anyhow::Result<Vec<RunResults>> {
    let mut set = JoinSet::new();
    for (slot, &policy) in policies.iter().enumerate() {
        let env = env.clone();
        let config = config.clone();
        set.spawn_blocking(move || (slot, RunResults::collect(&env, policy, &config)));
    }

    let mut finished = Vec::with_capacity(policies.len());
    while let Some(joined) = set.join_next().await {
        let (slot, result) = joined.context("comparison task panicked")?;
        finished.push((slot, result?));
    }
    finished.sort_by_key(|(slot, _)| *slot);
    Ok(finished.into_iter().map(|(_, r)| r).collect())
}
