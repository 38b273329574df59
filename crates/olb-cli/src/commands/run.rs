//! `olb run`: one policy, one environment, results to disk.

use std::path::Path;

use olb_core::Environment;
use olb_metrics::{RunResults, format_report};
use tracing::info;

use super::RunArgs;

pub fn run(args: &RunArgs, format: &str) -> anyhow::Result<()> {
    let config = args.load_config()?;
    let env = Environment::from_config(&config)?;
    let policy = config.simulation.policy;
    info!(
        %policy,
        scenario = %config.simulation.scenario,
        sensors = env.sensors.len(),
        nodes = env.fog_nodes.len(),
        "starting run"
    );

    let results = RunResults::collect(&env, policy, &config)?;

    let dir = Path::new(&config.output.dir);
    results.write_json(&dir.join(config.output.results_file_for(policy)))?;
    results.write_report(&dir.join(config.output.report_file_for(policy)))?;

    match format {
        "json" => println!("{}", results.to_json()?),
        _ => println!("{}", format_report(&results)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use olb_core::config::PolicyKind;

    #[test]
    fn run_writes_results_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            policy: Some(PolicyKind::Random),
            sensors: Some(8),
            nodes: Some(3),
            out: Some(dir.path().display().to_string()),
            ..RunArgs::default()
        };
        run(&args, "json").unwrap();

        let json = std::fs::read_to_string(dir.path().join("random_results.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["policy"], "random");
        assert_eq!(value["environment"]["num_sensors"], 8);
        assert!(dir.path().join("random_report.txt").is_file());
    }
}
