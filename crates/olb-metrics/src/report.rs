//! Human-readable report formatting.

use std::collections::BTreeMap;

use olb_core::NodeId;

use crate::aggregator::AssignmentDetail;
use crate::results::RunResults;

const BOX_WIDTH: usize = 42;

pub fn format_report(results: &RunResults) -> String {
    let mut out = String::new();
    let m = &results.metrics;

    out.push_str(&format!("\n╔{}╗\n", "═".repeat(BOX_WIDTH)));
    box_line(&mut out, "OLB Placement Run");
    out.push_str(&format!("╠{}╣\n", "═".repeat(BOX_WIDTH)));
    box_line(&mut out, &format!("Policy:   {}", results.policy));
    box_line(&mut out, &format!("Scenario: {}", results.scenario));
    box_line(&mut out, &format!("Seed:     {}", results.seed));
    box_line(
        &mut out,
        &format!(
            "Devices:  {} sensors / {} fog nodes",
            results.environment.num_sensors, results.environment.num_fog_nodes
        ),
    );
    out.push_str(&format!("╚{}╝\n\n", "═".repeat(BOX_WIDTH)));

    out.push_str("KEY PERFORMANCE INDICATORS:\n");
    out.push_str(&format!("  Overall Latency (L):        {:.4}\n", m.overall_latency));
    out.push_str(&format!("    - Communication Latency:  {:.4}\n", m.communication_latency));
    out.push_str(&format!("    - Computing Latency:      {:.4}\n", m.computing_latency));
    out.push_str(&format!("  Execution Time (Te):        {:.4}\n", m.execution_time));
    out.push_str(&format!("  Network Usage (Nusage):     {:.4} Mb/s\n", m.network_usage));
    out.push_str(&format!(
        "  Network Volume:             {:.1} Mb over {}s\n",
        m.network_volume, results.config.simulation.duration_secs
    ));
    out.push_str(&format!("  Energy Consumption:         {:.4} W\n", m.energy_consumption));
    out.push_str(&format!("    - Transmission:           {:.4} W\n", m.transmission_energy));
    out.push_str(&format!("    - Processing:             {:.4} W\n", m.processing_energy));
    out.push_str(&format!("  Cost of Execution (Ce):     {:.4}\n\n", m.cost_of_execution));

    let lb = &m.load_balance;
    out.push_str("LOAD BALANCE:\n");
    out.push_str(&format!("  Score:                {:.4}\n", lb.score));
    out.push_str(&format!("  Mean utilization:     {:.4}\n", lb.mean_utilization));
    out.push_str(&format!("  Max utilization:      {:.4}\n", lb.max_utilization));
    out.push_str(&format!("  Utilization variance: {:.6}\n", lb.utilization_variance));
    out.push_str(&format!("  Assigned / rejected:  {} / {}\n\n", m.assigned, m.rejected));

    out.push_str("PER-NODE BREAKDOWN:\n");
    let by_node = group_by_node(&results.assignments);
    for node in &lb.per_node {
        out.push_str(&format!(
            "\n  Fog Node {}: {} sensors (TL {:.4}, CL {:.4})\n",
            node.node_id, node.sensors, node.traffic_load, node.compute_load
        ));
        for a in by_node.get(&node.node_id).into_iter().flatten() {
            out.push_str(&format!(
                "    Sensor {}: L_total = {:.4} (L_m {:.4}, L_p {:.4}) at {}\n",
                a.sensor_id, a.total_latency, a.comm_latency, a.comp_latency, a.sensor_position
            ));
        }
    }

    if !results.rejections.is_empty() {
        out.push_str("\nREJECTED (no feasible fog node):\n\n");
        for r in &results.rejections {
            out.push_str(&format!("  • Sensor {} (arrival {})\n", r.sensor_id, r.arrival));
            for (node, reason) in &r.reasons {
                out.push_str(&format!("      node {node}: {reason}\n"));
            }
        }
    }

    out
}

/// Side-by-side KPI table, one column per run.
pub fn format_comparison(runs: &[RunResults]) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{:<24}", "KPI"));
    for r in runs {
        out.push_str(&format!("{:>14}", r.policy.label()));
    }
    out.push('\n');
    out.push_str(&format!("{}\n", "─".repeat(24 + 14 * runs.len())));

    let rows: [(&str, fn(&RunResults) -> String); 8] = [
        ("Overall latency", |r| format!("{:.4}", r.metrics.overall_latency)),
        ("Execution time", |r| format!("{:.4}", r.metrics.execution_time)),
        ("Network usage (Mb/s)", |r| format!("{:.4}", r.metrics.network_usage)),
        ("Energy (W)", |r| format!("{:.4}", r.metrics.energy_consumption)),
        ("Cost of execution", |r| format!("{:.4}", r.metrics.cost_of_execution)),
        ("Load-balance score", |r| format!("{:.4}", r.metrics.load_balance.score)),
        ("Assigned", |r| r.metrics.assigned.to_string()),
        ("Rejected", |r| r.metrics.rejected.to_string()),
    ];
    for (label, value) in rows {
        out.push_str(&format!("{label:<24}"));
        for r in runs {
            out.push_str(&format!("{:>14}", value(r)));
        }
        out.push('\n');
    }

    if let Some(best) = runs
        .iter()
        .min_by(|a, b| a.metrics.overall_latency.total_cmp(&b.metrics.overall_latency))
    {
        out.push_str(&format!("\nLowest overall latency: {}\n", best.policy));
    }

    out
}

fn box_line(out: &mut String, text: &str) {
    out.push_str(&format!("║  {:<width$}║\n", text, width = BOX_WIDTH - 2));
}

fn group_by_node(assignments: &[AssignmentDetail]) -> BTreeMap<NodeId, Vec<&AssignmentDetail>> {
    let mut map: BTreeMap<NodeId, Vec<&AssignmentDetail>> = BTreeMap::new();
    for a in assignments {
        map.entry(a.node_id).or_default().push(a);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use olb_core::config::PolicyKind;
    use olb_core::{Environment, SimulationConfig};

    fn run(policy: PolicyKind) -> RunResults {
        let config = SimulationConfig::default();
        let env = Environment::from_config(&config).unwrap();
        RunResults::collect(&env, policy, &config).unwrap()
    }

    #[test]
    fn report_lists_kpis_and_nodes() {
        let r = run(PolicyKind::Olb);
        let text = format_report(&r);

        assert!(text.contains("Policy:   olb"));
        assert!(text.contains("Overall Latency (L)"));
        assert!(text.contains("Cost of Execution (Ce)"));
        for node in &r.nodes {
            assert!(text.contains(&format!("Fog Node {}:", node.node.id)));
        }
        for a in &r.assignments {
            assert!(text.contains(&format!("Sensor {}: L_total", a.sensor_id)));
        }
    }

    #[test]
    fn box_lines_have_equal_width() {
        let text = format_report(&run(PolicyKind::Distance));
        let widths: Vec<usize> = text
            .lines()
            .filter(|l| l.starts_with('║'))
            .map(|l| l.chars().count())
            .collect();
        assert!(!widths.is_empty());
        assert!(widths.iter().all(|w| *w == BOX_WIDTH + 2));
    }

    #[test]
    fn comparison_has_one_column_per_policy() {
        let runs: Vec<RunResults> = PolicyKind::ALL.into_iter().map(run).collect();
        let text = format_comparison(&runs);

        let header = text.lines().find(|l| l.starts_with("KPI")).unwrap();
        for kind in PolicyKind::ALL {
            assert!(header.contains(kind.label()));
        }
        assert!(text.contains("Load-balance score"));
        assert!(text.contains("Lowest overall latency:"));
    }
}
