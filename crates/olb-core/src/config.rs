//! olb.toml configuration parser.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::events::ArrivalOrder;
use crate::scenarios::ScenarioKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationConfig {
    pub environment: EnvironmentConfig,
    pub devices: DevicesConfig,
    pub simulation: RunConfig,
    pub model: ModelConfig,
    pub metrics: MetricsConfig,
    pub output: OutputConfig,
}

/// Size of the planar coordinate space, in metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            width: 3000.0,
            height: 2000.0,
        }
    }
}

/// Device counts for the randomly generated twin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicesConfig {
    pub num_sensors: u32,
    pub num_fog_nodes: u32,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            num_sensors: 10,
            num_fog_nodes: 6,
        }
    }
}

/// Which placement policy drives the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Olb,
    Random,
    Distance,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Olb, PolicyKind::Random, PolicyKind::Distance];

    pub fn label(&self) -> &'static str {
        match self {
            PolicyKind::Olb => "olb",
            PolicyKind::Random => "random",
            PolicyKind::Distance => "distance",
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "olb" => Ok(PolicyKind::Olb),
            "random" => Ok(PolicyKind::Random),
            "distance" => Ok(PolicyKind::Distance),
            other => Err(CoreError::Config(format!(
                "unknown policy '{other}' (expected olb, random, or distance)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub seed: u64,
    /// Simulated run length in seconds. Only used to turn rates into volumes.
    pub duration_secs: f64,
    pub policy: PolicyKind,
    pub arrival_order: ArrivalOrder,
    pub scenario: ScenarioKind,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            duration_secs: 1000.0,
            policy: PolicyKind::Olb,
            arrival_order: ArrivalOrder::ById,
            scenario: ScenarioKind::Random,
        }
    }
}

/// Propagation model knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ModelConfig {
    /// Distances below this are clamped up to it. Unset means a zero
    /// distance is reported as degenerate geometry.
    pub min_distance_m: Option<f64>,
}

/// Weights for the cost-of-execution composite and the energy model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub latency_weight: f64,
    pub network_weight: f64,
    pub energy_weight: f64,
    pub processing_watts_per_mips: f64,
    pub include_processing_energy: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            latency_weight: 0.1,
            network_weight: 0.05,
            energy_weight: 0.02,
            processing_watts_per_mips: 0.001,
            include_processing_energy: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    pub results_file: String,
    pub report_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "results".to_string(),
            results_file: "{policy}_results.json".to_string(),
            report_file: "{policy}_report.txt".to_string(),
        }
    }
}

impl OutputConfig {
    /// Results file name with the `{policy}` placeholder filled in.
    pub fn results_file_for(&self, policy: PolicyKind) -> String {
        self.results_file.replace("{policy}", policy.label())
    }

    /// Report file name with the `{policy}` placeholder filled in.
    pub fn report_file_for(&self, policy: PolicyKind) -> String {
        self.report_file.replace("{policy}", policy.label())
    }
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let config: SimulationConfig =
            toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configurations no run could use.
    pub fn validate(&self) -> CoreResult<()> {
        let (width, height) = (self.environment.width, self.environment.height);
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(CoreError::Config(
                "environment width and height must be finite and > 0".to_string(),
            ));
        }
        let duration = self.simulation.duration_secs;
        if !(duration >= 0.0 && duration.is_finite()) {
            return Err(CoreError::Config(
                "simulation.duration_secs must be finite and >= 0".to_string(),
            ));
        }
        if let Some(min) = self.model.min_distance_m {
            if !(min > 0.0 && min.is_finite()) {
                return Err(CoreError::Config(
                    "model.min_distance_m must be a positive number".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = SimulationConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.devices.num_fog_nodes, 6);
    }

    #[test]
    fn test_parse_partial_sections() {
        let toml_str = r#"
[simulation]
seed = 7
policy = "distance"
arrival_order = "shuffled"

[model]
min_distance_m = 1.0
"#;
        let config = SimulationConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.policy, PolicyKind::Distance);
        assert_eq!(config.simulation.arrival_order, ArrivalOrder::Shuffled);
        assert_eq!(config.model.min_distance_m, Some(1.0));
        assert_eq!(config.environment.width, 3000.0);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = SimulationConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("[metrics]"));
        let parsed = SimulationConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_non_positive_min_distance() {
        let err = SimulationConfig::from_toml_str("[model]\nmin_distance_m = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("min_distance_m"));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        for toml in [
            "[environment]\nwidth = inf\n",
            "[environment]\nheight = nan\n",
            "[simulation]\nduration_secs = inf\n",
        ] {
            let err = SimulationConfig::from_toml_str(toml).unwrap_err();
            assert!(err.to_string().contains("finite"), "{toml}: {err}");
        }
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("OLB".parse::<PolicyKind>().unwrap(), PolicyKind::Olb);
        assert_eq!("random".parse::<PolicyKind>().unwrap(), PolicyKind::Random);
        assert!("greedy".parse::<PolicyKind>().is_err());
    }

    #[test]
    fn test_output_file_placeholders() {
        let out = OutputConfig::default();
        assert_eq!(out.results_file_for(PolicyKind::Random), "random_results.json");
        assert_eq!(out.report_file_for(PolicyKind::Olb), "olb_report.txt");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("olb.toml");
        std::fs::write(&path, "[devices]\nnum_sensors = 25\n").unwrap();
        let config = SimulationConfig::from_file(&path).unwrap();
        assert_eq!(config.devices.num_sensors, 25);
    }
}
