use std::path::Path;

use anyhow::bail;
use olb_core::SimulationConfig;

pub fn init(path: &str, force: bool) -> anyhow::Result<()> {
    let output = Path::new(path);
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }
    std::fs::write(output, SimulationConfig::default().to_toml_string()?)?;
    println!("✓ Generated {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("olb.toml");
        init(path.to_str().unwrap(), false).unwrap();

        let loaded = SimulationConfig::from_file(&path).unwrap();
        assert_eq!(loaded, SimulationConfig::default());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("olb.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(init(path.to_str().unwrap(), false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        init(path.to_str().unwrap(), true).unwrap();
        assert!(SimulationConfig::from_file(&path).is_ok());
    }
}
