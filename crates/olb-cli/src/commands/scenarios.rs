use olb_core::ScenarioKind;

/// One line per built-in scenario: label, name, description.
pub fn list() -> String {
    let mut out = String::from("Built-in scenarios:\n\n");
    for kind in ScenarioKind::ALL {
        let (name, description) = kind.describe();
        out.push_str(&format!("  {:<12} {name}\n", kind.label()));
        out.push_str(&format!("  {:<12} {description}\n", ""));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_scenario() {
        let text = list();
        for kind in ScenarioKind::ALL {
            assert!(text.contains(kind.label()));
            assert!(text.contains(kind.describe().0));
        }
    }
}
