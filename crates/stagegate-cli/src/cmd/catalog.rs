use super::{load_catalog, load_config_or_default};
use crate::output::print_json;
use stagegate_core::GateError;
use std::path::Path;

pub fn run(
    root: &Path,
    division: Option<&str>,
    stage: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config_or_default(root, division)?;
    let catalog = load_catalog(root, &config)?;

    let stages: Vec<_> = match stage {
        Some(name) => vec![catalog
            .stage(name)
            .ok_or_else(|| GateError::UnknownStage(name.to_string()))?],
        None => catalog.stages().iter().collect(),
    };

    if json {
        let value: Vec<serde_json::Value> = stages
            .iter()
            .map(|s| {
                serde_json::json!({
                    "stage": s.name,
                    "order": s.order,
                    "division": config.division,
                    "requirements": s.requirements_for(&config.division),
                })
            })
            .collect();
        return print_json(&value);
    }

    for s in stages {
        let reqs = s.requirements_for(&config.division);
        println!("{} ({} requirements, {})", s.name, reqs.len(), config.division);
        for (i, req) in reqs.iter().enumerate() {
            println!("  {:>2}. {req}", i + 1);
        }
    }
    Ok(())
}
