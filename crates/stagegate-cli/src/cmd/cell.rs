use super::board::marker;
use super::{load_catalog, load_config, parse_project};
use crate::output::print_json;
use anyhow::Context;
use stagegate_core::store::open_store;
use stagegate_core::tracker::StageGateTracker;
use std::path::Path;

pub fn run(
    root: &Path,
    division: Option<&str>,
    project: &str,
    stage: &str,
    requirement: &str,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(root, division)?;
    let catalog = load_catalog(root, &config)?;
    let project = parse_project(project)?;
    let mut store = open_store(root, &config).context("failed to open status store")?;
    let mut tracker = StageGateTracker::from_config(project, &config, &catalog, &mut store)
        .context("failed to load stage statuses")?;

    let indicator = tracker
        .click_cell(stage, requirement)
        .with_context(|| format!("failed to update '{stage}-{requirement}'"))?;
    let stage_complete = tracker.is_stage_complete(stage);
    let current_gate = tracker.current_gate();
    let project = tracker.project().clone();
    tracker.close().context("failed to save stage statuses")?;

    if json {
        print_json(&serde_json::json!({
            "project": project,
            "stage": stage,
            "requirement": requirement,
            "indicator": indicator.as_str(),
            "color": indicator.color(),
            "stage_complete": stage_complete,
            "current_gate": current_gate,
        }))?;
    } else {
        println!("{} {stage} / {requirement}: {indicator}", marker(indicator));
        if stage_complete {
            println!("Stage {stage} is complete.");
        }
        println!("Current gate: {current_gate}");
    }
    Ok(())
}
