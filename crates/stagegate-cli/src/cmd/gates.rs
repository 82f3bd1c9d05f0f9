use super::{load_catalog, load_config, parse_project};
use crate::output::{print_json, print_table, yes_no};
use anyhow::Context;
use stagegate_core::store::open_store;
use stagegate_core::tracker::StageGateTracker;
use std::path::Path;

pub fn run(root: &Path, division: Option<&str>, project: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config(root, division)?;
    let catalog = load_catalog(root, &config)?;
    let project = parse_project(project)?;
    let mut store = open_store(root, &config).context("failed to open status store")?;
    let tracker = StageGateTracker::from_config(project, &config, &catalog, &mut store)
        .context("failed to load stage statuses")?;

    let gates = tracker.completed_gates();
    if json {
        return print_json(&serde_json::json!({
            "project": tracker.project(),
            "division": tracker.division(),
            "gates": gates,
            "completed_gates": gates.to_legacy_map(),
            "current_gate": tracker.current_gate(),
        }));
    }

    let rows = gates
        .iter()
        .map(|g| vec![g.stage.clone(), yes_no(g.complete).to_string()])
        .collect();
    print_table(&["STAGE", "COMPLETE"], rows);
    println!();
    println!(
        "{}/{} gates passed. Current gate: {}",
        gates.completed_count(),
        gates.len(),
        tracker.current_gate()
    );
    Ok(())
}
