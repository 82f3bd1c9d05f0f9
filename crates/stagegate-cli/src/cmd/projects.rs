use super::{load_catalog, load_config};
use crate::output::{print_json, print_table};
use anyhow::Context;
use stagegate_core::gate::CompletedGateFlags;
use stagegate_core::store::{open_store, StatusStore};
use std::path::Path;

pub fn run(root: &Path, division: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = load_config(root, division)?;
    let catalog = load_catalog(root, &config)?;
    let store = open_store(root, &config).context("failed to open status store")?;

    let mut summaries = Vec::new();
    for id in store.list().context("failed to list projects")? {
        let state = store
            .load_or_default(&id)
            .with_context(|| format!("failed to load statuses for {id}"))?;
        let gates = CompletedGateFlags::derive(&catalog, &config.division, &state);
        summaries.push((id, gates));
    }

    if json {
        let value: Vec<serde_json::Value> = summaries
            .iter()
            .map(|(id, gates)| {
                serde_json::json!({
                    "project": id,
                    "completed": gates.completed_count(),
                    "total": gates.len(),
                    "current_gate": gates.current_gate(),
                })
            })
            .collect();
        return print_json(&value);
    }

    if summaries.is_empty() {
        println!("No projects tracked yet.");
        return Ok(());
    }
    let rows = summaries
        .iter()
        .map(|(id, gates)| {
            vec![
                id.to_string(),
                format!("{}/{}", gates.completed_count(), gates.len()),
                gates.current_gate().to_string(),
            ]
        })
        .collect();
    print_table(&["PROJECT", "GATES", "CURRENT GATE"], rows);
    Ok(())
}
