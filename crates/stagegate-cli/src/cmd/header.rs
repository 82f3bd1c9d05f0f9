use super::{load_catalog, load_config, parse_project};
use crate::output::print_json;
use anyhow::Context;
use stagegate_core::store::open_store;
use stagegate_core::tracker::{HeaderGesture, StageGateTracker};
use std::path::Path;

pub fn run(
    root: &Path,
    division: Option<&str>,
    project: &str,
    stage: &str,
    clicks: u32,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(root, division)?;
    let catalog = load_catalog(root, &config)?;
    let project = parse_project(project)?;
    let mut store = open_store(root, &config).context("failed to open status store")?;
    let mut tracker = StageGateTracker::from_config(project, &config, &catalog, &mut store)
        .context("failed to load stage statuses")?;

    let gesture = tracker
        .click_stage_header(stage, clicks)
        .with_context(|| format!("failed to apply header click on '{stage}'"))?;
    let gates = tracker.completed_gates().clone();
    let current_gate = tracker.current_gate();
    let project = tracker.project().clone();
    tracker.close().context("failed to save stage statuses")?;

    if json {
        print_json(&serde_json::json!({
            "project": project,
            "stage": stage,
            "clicks": clicks,
            "gesture": gesture,
            "gates": gates,
            "current_gate": current_gate,
        }))?;
    } else {
        let what = match gesture {
            HeaderGesture::Toggle => format!("toggled {stage}"),
            HeaderGesture::CascadeReset => format!("reset {stage} and every later stage"),
            HeaderGesture::CompleteStage => format!("completed {stage}"),
        };
        println!("{what}");
        let done: Vec<&str> = gates
            .iter()
            .filter(|g| g.complete)
            .map(|g| g.stage.as_str())
            .collect();
        if done.is_empty() {
            println!("Completed gates: none");
        } else {
            println!("Completed gates: {}", done.join(", "));
        }
        println!("Current gate: {current_gate}");
    }
    Ok(())
}
