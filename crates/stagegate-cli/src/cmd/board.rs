use super::{load_catalog, load_config, parse_project};
use crate::output::{print_json, print_table};
use anyhow::Context;
use stagegate_core::board::Board;
use stagegate_core::store::open_store;
use stagegate_core::tracker::StageGateTracker;
use stagegate_core::types::Indicator;
use std::path::Path;

pub fn run(root: &Path, division: Option<&str>, project: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config(root, division)?;
    let catalog = load_catalog(root, &config)?;
    let project = parse_project(project)?;
    let mut store = open_store(root, &config).context("failed to open status store")?;
    let tracker = StageGateTracker::from_config(project, &config, &catalog, &mut store)
        .context("failed to load stage statuses")?;

    let board = tracker.board();
    if json {
        return print_json(&board);
    }
    print_board(&board);
    Ok(())
}

/// Single-character state marker used in tables.
pub fn marker(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::Empty => "[ ]",
        Indicator::Complete => "[x]",
        Indicator::Reviewed => "[r]",
    }
}

fn print_board(board: &Board) {
    println!("Project {} ({})", board.project, board.division);
    println!();

    if board.row_count == 0 {
        println!(
            "No requirements for division '{}'. Check `stagegate config validate`.",
            board.division
        );
        return;
    }

    let headers: Vec<String> = board
        .stages
        .iter()
        .map(|s| {
            if s.complete {
                format!("{} (done)", s.name)
            } else {
                s.name.clone()
            }
        })
        .collect();
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();

    let rows = board
        .rows()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    Some(c) => format!("{} {}", marker(c.indicator), c.requirement),
                    None => String::new(),
                })
                .collect()
        })
        .collect();
    print_table(&header_refs, rows);

    println!();
    println!("Current gate: {}", board.current_gate);
    if board.hidden_statuses > 0 {
        println!(
            "{} stored status(es) fall outside the {} checklist and are not shown.",
            board.hidden_statuses, board.division
        );
    }
}
