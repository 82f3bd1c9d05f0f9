use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use stagegate_core::cost::{
    aggregate, format_amount, parse_rows, sort_rows, CostRow, CostSummary, GroupBy, SortColumn,
    SortDirection,
};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum CostSubcommand {
    /// Group cost rows and print the merged table
    Aggregate {
        /// Cost export (JSON array or {"results": [...]})
        file: PathBuf,
        /// none, category, group or category_and_group
        #[arg(long, default_value = "none")]
        by: GroupBy,
        /// id, category, group, budget, spent or remaining_budget
        #[arg(long)]
        sort: Option<SortColumn>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
    },

    /// Budget totals, breakdowns and health
    Summary {
        /// Cost export (JSON array or {"results": [...]})
        file: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(subcmd: CostSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CostSubcommand::Aggregate {
            file,
            by,
            sort,
            desc,
        } => aggregate_cmd(&file, by, sort, desc, json),
        CostSubcommand::Summary { file } => summary(&file, json),
    }
}

fn read_rows(file: &Path) -> anyhow::Result<Vec<CostRow>> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    parse_rows(&data).with_context(|| format!("failed to parse cost rows in {}", file.display()))
}

fn aggregate_cmd(
    file: &Path,
    by: GroupBy,
    sort: Option<SortColumn>,
    desc: bool,
    json: bool,
) -> anyhow::Result<()> {
    let rows = read_rows(file)?;
    let mut merged = aggregate(&rows, by);
    if let Some(column) = sort {
        let direction = if desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        sort_rows(&mut merged, column, direction);
    }

    if json {
        return print_json(&merged);
    }

    let table = merged
        .iter()
        .map(|r| {
            vec![
                r.cost_id.clone(),
                r.category.clone(),
                r.group.clone(),
                format_amount(r.budget),
                format_amount(r.spent),
                format_amount(r.remaining_budget),
                format_amount(r.forecast),
                format_amount(r.variance),
            ]
        })
        .collect();
    print_table(
        &[
            "COST ID",
            "CATEGORY",
            "GROUP",
            "BUDGET",
            "SPENT",
            "REMAINING",
            "FORECAST",
            "VARIANCE",
        ],
        table,
    );
    Ok(())
}

fn summary(file: &Path, json: bool) -> anyhow::Result<()> {
    let rows = read_rows(file)?;
    let summary = CostSummary::from_rows(&rows);

    if json {
        return print_json(&summary);
    }

    println!("Total budget:     {}", format_amount(summary.total_budget));
    println!("Total spent:      {}", format_amount(summary.total_spent));
    println!(
        "Remaining budget: {}",
        format_amount(summary.total_remaining_budget)
    );
    println!(
        "Spend to finish:  {}",
        format_amount(summary.total_spend_to_finish)
    );
    let sign = if summary.total_variance >= 0.0 { "+" } else { "-" };
    println!(
        "Variance:         {sign}{} ({})",
        format_amount(summary.total_variance.abs()),
        summary.health
    );
    println!();

    let rows = summary
        .by_category
        .iter()
        .zip(&summary.category_shares)
        .map(|(total, share)| {
            vec![
                total.key.clone(),
                format_amount(total.budget),
                format!("{:.1}%", share.percentage),
            ]
        })
        .collect();
    print_table(&["CATEGORY", "BUDGET", "SHARE"], rows);
    println!();

    let rows = summary
        .by_category_and_group
        .iter()
        .map(|t| vec![t.key.clone(), format_amount(t.budget)])
        .collect();
    print_table(&["CATEGORY - GROUP", "BUDGET"], rows);
    Ok(())
}
