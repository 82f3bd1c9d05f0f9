use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use stagegate_core::decision::{
    convert, Conversion, OpportunityComment, OpportunityStatus, Quadrant, QuadrantComments, Role,
};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum DecisionSubcommand {
    /// List the four decision quadrants
    List,

    /// Which quadrant an opportunity in STATUS belongs to
    Resolve {
        /// Opportunity status (Active, Draft, Planning, Converted, Rejected, Revisit)
        status: OpportunityStatus,
    },

    /// Convert an opportunity through a quadrant
    Convert {
        /// plan_now, do_now, reject or revisit
        quadrant: Quadrant,
        /// Role of the acting user
        #[arg(long, default_value = "user")]
        role: Role,
    },

    /// Group an exported comment list (JSON) by quadrant
    Comments {
        /// Path to a JSON array of comments
        file: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(subcmd: DecisionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        DecisionSubcommand::List => list(json),
        DecisionSubcommand::Resolve { status } => resolve(status, json),
        DecisionSubcommand::Convert { quadrant, role } => convert_cmd(quadrant, role, json),
        DecisionSubcommand::Comments { file } => comments(&file, json),
    }
}

fn list(json: bool) -> anyhow::Result<()> {
    if json {
        let value: Vec<serde_json::Value> = Quadrant::all()
            .iter()
            .map(|q| {
                serde_json::json!({
                    "quadrant": q,
                    "label": q.label(),
                    "description": q.description(),
                    "status": q.status(),
                    "action": q.convert_label(),
                })
            })
            .collect();
        return print_json(&value);
    }

    let rows = Quadrant::all()
        .iter()
        .map(|q| {
            vec![
                q.label().to_string(),
                q.status().to_string(),
                q.description().to_string(),
                q.convert_label().to_string(),
            ]
        })
        .collect();
    print_table(&["QUADRANT", "STATUS", "DESCRIPTION", "ACTION"], rows);
    Ok(())
}

fn resolve(status: OpportunityStatus, json: bool) -> anyhow::Result<()> {
    let quadrant = Quadrant::for_status(status);
    if json {
        return print_json(&serde_json::json!({
            "status": status,
            "quadrant": quadrant,
        }));
    }
    match quadrant {
        Some(q) => println!("{status} → {q}"),
        None => println!("{status} is not decided yet (no quadrant)"),
    }
    Ok(())
}

fn convert_cmd(quadrant: Quadrant, role: Role, json: bool) -> anyhow::Result<()> {
    let conversion = convert(quadrant, role)?;
    if json {
        return print_json(&serde_json::json!({
            "quadrant": quadrant,
            "prompt": quadrant.confirmation_prompt(),
            "conversion": conversion,
        }));
    }
    println!("{}", quadrant.confirmation_prompt());
    match conversion {
        Conversion::CreateProject => {
            println!("→ create a project from this opportunity (status becomes Converted)")
        }
        Conversion::UpdateStatus(status) => println!("→ set opportunity status to {status}"),
    }
    Ok(())
}

fn comments(file: &Path, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let list: Vec<OpportunityComment> =
        serde_json::from_str(&data).context("failed to parse comment list")?;
    let grouped = QuadrantComments::group(list);

    if json {
        return print_json(&grouped);
    }
    for q in Quadrant::all() {
        let bucket = grouped.get(*q);
        println!("{} ({})", q.label(), bucket.len());
        for c in bucket {
            println!("  - {} (by {})", c.comment, c.author());
        }
    }
    Ok(())
}
