use super::{load_catalog, load_config};
use crate::output::print_json;
use clap::Subcommand;
use stagegate_core::catalog::RequirementCatalog;
use stagegate_core::config::WarnLevel;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(
    root: &Path,
    division: Option<&str>,
    subcmd: ConfigSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, division, json),
        ConfigSubcommand::Validate => validate(root, division, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, division: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = load_config(root, division)?;
    if json {
        return print_json(&config);
    }
    println!("division:        {}", config.division);
    println!(
        "catalog:         {}",
        config
            .catalog
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(built-in)".to_string())
    );
    println!("store.backend:   {}", config.store.backend);
    println!("persist_retries: {}", config.persist_retries);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, division: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = load_config(root, division)?;
    // A missing override file is reported as a warning below, so validate
    // against the built-in catalog in that case.
    let catalog = match &config.catalog {
        Some(rel) if !root.join(rel).exists() => RequirementCatalog::builtin(),
        _ => load_catalog(root, &config)?,
    };
    let warnings = config.validate(root, &catalog);

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
