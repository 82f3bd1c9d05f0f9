pub mod board;
pub mod catalog;
pub mod cell;
pub mod config;
pub mod cost;
pub mod decision;
pub mod documents;
pub mod gates;
pub mod header;
pub mod init;
pub mod projects;

use anyhow::Context;
use stagegate_core::catalog::RequirementCatalog;
use stagegate_core::config::Config;
use stagegate_core::types::{Division, ProjectId};
use stagegate_core::GateError;
use std::path::Path;

/// Config from `.stagegate/config.yaml` with the `--division` override
/// applied. Fails when the root is not initialized.
pub fn load_config(root: &Path, division: Option<&str>) -> anyhow::Result<Config> {
    let mut config = Config::load(root).context("failed to load config")?;
    apply_division(&mut config, division);
    Ok(config)
}

/// Like [`load_config`], but an uninitialized root falls back to defaults.
pub fn load_config_or_default(root: &Path, division: Option<&str>) -> anyhow::Result<Config> {
    let mut config = match Config::load(root) {
        Ok(c) => c,
        Err(GateError::NotInitialized) => Config::default(),
        Err(e) => return Err(e).context("failed to load config"),
    };
    apply_division(&mut config, division);
    Ok(config)
}

fn apply_division(config: &mut Config, division: Option<&str>) {
    if let Some(d) = division {
        config.division = Division::new(d);
    }
}

pub fn load_catalog(root: &Path, config: &Config) -> anyhow::Result<RequirementCatalog> {
    config
        .load_catalog(root)
        .context("failed to load requirement catalog")
}

pub fn parse_project(id: &str) -> anyhow::Result<ProjectId> {
    ProjectId::new(id).context("invalid project id")
}
