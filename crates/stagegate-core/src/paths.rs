use crate::error::{GateError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const STAGEGATE_DIR: &str = ".stagegate";
pub const PROJECTS_DIR: &str = ".stagegate/projects";

pub const CONFIG_FILE: &str = ".stagegate/config.yaml";
pub const STATUS_DB_FILE: &str = ".stagegate/statuses.redb";

pub const STATUSES_FILE: &str = "statuses.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn stagegate_dir(root: &Path) -> PathBuf {
    root.join(STAGEGATE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn projects_dir(root: &Path) -> PathBuf {
    root.join(PROJECTS_DIR)
}

pub fn project_dir(root: &Path, project_id: &str) -> PathBuf {
    projects_dir(root).join(project_id)
}

pub fn statuses_path(root: &Path, project_id: &str) -> PathBuf {
    project_dir(root, project_id).join(STATUSES_FILE)
}

pub fn status_db_path(root: &Path) -> PathBuf {
    root.join(STATUS_DB_FILE)
}

// ---------------------------------------------------------------------------
// Project id validation
// ---------------------------------------------------------------------------

static PROJECT_ID_RE: OnceLock<Regex> = OnceLock::new();

fn project_id_re() -> &'static Regex {
    PROJECT_ID_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-]*$").expect("project id pattern is valid")
    })
}

/// Project ids become directory names and database keys, so they are kept
/// to a conservative character set.
pub fn validate_project_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !project_id_re().is_match(id) {
        return Err(GateError::InvalidProjectId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
