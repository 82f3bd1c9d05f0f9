use crate::catalog::RequirementCatalog;
use crate::error::{GateError, Result};
use crate::paths;
use crate::types::Division;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    File,
    Redb,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreBackend::File => "file",
            StoreBackend::Redb => "redb",
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(StoreBackend::File),
            "redb" => Ok(StoreBackend::Redb),
            _ => Err(GateError::InvalidBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Division whose checklist the tracker shows.
    #[serde(default)]
    pub division: Division,
    /// Catalog override, relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub store: StoreConfig,
    /// Extra save attempts after the first one fails.
    #[serde(default = "default_persist_retries")]
    pub persist_retries: u32,
}

fn default_version() -> u32 {
    1
}

fn default_persist_retries() -> u32 {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Division::default())
    }
}

impl Config {
    pub fn new(division: Division) -> Self {
        Self {
            version: 1,
            division,
            catalog: None,
            store: StoreConfig::default(),
            persist_retries: default_persist_retries(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(GateError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// The configured catalog override, or the built-in catalog.
    pub fn load_catalog(&self, root: &Path) -> Result<RequirementCatalog> {
        match &self.catalog {
            Some(rel) => RequirementCatalog::load(&root.join(rel)),
            None => Ok(RequirementCatalog::builtin()),
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self, root: &Path, catalog: &RequirementCatalog) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Some(rel) = &self.catalog {
            if !root.join(rel).exists() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("catalog file '{}' does not exist", rel.display()),
                });
            }
        }

        if !catalog.knows_division(&self.division) {
            let known: Vec<&str> = catalog.divisions().iter().map(|d| d.as_str()).collect();
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "division '{}' has no requirements in the catalog (known: {}); \
                     no stage can complete",
                    self.division,
                    known.join(", ")
                ),
            });
        }

        if self.persist_retries > 10 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "persist_retries={} (>10 is unusual)",
                    self.persist_retries
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.division, Division::vsc());
        assert_eq!(parsed.store.backend, StoreBackend::File);
        assert_eq!(parsed.persist_retries, 2);
    }

    #[test]
    fn minimal_yaml_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("division: VSS\n").unwrap();
        assert_eq!(cfg.division, Division::vss());
        assert!(cfg.catalog.is_none());
        assert_eq!(cfg.persist_retries, 2);
    }

    #[test]
    fn backend_yaml() {
        let cfg: Config = serde_yaml::from_str("store:\n  backend: redb\n").unwrap();
        assert_eq!(cfg.store.backend, StoreBackend::Redb);
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(GateError::NotInitialized)
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new(Division::vss());
        cfg.persist_retries = 0;
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.division, Division::vss());
        assert_eq!(loaded.persist_retries, 0);
    }

    #[test]
    fn validate_clean_config() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::default();
        let warnings = cfg.validate(dir.path(), &RequirementCatalog::builtin());
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn validate_unknown_division_warns() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new(Division::new("XYZ"));
        let warnings = cfg.validate(dir.path(), &RequirementCatalog::builtin());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
        assert!(warnings[0].message.contains("XYZ"));
        assert!(warnings[0].message.contains("VSC, VSS"));
    }

    #[test]
    fn validate_missing_catalog_is_error() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.catalog = Some(PathBuf::from("catalog.yaml"));
        cfg.persist_retries = 11;
        let warnings = cfg.validate(dir.path(), &RequirementCatalog::builtin());
        assert!(warnings.iter().any(|w| w.level == WarnLevel::Error));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("persist_retries=11")));
    }

    #[test]
    fn load_catalog_override() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("catalog.yaml"),
            "- name: Intake\n  order: 0\n  requirements:\n    VSC: [Form]\n",
        )
        .unwrap();
        let mut cfg = Config::default();
        cfg.catalog = Some(PathBuf::from("catalog.yaml"));
        let catalog = cfg.load_catalog(dir.path()).unwrap();
        assert_eq!(catalog.stages().len(), 1);
        assert!(Config::default()
            .load_catalog(dir.path())
            .unwrap()
            .stage("Review")
            .is_some());
    }
}
